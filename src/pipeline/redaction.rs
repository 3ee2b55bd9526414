//! PII-free view of a patient record.
//!
//! Strips the patient identifier and the name, gender and age demographics
//! from every demographics object the record carries.
//! Everything else is copied unchanged. The source record is never touched.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::patient::{
    demographics, demographics_key, PatientRecord, AGE_KEY, DEMOGRAPHICS_KEY, GENDER_KEY,
    LEGACY_DEMOGRAPHICS_KEY, NAME_KEY, PATIENT_ID_KEY,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RedactionError {
    #[error("Patient record has no demographics object")]
    MissingDemographics,
}

/// Demographic fields removed by redaction.
pub const REDACTED_DEMOGRAPHIC_FIELDS: &[&str] = &[NAME_KEY, GENDER_KEY, AGE_KEY];

/// Disposable redacted copy of a [`PatientRecord`]. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactedPatientRecord {
    document: Map<String, Value>,
}

impl RedactedPatientRecord {
    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    pub fn demographics(&self) -> Option<&Map<String, Value>> {
        demographics(&self.document)
    }
}

pub fn redact(record: &PatientRecord) -> Result<RedactedPatientRecord, RedactionError> {
    let document = redact_document(record.document())?;
    Ok(RedactedPatientRecord { document })
}

/// Redact a raw document. Fields that are already absent are skipped, so
/// applying this twice gives the same result as once.
pub fn redact_document(
    document: &Map<String, Value>,
) -> Result<Map<String, Value>, RedactionError> {
    let key = demographics_key(document).ok_or(RedactionError::MissingDemographics)?;

    let mut redacted = document.clone();
    redacted.remove(PATIENT_ID_KEY);

    if !redacted.get(key).is_some_and(Value::is_object) {
        return Err(RedactionError::MissingDemographics);
    }

    // Both spellings are scrubbed so a record carrying both never leaks the other.
    for key in [DEMOGRAPHICS_KEY, LEGACY_DEMOGRAPHICS_KEY] {
        if let Some(demographics) = redacted.get_mut(key).and_then(Value::as_object_mut) {
            for field in REDACTED_DEMOGRAPHIC_FIELDS {
                demographics.remove(*field);
            }
        }
    }

    Ok(redacted)
}
