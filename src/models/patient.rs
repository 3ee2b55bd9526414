//! Patient record document model.
//!
//! Records are kept as raw JSON objects. The pipeline reads a handful of
//! demographic fields; labs, medications and notes stay opaque and are
//! passed through to the prompt as-is.

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

pub const PATIENT_ID_KEY: &str = "patient_id";
pub const DEMOGRAPHICS_KEY: &str = "demographics";
/// Older exports store the same object under this key.
pub const LEGACY_DEMOGRAPHICS_KEY: &str = "patient_demographics";

pub const NAME_KEY: &str = "name";
pub const AGE_KEY: &str = "age";
pub const GENDER_KEY: &str = "gender";
pub const ADMISSION_DATE_KEY: &str = "admission_date";
pub const DISCHARGE_DATE_KEY: &str = "discharge_date";
pub const EXPECTED_DISCHARGE_DATE_KEY: &str = "expected_discharge_date";

/// Key under which a document stores its demographics, if any.
/// `demographics` wins over the legacy key when both are present.
pub fn demographics_key(document: &Map<String, Value>) -> Option<&'static str> {
    if document.contains_key(DEMOGRAPHICS_KEY) {
        Some(DEMOGRAPHICS_KEY)
    } else if document.contains_key(LEGACY_DEMOGRAPHICS_KEY) {
        Some(LEGACY_DEMOGRAPHICS_KEY)
    } else {
        None
    }
}

/// Demographics object of a document. `None` if absent or not an object.
pub fn demographics(document: &Map<String, Value>) -> Option<&Map<String, Value>> {
    demographics_key(document)
        .and_then(|key| document.get(key))
        .and_then(Value::as_object)
}

/// Render a scalar as display text. Strings come back unquoted; null is `None`.
pub fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// One patient, as loaded from a single source document.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientRecord {
    document: Map<String, Value>,
    source: Option<PathBuf>,
}

impl PatientRecord {
    pub fn new(document: Map<String, Value>) -> Self {
        Self {
            document,
            source: None,
        }
    }

    /// Wrap a JSON value. Returns `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(document) => Some(Self::new(document)),
            _ => None,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn document(&self) -> &Map<String, Value> {
        &self.document
    }

    /// File the record was loaded from, when known.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn patient_id(&self) -> Option<String> {
        self.document.get(PATIENT_ID_KEY).and_then(render_scalar)
    }

    pub fn demographics(&self) -> Option<&Map<String, Value>> {
        demographics(&self.document)
    }

    pub fn name(&self) -> Option<&str> {
        self.demographic(NAME_KEY).and_then(Value::as_str)
    }

    fn demographic(&self, key: &str) -> Option<&Value> {
        self.demographics().and_then(|d| d.get(key))
    }

    /// A record is discharge-ready once a discharge date has been recorded.
    ///
    /// Any non-null value counts, including the empty string.
    pub fn is_discharge_ready(&self) -> bool {
        self.demographic(DISCHARGE_DATE_KEY)
            .is_some_and(|date| !date.is_null())
    }

    /// Demographic summary shown next to the patient picker.
    pub fn info(&self) -> PatientInfo {
        let field = |key: &str| self.demographic(key).and_then(render_scalar);
        PatientInfo {
            age: field(AGE_KEY),
            gender: field(GENDER_KEY),
            admission_date: field(ADMISSION_DATE_KEY),
            discharge_date: field(DISCHARGE_DATE_KEY),
            expected_discharge_date: field(EXPECTED_DISCHARGE_DATE_KEY),
        }
    }

    pub fn listing(&self) -> PatientListing {
        PatientListing {
            name: self.name().map(str::to_string),
            patient_id: self.patient_id(),
        }
    }
}

/// Derived demographic summary of a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientInfo {
    pub age: Option<String>,
    pub gender: Option<String>,
    pub admission_date: Option<String>,
    pub discharge_date: Option<String>,
    pub expected_discharge_date: Option<String>,
}

impl PatientInfo {
    /// Labelled rows in display order.
    pub fn rows(&self) -> [(&'static str, Option<&str>); 5] {
        [
            ("Age", self.age.as_deref()),
            ("Gender", self.gender.as_deref()),
            ("Admission Date", self.admission_date.as_deref()),
            ("Discharge Date", self.discharge_date.as_deref()),
            ("Expected Discharge Date", self.expected_discharge_date.as_deref()),
        ]
    }
}

impl fmt::Display for PatientInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, value) in self.rows() {
            writeln!(f, "- {label}: {}", value.unwrap_or("n/a"))?;
        }
        Ok(())
    }
}

/// `(name, patient_id)` pair offered for selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientListing {
    pub name: Option<String>,
    pub patient_id: Option<String>,
}

impl fmt::Display for PatientListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (ID: {})",
            self.name.as_deref().unwrap_or("unknown"),
            self.patient_id.as_deref().unwrap_or("unknown")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> PatientRecord {
        PatientRecord::from_value(value).unwrap()
    }

    #[test]
    fn null_discharge_date_is_not_ready() {
        let r = record(json!({
            "patient_id": "P1",
            "demographics": {"name": "Jane Doe", "discharge_date": null}
        }));
        assert!(!r.is_discharge_ready());
    }

    #[test]
    fn missing_discharge_date_is_not_ready() {
        let r = record(json!({"patient_id": "P1", "demographics": {"name": "Jane Doe"}}));
        assert!(!r.is_discharge_ready());
    }

    #[test]
    fn empty_string_discharge_date_is_ready() {
        let r = record(json!({"demographics": {"discharge_date": ""}}));
        assert!(r.is_discharge_ready());
    }

    #[test]
    fn dated_record_is_ready() {
        let r = record(json!({"demographics": {"discharge_date": "2024-01-05"}}));
        assert!(r.is_discharge_ready());
    }

    #[test]
    fn no_demographics_is_not_ready() {
        let r = record(json!({"patient_id": "P1", "labs": []}));
        assert!(!r.is_discharge_ready());
        assert!(r.demographics().is_none());
    }

    #[test]
    fn legacy_demographics_key_is_accepted() {
        let r = record(json!({
            "patient_id": "P9",
            "patient_demographics": {"name": "John Roe", "discharge_date": "2024-02-01"}
        }));
        assert_eq!(r.name(), Some("John Roe"));
        assert!(r.is_discharge_ready());
    }

    #[test]
    fn numeric_patient_id_renders_as_text() {
        let r = record(json!({"patient_id": 1042, "demographics": {}}));
        assert_eq!(r.patient_id().as_deref(), Some("1042"));
    }

    #[test]
    fn non_object_value_is_rejected() {
        assert!(PatientRecord::from_value(json!([1, 2, 3])).is_none());
    }

    #[test]
    fn info_collects_demographics() {
        let r = record(json!({
            "demographics": {
                "name": "Jane Doe",
                "age": 70,
                "gender": "F",
                "admission_date": "2024-01-01",
                "discharge_date": null,
                "expected_discharge_date": "2024-01-06"
            }
        }));
        let info = r.info();
        assert_eq!(info.age.as_deref(), Some("70"));
        assert_eq!(info.gender.as_deref(), Some("F"));
        assert_eq!(info.discharge_date, None);

        let rendered = info.to_string();
        assert!(rendered.contains("- Age: 70"));
        assert!(rendered.contains("- Discharge Date: n/a"));
        assert!(rendered.contains("- Expected Discharge Date: 2024-01-06"));
    }

    #[test]
    fn listing_display_matches_picker_format() {
        let r = record(json!({"patient_id": "P1", "demographics": {"name": "Jane Doe"}}));
        assert_eq!(r.listing().to_string(), "Jane Doe (ID: P1)");
    }
}
