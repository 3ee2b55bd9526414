use std::collections::HashSet;
use std::path::Path;

use serde_json::Value;

use super::RecordError;
use crate::models::patient::{PatientListing, PatientRecord};

/// In-memory set of patient records, kept in source order.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Vec<PatientRecord>,
}

impl RecordStore {
    /// Load one record per source. Fails on the first bad source; there is
    /// no partial load.
    pub fn load<P: AsRef<Path>>(paths: &[P]) -> Result<Self, RecordError> {
        let records = paths
            .iter()
            .map(|path| load_record(path.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        let store = Self::from_records(records);
        tracing::info!(count = store.len(), "Loaded patient records");
        Ok(store)
    }

    pub fn from_records(records: Vec<PatientRecord>) -> Self {
        warn_on_duplicates(&records);
        Self { records }
    }

    pub fn records(&self) -> &[PatientRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// `(name, patient_id)` pairs for the patient picker, in source order.
    pub fn listings(&self) -> impl Iterator<Item = PatientListing> + '_ {
        self.records.iter().map(PatientRecord::listing)
    }

    /// First record whose demographics name matches exactly.
    /// Duplicate names resolve to the earliest source.
    pub fn find_by_name(&self, name: &str) -> Option<&PatientRecord> {
        self.records.iter().find(|r| r.name() == Some(name))
    }

    /// First record whose `patient_id` renders to `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&PatientRecord> {
        self.records
            .iter()
            .find(|r| r.patient_id().as_deref() == Some(id))
    }
}

/// Read and parse a single patient record file.
pub fn load_record(path: &Path) -> Result<PatientRecord, RecordError> {
    let contents = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            RecordError::NotFound(path.to_path_buf())
        } else {
            RecordError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let value: Value = serde_json::from_str(&contents).map_err(|source| RecordError::Malformed {
        path: path.to_path_buf(),
        source,
    })?;

    PatientRecord::from_value(value)
        .map(|record| record.with_source(path))
        .ok_or_else(|| RecordError::NotAnObject(path.to_path_buf()))
}

// Logs positions only; names and IDs are identifying.
fn warn_on_duplicates(records: &[PatientRecord]) {
    let mut names = HashSet::new();
    let mut ids = HashSet::new();

    for (index, record) in records.iter().enumerate() {
        if let Some(name) = record.name() {
            if !names.insert(name.to_string()) {
                tracing::warn!(
                    index,
                    "Duplicate patient name; lookups by name resolve to the first match"
                );
            }
        }
        if let Some(id) = record.patient_id() {
            if !ids.insert(id) {
                tracing::warn!(index, "Duplicate patient_id across record sources");
            }
        }
    }
}
