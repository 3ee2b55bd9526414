pub mod store;

pub use store::*;

use std::path::PathBuf;

use thiserror::Error;

/// Ingestion failures. Any one of these aborts the whole load.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("Patient record source not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read patient record {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Patient record {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Patient record {0} is not a JSON object")]
    NotAnObject(PathBuf),
}
