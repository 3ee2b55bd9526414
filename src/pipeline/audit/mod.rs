pub mod trail;

pub use trail::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize audit record: {0}")]
    Serialization(String),

    #[error("Corrupt audit row at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("Audit log lock poisoned")]
    LockPoisoned,
}
