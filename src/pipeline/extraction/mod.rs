pub mod types;
pub mod pdf;
pub mod instruction;

pub use types::*;
pub use pdf::*;
pub use instruction::*;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Instruction document not found: {0}")]
    DocumentNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),
}
