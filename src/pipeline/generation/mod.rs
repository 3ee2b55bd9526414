pub mod types;
pub mod openai;

pub use types::*;
pub use openai::*;

use thiserror::Error;

/// Failures of a single generation request. Never retried internally.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation service is not reachable at {0}")]
    Connection(String),

    #[error("Generation request timed out after {0}s")]
    Timeout(u64),

    #[error("Generation service rejected the credential (status {status})")]
    Authentication { status: u16 },

    #[error("Generation service quota or rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Generation service returned error (status {status}): {body}")]
    Service { status: u16, body: String },

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}
