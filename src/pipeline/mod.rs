pub mod records;
pub mod extraction;
pub mod redaction;
pub mod prompt;
pub mod generation;
pub mod audit;
pub mod summarizer; // readiness → redact → prompt → LLM → audit
