use std::sync::Arc;

use thiserror::Error;

use super::audit::{AuditLog, AuditRecord};
use super::generation::{GenerationError, LlmClient};
use super::prompt::{compose_prompt, ComposedPrompt, PiiMode, PromptSubject};
use super::redaction::{redact, RedactionError};
use crate::models::patient::PatientRecord;

#[derive(Error, Debug)]
pub enum SummaryError {
    #[error("Patient has no discharge date and is not safe to discharge")]
    NotDischargeReady,

    #[error("Redaction failed: {0}")]
    Redaction(#[from] RedactionError),

    #[error("Summary unavailable: {0}")]
    Generation(#[from] GenerationError),
}

/// Outcome of the audit write for a generated letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditStatus {
    Recorded,
    /// The letter was generated but the audit row could not be written.
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub summary: String,
    pub prompt: ComposedPrompt,
    pub audit: AuditStatus,
}

/// Runs the discharge letter pipeline:
/// readiness → (redact) → prompt → LLM → audit
pub struct DischargeSummarizer {
    llm: Arc<dyn LlmClient + Send + Sync>,
    model: String,
    audit_log: Arc<AuditLog>,
}

impl DischargeSummarizer {
    pub fn new(
        llm: Arc<dyn LlmClient + Send + Sync>,
        model: &str,
        audit_log: Arc<AuditLog>,
    ) -> Self {
        Self {
            llm,
            model: model.to_string(),
            audit_log,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a discharge letter for `record`.
    ///
    /// Exactly one generation request is made. The audit write is
    /// best-effort: if it fails the letter is still returned, with
    /// [`AuditStatus::Failed`].
    pub fn generate(
        &self,
        record: &PatientRecord,
        extra_guidance: &str,
        mode: PiiMode,
    ) -> Result<SummaryOutcome, SummaryError> {
        if !record.is_discharge_ready() {
            return Err(SummaryError::NotDischargeReady);
        }

        let prompt = match mode {
            PiiMode::With => compose_prompt(PromptSubject::Identified(record), extra_guidance),
            PiiMode::Without => {
                let redacted = redact(record)?;
                compose_prompt(PromptSubject::Redacted(&redacted), extra_guidance)
            }
        };

        tracing::info!(model = %self.model, pii = %mode, "Requesting discharge letter");
        let summary = self
            .llm
            .generate(&self.model, &prompt.text())
            .inspect_err(|e| tracing::warn!(error = %e, "Discharge letter generation failed"))?;
        tracing::info!(chars = summary.len(), "Discharge letter generated");

        let audit = match self.audit_log.append(&AuditRecord::new(&prompt, &summary)) {
            Ok(_) => AuditStatus::Recorded,
            Err(e) => {
                tracing::error!(
                    path = %self.audit_log.path().display(),
                    error = %e,
                    "Failed to write audit row; returning letter anyway"
                );
                AuditStatus::Failed(e.to_string())
            }
        };

        Ok(SummaryOutcome {
            summary,
            prompt,
            audit,
        })
    }
}
