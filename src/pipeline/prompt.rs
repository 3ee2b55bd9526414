use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::redaction::RedactedPatientRecord;
use crate::models::patient::{demographics, render_scalar, PatientRecord, NAME_KEY};

/// Signature used by every generated letter.
pub const SENDER_IDENTITY: &str = "Dr. Winn AI";
pub const GREETING: &str = "Dear Post-Hospital Care Team";
/// Separates the instruction header from the serialized patient data.
pub const DATA_MARKER: &str = "Data:";

const DRAFTING_REQUIREMENTS: &str = "Requirements:
- Please do not use bullet point, responses should be in prose.
- Provide a summary of the stay, key issues, interventions, condition at discharge, follow-up plans, and ongoing treatment if relevant.
- Exclude irrelevant lab data, focusing on first/last labs and any out-of-range values.
- Reason through whether the patient is safe to discharge, considering any potential errors.
After generating the discharge letter, review it again to make sure that all the requirements are met, and it is clear to the care teams what they have to do next.
Finally, ensure the letter is kept to one page long.";

const WITHOUT_PII_CLAUSE: &str =
    "Please do not include patient name, gender, age, and patient id in the output.";

/// Whether identifying fields reach the generation service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PiiMode {
    With,
    Without,
}

impl PiiMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::With => "with",
            Self::Without => "without",
        }
    }
}

impl fmt::Display for PiiMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Patient data a prompt is built from. The variant fixes the PII mode, so
/// a without-PII prompt can only ever carry redacted data.
#[derive(Debug, Clone, Copy)]
pub enum PromptSubject<'a> {
    Identified(&'a PatientRecord),
    Redacted(&'a RedactedPatientRecord),
}

impl PromptSubject<'_> {
    pub fn mode(&self) -> PiiMode {
        match self {
            Self::Identified(_) => PiiMode::With,
            Self::Redacted(_) => PiiMode::Without,
        }
    }

    fn document(&self) -> &Map<String, Value> {
        match self {
            Self::Identified(record) => record.document(),
            Self::Redacted(record) => record.document(),
        }
    }
}

/// A prompt split into its instruction header and data section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    header: String,
    data: String,
    mode: PiiMode,
}

impl ComposedPrompt {
    /// Everything before the data section. This is what gets audited.
    pub fn header(&self) -> &str {
        &self.header
    }

    /// Serialized patient data.
    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn mode(&self) -> PiiMode {
        self.mode
    }

    /// Full text submitted to the generation service.
    pub fn text(&self) -> String {
        format!("{}\n{DATA_MARKER} {}", self.header, self.data)
    }
}

/// Wrap instruction-document text the way the letter generator expects it.
pub fn instruction_guidance(document_text: &str) -> String {
    format!("Discharge Summary Introduction: {document_text}\n")
}

/// Build the discharge-letter prompt. Output depends only on the inputs.
///
/// The persona line names the patient from the subject's own demographics;
/// for redacted subjects the name is gone and the placeholder renders empty.
pub fn compose_prompt(subject: PromptSubject<'_>, extra_guidance: &str) -> ComposedPrompt {
    let mode = subject.mode();
    let document = subject.document();

    let patient_name = demographics(document)
        .and_then(|d| d.get(NAME_KEY))
        .and_then(render_scalar)
        .unwrap_or_default();

    let pii_clause = match mode {
        PiiMode::With => String::new(),
        PiiMode::Without => format!("{WITHOUT_PII_CLAUSE}\n"),
    };

    let header = format!(
        "You are a doctor writing a discharge letter for {patient_name}.
You are the physician ({SENDER_IDENTITY}) in charge of this patient writing the discharge letter
with the goal of communicating the patient's care plan to the post-hospital care team, the next setting of care, or the caretakers of the patient.
Please add {GREETING} in the beginning and Sincerely DR. Winn AI.
Use patient data from context only. Minimize hallucinations.
{pii_clause}{DRAFTING_REQUIREMENTS}
{extra_guidance}"
    );

    ComposedPrompt {
        header: header.trim().to_string(),
        data: Value::Object(document.clone()).to_string(),
        mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::redaction::redact;
    use serde_json::json;

    fn jane_doe() -> PatientRecord {
        PatientRecord::from_value(json!({
            "patient_id": "P1",
            "demographics": {
                "name": "Jane Doe",
                "age": 70,
                "gender": "F",
                "discharge_date": "2024-01-05"
            }
        }))
        .unwrap()
    }

    #[test]
    fn with_pii_data_section_contains_name() {
        let record = jane_doe();
        let prompt = compose_prompt(PromptSubject::Identified(&record), "");

        assert_eq!(prompt.mode(), PiiMode::With);
        assert!(prompt.data().contains("\"Jane Doe\""));
        assert!(prompt.header().contains("discharge letter for Jane Doe."));
        assert!(!prompt.header().contains(WITHOUT_PII_CLAUSE));
    }

    #[test]
    fn without_pii_data_section_has_no_identifiers() {
        let record = jane_doe();
        let redacted = redact(&record).unwrap();
        let prompt = compose_prompt(PromptSubject::Redacted(&redacted), "");

        assert_eq!(prompt.mode(), PiiMode::Without);
        let data = prompt.data();
        assert!(!data.contains("Jane Doe"));
        assert!(!data.contains("Jane"));
        for key in ["\"age\"", "\"gender\"", "\"patient_id\""] {
            assert!(!data.contains(key), "data section leaked {key}");
        }
        assert!(data.contains("2024-01-05"));
    }

    #[test]
    fn without_pii_header_has_empty_name_and_omission_clause() {
        let record = jane_doe();
        let redacted = redact(&record).unwrap();
        let prompt = compose_prompt(PromptSubject::Redacted(&redacted), "");

        assert!(prompt.header().starts_with("You are a doctor writing a discharge letter for ."));
        assert!(prompt.header().contains(WITHOUT_PII_CLAUSE));
        assert!(!prompt.text().contains("Jane Doe"));
    }

    #[test]
    fn header_carries_persona_and_requirements() {
        let record = jane_doe();
        let prompt = compose_prompt(PromptSubject::Identified(&record), "");
        let header = prompt.header();

        assert!(header.contains(SENDER_IDENTITY));
        assert!(header.contains(GREETING));
        assert!(header.contains("responses should be in prose"));
        assert!(header.contains("first/last labs and any out-of-range values"));
        assert!(header.contains("safe to discharge"));
        assert!(header.contains("review it again"));
        assert!(header.contains("one page long"));
    }

    #[test]
    fn guidance_is_included_verbatim_before_data() {
        let record = jane_doe();
        let guidance = instruction_guidance("Include medication reconciliation.");
        let prompt = compose_prompt(PromptSubject::Identified(&record), &guidance);

        assert!(prompt
            .header()
            .ends_with("Discharge Summary Introduction: Include medication reconciliation."));

        let text = prompt.text();
        let guidance_at = text.find("medication reconciliation").unwrap();
        let data_at = text.find(DATA_MARKER).unwrap();
        assert!(guidance_at < data_at);
    }

    #[test]
    fn header_excludes_data_section() {
        let record = jane_doe();
        let prompt = compose_prompt(PromptSubject::Identified(&record), "extra");

        assert!(!prompt.header().contains(DATA_MARKER));
        assert!(!prompt.header().contains("2024-01-05"));
        assert_eq!(
            prompt.text(),
            format!("{}\nData: {}", prompt.header(), prompt.data())
        );
    }

    #[test]
    fn composition_is_deterministic() {
        let record = jane_doe();
        let a = compose_prompt(PromptSubject::Identified(&record), "g");
        let b = compose_prompt(PromptSubject::Identified(&record), "g");
        assert_eq!(a, b);
    }

    #[test]
    fn pii_mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&PiiMode::With).unwrap(), "\"with\"");
        assert_eq!(serde_json::to_string(&PiiMode::Without).unwrap(), "\"without\"");
        assert_eq!(PiiMode::Without.to_string(), "without");
    }
}
