use super::GenerationError;

/// Hosted text-generation service abstraction (allows mocking).
///
/// One call is one request: submit a prompt, receive the produced text.
pub trait LlmClient {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}
