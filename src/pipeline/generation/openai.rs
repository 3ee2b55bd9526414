use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::types::LlmClient;
use super::GenerationError;
use crate::config::{ApiKey, AppConfig};

/// Blocking client for an OpenAI-compatible chat completions endpoint.
pub struct OpenAiClient {
    base_url: String,
    api_key: ApiKey,
    client: reqwest::blocking::Client,
    timeout_secs: Option<u64>,
}

impl OpenAiClient {
    /// `timeout_secs = None` disables the request timeout entirely.
    pub fn new(
        base_url: &str,
        api_key: ApiKey,
        timeout_secs: Option<u64>,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout_secs.map(Duration::from_secs))
            .build()
            .map_err(|e| GenerationError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            timeout_secs,
        })
    }

    pub fn from_config(config: &AppConfig, api_key: ApiKey) -> Result<Self, GenerationError> {
        Self::new(&config.api_base_url, api_key, config.request_timeout_secs)
    }
}

/// Request body for /chat/completions
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from /chat/completions
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Pull the first choice's text out of a completion response body.
pub fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body)
        .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedResponse("response has no choices".into()))?
        .message
        .content
        .ok_or_else(|| GenerationError::MalformedResponse("first choice has no content".into()))
}

/// Map a non-success HTTP status to the matching failure.
pub fn classify_status(status: u16, body: String) -> GenerationError {
    match status {
        401 | 403 => GenerationError::Authentication { status },
        429 => GenerationError::RateLimited(body),
        _ => GenerationError::Service { status, body },
    }
}

impl LlmClient for OpenAiClient {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    GenerationError::Connection(self.base_url.clone())
                } else if e.is_timeout() {
                    GenerationError::Timeout(self.timeout_secs.unwrap_or_default())
                } else {
                    GenerationError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(classify_status(status.as_u16(), body));
        }

        let text = response
            .text()
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        parse_completion(&text)
    }
}

/// Test double that returns a fixed response or a fixed failure.
pub struct MockLlmClient {
    response: Option<String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Every call fails with a 503 service error.
    pub fn failing() -> Self {
        Self {
            response: None,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().ok().and_then(|p| p.clone())
    }
}

impl LlmClient for MockLlmClient {
    fn generate(&self, _model: &str, prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }
        self.response
            .clone()
            .ok_or_else(|| GenerationError::Service {
                status: 503,
                body: "service unavailable".into(),
            })
    }
}
