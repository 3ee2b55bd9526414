use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use zeroize::Zeroizing;

/// Application-level constants
pub const APP_NAME: &str = "Discharge Letter";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable that overrides the credentials file.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_AUDIT_LOG: &str = "discharge_log.jsonl";

/// Tracing filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "discharge_letter_lib=info,discharge_letter=info,warn"
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("No API key in {0} and OPENAI_API_KEY is not set")]
    MissingApiKey(PathBuf),
}

/// Everything the pipeline needs to run, in one place.
///
/// Loaded from a JSON file; any field left out takes its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Patient record files, one patient per file, in selection order.
    pub patient_sources: Vec<PathBuf>,
    /// Paginated transitions-of-care document fed to the prompt as guidance.
    pub instruction_document: PathBuf,
    /// JSON file holding `openai_api_key`.
    pub credentials_path: PathBuf,
    pub audit_log_path: PathBuf,
    pub model: String,
    pub api_base_url: String,
    /// `None` leaves the generation call without a timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            patient_sources: vec![
                PathBuf::from("data.json"),
                PathBuf::from("data_2.json"),
                PathBuf::from("data_3.json"),
            ],
            instruction_document: PathBuf::from("bmc-Transitions-of-Care.pdf"),
            credentials_path: PathBuf::from("credentials.json"),
            audit_log_path: PathBuf::from(DEFAULT_AUDIT_LOG),
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Access token for the generation service. Wiped from memory on drop
/// and never printed.
#[derive(Clone)]
pub struct ApiKey(Zeroizing<String>);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Zeroizing::new(key.into()))
    }

    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Deserialize)]
struct CredentialsFile {
    openai_api_key: Option<String>,
}

/// Resolve the API key: `OPENAI_API_KEY` first, then the credentials file.
pub fn load_api_key(credentials_path: &Path) -> Result<ApiKey, ConfigError> {
    resolve_api_key(std::env::var(API_KEY_ENV).ok(), credentials_path)
}

/// A non-blank `env_value` wins; otherwise fall back to the credentials file.
pub fn resolve_api_key(
    env_value: Option<String>,
    credentials_path: &Path,
) -> Result<ApiKey, ConfigError> {
    if let Some(key) = env_value.as_deref().map(str::trim) {
        if !key.is_empty() {
            tracing::debug!("Using API key from environment");
            return Ok(ApiKey::new(key));
        }
    }
    read_api_key_file(credentials_path)
}

/// Read `openai_api_key` from a credentials JSON file.
pub fn read_api_key_file(path: &Path) -> Result<ApiKey, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let credentials: CredentialsFile =
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    credentials
        .openai_api_key
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .map(ApiKey::new)
        .ok_or_else(|| ConfigError::MissingApiKey(path.to_path_buf()))
}
