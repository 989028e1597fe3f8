//! Settings for the suggestion service.
//!
//! The credential is an ordinary value handed to whoever makes the request;
//! nothing here is process-wide. It is looked up from, in order: an explicit
//! value (command line), the `GEMINI_API_KEY` environment variable, and the
//! `api_key.json` file in the user's config directory.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "GEMINI_MODEL";

const APP_DIR: &str = "wordle-assistant";
const API_KEY_FILE: &str = "api_key.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key: pass --api-key, set GEMINI_API_KEY, or create api_key.json")]
    MissingApiKey,
    #[error("could not read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("{path} is not a valid key file: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Shape of `api_key.json`.
#[derive(Debug, Deserialize)]
struct ApiKeyFile {
    gemini_api_key: String,
}

/// Everything needed to call the model.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuggestConfig {
    pub api_key: String,
    pub model: String,
    pub endpoint: String,
}

impl SuggestConfig {
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    /// Full `generateContent` URL for the configured model, including the key.
    #[must_use]
    pub fn request_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, self.api_key
        )
    }
}

/// Where the key file is expected, if the platform has a config directory.
#[must_use]
pub fn api_key_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(API_KEY_FILE))
}

/// Read `{"gemini_api_key": "..."}` from `path`.
pub fn read_api_key_file(path: &Path) -> Result<String, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ApiKeyFile = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(file.gemini_api_key)
}

/// Pick the first non-empty key among the explicit value, the environment
/// value and the key file.
pub fn resolve_api_key(
    explicit: Option<&str>,
    from_env: Option<&str>,
    key_file: Option<&Path>,
) -> Result<String, ConfigError> {
    if let Some(key) = [explicit, from_env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|key| !key.is_empty())
    {
        return Ok(key.to_string());
    }
    match key_file {
        Some(path) if path.exists() => {
            let key = read_api_key_file(path)?;
            let key = key.trim();
            if key.is_empty() {
                Err(ConfigError::MissingApiKey)
            } else {
                Ok(key.to_string())
            }
        }
        _ => Err(ConfigError::MissingApiKey),
    }
}

/// First non-blank model name among the explicit value and the environment
/// value, else [`DEFAULT_MODEL`].
#[must_use]
pub fn resolve_model(explicit: Option<&str>, from_env: Option<&str>) -> String {
    [explicit, from_env]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|model| !model.is_empty())
        .unwrap_or(DEFAULT_MODEL)
        .to_string()
}

/// Build a [`SuggestConfig`] from command line values, the process
/// environment and the default key file location.
pub fn load_config(
    api_key: Option<&str>,
    model: Option<&str>,
    endpoint: Option<&str>,
) -> Result<SuggestConfig, ConfigError> {
    let env_key = std::env::var(API_KEY_ENV).ok();
    let key_path = api_key_path();
    let key = resolve_api_key(api_key, env_key.as_deref(), key_path.as_deref())?;

    let env_model = std::env::var(MODEL_ENV).ok();
    let model = resolve_model(model, env_model.as_deref());

    Ok(SuggestConfig::new(key)
        .with_model(model)
        .with_endpoint(endpoint.unwrap_or(DEFAULT_ENDPOINT)))
}
