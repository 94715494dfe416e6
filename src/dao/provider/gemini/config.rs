use super::error::{ProviderError, ProviderResult};

/// Public endpoint of the Generative Language API.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Runtime configuration describing how to reach the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API root without a trailing slash.
    pub base_url: String,
    /// Sent in the `x-goog-api-key` header.
    pub api_key: String,
}

impl GeminiConfig {
    /// Explicit configuration, mostly for tests.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Read the API key from `GEMINI_API_KEY`, pairing it with `base_url`.
    pub fn from_env(base_url: impl Into<String>) -> ProviderResult<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey { var: API_KEY_ENV })?;
        Ok(Self::new(base_url, api_key))
    }
}
