//! Model-backed classification
//!
//! This crate delegates classification to an external text-completion
//! service and constrains whatever comes back to the taxonomy:
//! - `CompletionClient`: narrow request/response seam (model, prompt, temperature in, text out)
//! - `OpenAiClient`: OpenAI-compatible chat completions over HTTP
//! - `ModelClassifier`: prompt construction, response validation and rule fallback

pub mod classifier;
pub mod openai;
pub mod response;

pub use classifier::ModelClassifier;
pub use openai::OpenAiClient;
pub use response::{build_prompt, interpret_response, ResponseOutcome, SentinelReason};

use serde::Serialize;
use std::fmt;

/// Default completion model
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Default OpenAI-compatible API base
pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

/// Single completion request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub prompt: String,
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(settings: &ModelSettings, prompt: impl Into<String>) -> Self {
        Self {
            model: settings.model.clone(),
            prompt: prompt.into(),
            temperature: settings.temperature,
        }
    }
}

/// Text-completion service trait
#[async_trait::async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one prompt and return the raw completion text
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<String>;
}

/// Model service configuration
#[derive(Clone, PartialEq)]
pub struct ModelSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub endpoint: String,
    pub timeout_seconds: u64,
}

impl ModelSettings {
    pub fn new() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: 30,
        }
    }

    /// Read `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_TEMPERATURE` and `OPENAI_BASE_URL`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from any variable source; unparsable values keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::new();

        settings.api_key = lookup("OPENAI_API_KEY");
        if let Some(model) = lookup("OPENAI_MODEL").filter(|m| !m.trim().is_empty()) {
            settings.model = model.trim().to_string();
        }
        if let Some(temperature) = lookup("OPENAI_TEMPERATURE").and_then(|t| t.trim().parse().ok()) {
            settings.temperature = temperature;
        }
        if let Some(endpoint) = lookup("OPENAI_BASE_URL").filter(|e| !e.trim().is_empty()) {
            settings.endpoint = endpoint.trim().to_string();
        }

        settings
    }

    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    /// A credential is configured only when it is non-blank
    pub fn has_credential(&self) -> bool {
        self.api_key.as_deref().map(|k| !k.trim().is_empty()).unwrap_or(false)
    }
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("endpoint", &self.endpoint)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Completion operation result type
pub type CompletionResult<T> = Result<T, CompletionError>;

/// Completion service errors
///
/// Every variant is recovered inside `ModelClassifier` by falling back to
/// the keyword rules.
#[derive(thiserror::Error, Debug)]
pub enum CompletionError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Request timed out after {0}s")]
    TimeoutError(u64),

    #[error("Authentication failed: {0}")]
    AuthError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No model API key configured")]
    MissingCredential,

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}
