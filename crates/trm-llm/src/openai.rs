//! OpenAI-compatible chat completions client

use crate::{CompletionClient, CompletionError, CompletionRequest, CompletionResult, ModelSettings};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// HTTP client for `POST {endpoint}/chat/completions`
///
/// One attempt per call; the transport timeout comes from the settings and
/// is reported as `CompletionError::TimeoutError`.
pub struct OpenAiClient {
    settings: ModelSettings,
    client: Client,
}

impl OpenAiClient {
    pub fn new(settings: ModelSettings) -> Self {
        Self {
            client: Client::new(),
            settings,
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.settings.endpoint.trim_end_matches('/'))
    }

    fn transport_error(&self, error: reqwest::Error) -> CompletionError {
        if error.is_timeout() {
            CompletionError::TimeoutError(self.settings.timeout_seconds)
        } else {
            CompletionError::HttpError(error)
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> CompletionResult<String> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(CompletionError::MissingCredential)?;

        let body = ChatCompletionRequest {
            model: &request.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &request.prompt,
            }],
            temperature: request.temperature,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key.trim())
            .json(&body)
            .timeout(Duration::from_secs(self.settings.timeout_seconds))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            return Err(match status {
                401 | 403 => CompletionError::AuthError(text),
                429 => CompletionError::RateLimited(text),
                _ => CompletionError::ApiError { status, message: text },
            });
        }

        let text = response.text().await.map_err(|e| self.transport_error(e))?;
        let parsed: ChatCompletionResponse =
            serde_json::from_str(&text).map_err(|e| CompletionError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| CompletionError::MalformedResponse("response contained no message content".to_string()))
    }
}

/// Chat completions request body
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Chat completions response body (only the fields we read)
#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}
