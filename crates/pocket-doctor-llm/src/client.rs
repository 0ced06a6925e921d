//! OpenAI-compatible chat-completions client.

use pocket_doctor_core::LlmConfig;
use serde::{Deserialize, Serialize};

use crate::extraction::{ExtractionError, ExtractionResult, LlmClient};

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking client for `{base_url}/chat/completions`.
pub struct OpenAiClient {
    http: reqwest::blocking::Client,
    config: LlmConfig,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(config: LlmConfig, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            config,
            api_key: api_key.into(),
        }
    }

    /// Read the API key from the environment variable named in the config.
    pub fn from_env(config: LlmConfig) -> ExtractionResult<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ExtractionError::Inference(format!("{} not set", config.api_key_env))
        })?;
        Ok(Self::new(config, api_key))
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }
}

impl LlmClient for OpenAiClient {
    fn complete(&self, system: &str, user: &str) -> ExtractionResult<String> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            temperature: self.config.temperature,
        };

        tracing::debug!(model = %self.config.model, endpoint = %self.endpoint(), "Requesting completion");

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| ExtractionError::Inference(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(ExtractionError::Inference(format!("API error {status}: {body}")));
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| ExtractionError::Inference(format!("Failed to parse response: {e}")))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ExtractionError::Inference("No content in response".into()))
    }
}
