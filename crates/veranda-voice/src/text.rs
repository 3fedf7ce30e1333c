//! Text-generation capability client.
//!
//! Talks to an OpenAI-compatible chat completions endpoint. The pipeline
//! asks for exactly one spoken sentence per call; whatever comes back is
//! cleaned up by `veranda_logic::dialogue` before anyone hears it.

use crate::config::{GenerationParams, TextConfig};
use crate::error::TextGenError;

/// HTTP client for the text-generation capability.
pub struct TextClient {
    client: reqwest::Client,
    config: TextConfig,
}

impl TextClient {
    pub fn new(config: TextConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Request a completion for `prompt`. A missing API key fails without
    /// touching the network.
    pub async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, TextGenError> {
        if self.config.api_key.is_empty() {
            return Err(TextGenError::KeyMissing);
        }

        let url = format!("{}/chat/completions", self.config.api_url);
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "user", "content": prompt}
            ],
            "temperature": params.temperature,
            "max_tokens": params.max_output_tokens,
        });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| TextGenError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(TextGenError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TextGenError::Request(e.to_string()))?;

        extract_completion_text(&json)
    }
}

/// Pull the completion text out of a chat completions response.
fn extract_completion_text(json: &serde_json::Value) -> Result<String, TextGenError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or(TextGenError::MalformedResponse)
}
