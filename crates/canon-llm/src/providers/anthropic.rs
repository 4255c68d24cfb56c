//! Anthropic Messages API provider.

use std::time::Duration;

use canon_core::config::LlmConfig;
use canon_core::errors::LlmError;
use canon_core::traits::{GenerationRequest, ITextGenerator};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::http::{build_client, send_error, status_error};

const PROVIDER: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";

/// Hosted provider over `POST /v1/messages`.
pub struct AnthropicProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    system: &'a str,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicProvider {
    /// Reads the API key from `config.api_key_env`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::ProviderUnavailable {
                provider: format!("{PROVIDER} ({} not set)", config.api_key_env),
            })?;
        Self::new(config, api_key)
    }

    pub fn new(config: &LlmConfig, api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_client(PROVIDER, Duration::from_secs(config.timeout_secs))?,
            base_url: config.resolved_base_url().to_string(),
            api_key,
            model: config.resolved_model().to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

impl ITextGenerator for AnthropicProvider {
    fn complete(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let url = format!("{}/v1/messages", self.base_url);
        let body = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            system: &request.system,
            messages: [Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .map_err(|e| send_error(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(status_error(PROVIDER, status, &text));
        }

        let parsed: MessagesResponse = response.json().map_err(|e| LlmError::Malformed {
            reason: format!("unreadable {PROVIDER} response: {e}"),
        })?;
        let text: String = parsed
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join("");
        debug!(provider = PROVIDER, chars = text.len(), "completion received");
        Ok(text)
    }

    fn name(&self) -> &str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape() {
        let body = MessagesRequest {
            model: "m",
            max_tokens: 1024,
            temperature: 0.1,
            system: "sys",
            messages: [Message {
                role: "user",
                content: "hi",
            }],
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["system"], "sys");
        assert_eq!(v["max_tokens"], 1024);
    }

    #[test]
    fn missing_key_is_unavailable() {
        let config = LlmConfig {
            api_key_env: "CANON_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..Default::default()
        };
        assert!(matches!(
            AnthropicProvider::from_config(&config),
            Err(LlmError::ProviderUnavailable { .. })
        ));
    }

    #[test]
    fn response_text_blocks_concatenate() {
        let parsed: MessagesResponse = serde_json::from_str(
            r#"{"content":[{"type":"text","text":"{\"a\":"},{"type":"text","text":"1}"}]}"#,
        )
        .unwrap();
        let text: String = parsed.content.into_iter().filter_map(|b| b.text).collect();
        assert_eq!(text, "{\"a\":1}");
    }
}
