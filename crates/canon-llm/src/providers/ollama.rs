//! Ollama local generation provider.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use canon_core::config::LlmConfig;
use canon_core::errors::LlmError;
use canon_core::traits::{GenerationRequest, ITextGenerator};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::http::{build_client, send_error, status_error};

const PROVIDER: &str = "ollama";
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Local provider over `POST /api/generate`, non-streaming.
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
    options: GenerateOptions,
    available: AtomicBool,
}

#[derive(Debug, Clone, Serialize)]
struct GenerateOptions {
    temperature: f64,
    num_predict: u32,
    top_p: f64,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
    options: &'a GenerateOptions,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

impl OllamaProvider {
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_client(PROVIDER, Duration::from_secs(config.timeout_secs))?,
            base_url: config.resolved_base_url().to_string(),
            model: config.resolved_model().to_string(),
            options: GenerateOptions {
                temperature: config.temperature,
                num_predict: config.max_tokens,
                top_p: config.top_p,
            },
            // Calls are attempted until a health check says otherwise.
            available: AtomicBool::new(true),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::Relaxed)
    }

    fn installed_models(&self) -> Result<Vec<String>, LlmError> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self
            .client
            .get(&url)
            .timeout(HEALTH_TIMEOUT)
            .send()
            .map_err(|e| send_error(PROVIDER, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(status_error(PROVIDER, status, ""));
        }
        let tags: TagsResponse = response.json().map_err(|e| LlmError::Malformed {
            reason: format!("unreadable tag list: {e}"),
        })?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

impl ITextGenerator for OllamaProvider {
    fn complete(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        if !self.is_available() {
            return Err(LlmError::ProviderUnavailable {
                provider: PROVIDER.to_string(),
            });
        }

        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model: &self.model,
            prompt: &request.prompt,
            system: &request.system,
            stream: false,
            options: &self.options,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| send_error(PROVIDER, e))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(status_error(PROVIDER, status, &text));
        }

        let parsed: GenerateResponse = response.json().map_err(|e| LlmError::Malformed {
            reason: format!("unreadable {PROVIDER} response: {e}"),
        })?;
        debug!(provider = PROVIDER, chars = parsed.response.len(), "completion received");
        Ok(parsed.response.trim().to_string())
    }

    fn name(&self) -> &str {
        PROVIDER
    }

    /// Reachable, and the configured model is installed.
    fn health_check(&self) -> Result<(), LlmError> {
        match self.installed_models() {
            Ok(models) => {
                self.available.store(true, Ordering::Relaxed);
                let base = self.model.split(':').next().unwrap_or(&self.model);
                if !models.iter().any(|m| m.starts_with(base)) {
                    warn!(model = %self.model, installed = ?models, "model not installed in Ollama");
                }
                debug!(model = %self.model, "Ollama health check passed");
                Ok(())
            }
            Err(e) => {
                if !e.is_transient() {
                    self.available.store(false, Ordering::Relaxed);
                }
                Err(e)
            }
        }
    }
}
