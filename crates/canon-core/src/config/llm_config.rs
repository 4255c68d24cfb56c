use serde::{Deserialize, Serialize};

use super::defaults;

/// Which text-generation backend to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Anthropic,
    Ollama,
}

impl ProviderKind {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "anthropic" => Some(Self::Anthropic),
            "ollama" => Some(Self::Ollama),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
        }
    }
}

/// Text-generation provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: ProviderKind,
    /// Model name. Empty means the provider's default.
    pub model: String,
    /// Base URL. Empty means the provider's default.
    pub base_url: String,
    /// Environment variable holding the API key (hosted providers only).
    pub api_key_env: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: String::new(),
            base_url: String::new(),
            api_key_env: defaults::DEFAULT_API_KEY_ENV.to_string(),
            max_tokens: defaults::DEFAULT_MAX_TOKENS,
            temperature: defaults::DEFAULT_TEMPERATURE,
            top_p: defaults::DEFAULT_TOP_P,
            timeout_secs: defaults::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl LlmConfig {
    pub fn resolved_model(&self) -> &str {
        if !self.model.is_empty() {
            return &self.model;
        }
        match self.provider {
            ProviderKind::Anthropic => defaults::DEFAULT_ANTHROPIC_MODEL,
            ProviderKind::Ollama => defaults::DEFAULT_OLLAMA_MODEL,
        }
    }

    pub fn resolved_base_url(&self) -> &str {
        if !self.base_url.is_empty() {
            return self.base_url.trim_end_matches('/');
        }
        match self.provider {
            ProviderKind::Anthropic => defaults::DEFAULT_ANTHROPIC_BASE_URL,
            ProviderKind::Ollama => defaults::DEFAULT_OLLAMA_BASE_URL,
        }
    }
}
