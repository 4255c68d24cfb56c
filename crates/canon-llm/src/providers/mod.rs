//! Text-generation providers and the factory that picks one from config.

pub mod anthropic;
mod http;
pub mod ollama;

pub use anthropic::AnthropicProvider;
pub use ollama::OllamaProvider;

use canon_core::config::{LlmConfig, ProviderKind};
use canon_core::errors::LlmError;
use canon_core::traits::ITextGenerator;
use tracing::{info, warn};

/// Build the configured provider.
///
/// Hosted providers need their API key in the environment. Local providers
/// are probed once; an unreachable server is reported but not fatal, since
/// each call surfaces its own connection error.
pub fn create_provider(config: &LlmConfig) -> Result<Box<dyn ITextGenerator>, LlmError> {
    match config.provider {
        ProviderKind::Anthropic => {
            let provider = AnthropicProvider::from_config(config)?;
            info!(provider = "anthropic", model = %provider.model(), "text generator ready");
            Ok(Box::new(provider))
        }
        ProviderKind::Ollama => {
            let provider = OllamaProvider::from_config(config)?;
            match provider.health_check() {
                Ok(()) => info!(provider = "ollama", model = %provider.model(), "text generator ready"),
                Err(e) => warn!(provider = "ollama", error = %e, "Ollama health check failed"),
            }
            Ok(Box::new(provider))
        }
    }
}
