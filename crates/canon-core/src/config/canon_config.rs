//! Top-level Canon configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{
    BatchConfig, LlmConfig, ObservabilityConfig, ProviderKind, ReasoningConfig, RetrievalConfig,
    RetryConfig, ThresholdProfile, ThrottleConfig,
};
use crate::errors::ConfigError;

/// Project config file name, looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "canon.toml";

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. CLI flags (applied via `apply_cli_overrides`)
/// 2. Environment variables (`CANON_*`)
/// 3. Project config (`canon.toml` in the project root)
/// 4. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CanonConfig {
    pub llm: LlmConfig,
    pub retry: RetryConfig,
    pub throttle: ThrottleConfig,
    pub reasoning: ReasoningConfig,
    pub retrieval: RetrievalConfig,
    pub batch: BatchConfig,
    pub observability: ObservabilityConfig,
}

/// CLI override arguments that can be applied to a config.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub provider: Option<ProviderKind>,
    pub model: Option<String>,
    pub evidence_dir: Option<String>,
    pub output_dir: Option<String>,
    pub max_concurrent_claims: Option<usize>,
    pub profile: Option<ThresholdProfile>,
}

impl CanonConfig {
    /// Load configuration from `root/canon.toml`, the environment and CLI flags.
    pub fn load(root: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let project_config_path = root.join(CONFIG_FILE_NAME);
        let config = if project_config_path.exists() {
            Self::from_file(&project_config_path)?
        } else {
            Self::default()
        };
        config.resolve(cli_overrides)
    }

    /// Like [`load`](Self::load) with an explicit file in place of `canon.toml`.
    pub fn load_file(path: &Path, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        Self::from_file(path)?.resolve(cli_overrides)
    }

    fn resolve(mut self, cli_overrides: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        self.apply_env_overrides();
        if let Some(cli) = cli_overrides {
            self.apply_cli_overrides(cli);
        }

        self.validate()?;
        Ok(self)
    }

    /// Load an explicit config file. Unknown keys are ignored.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a TOML string (for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm.max_tokens == 0 {
            return Err(invalid("llm.max_tokens", "must be greater than 0"));
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(invalid("llm.temperature", "must be between 0.0 and 2.0"));
        }
        if !(0.0..=1.0).contains(&self.llm.top_p) {
            return Err(invalid("llm.top_p", "must be between 0.0 and 1.0"));
        }
        if self.llm.timeout_secs == 0 {
            return Err(invalid("llm.timeout_secs", "must be greater than 0"));
        }
        if self.retry.max_attempts == 0 {
            return Err(invalid("retry.max_attempts", "must be at least 1"));
        }
        if self.retry.base_delay_ms > self.retry.max_delay_ms {
            return Err(invalid("retry.base_delay_ms", "must not exceed retry.max_delay_ms"));
        }
        if !(0.0..1.0).contains(&self.retry.jitter_fraction) {
            return Err(invalid("retry.jitter_fraction", "must be in [0.0, 1.0)"));
        }
        if self.reasoning.max_passages == 0 {
            return Err(invalid("reasoning.max_passages", "must be greater than 0"));
        }
        if self.reasoning.passage_char_limit == 0 {
            return Err(invalid("reasoning.passage_char_limit", "must be greater than 0"));
        }
        if self.reasoning.max_excerpts == 0 {
            return Err(invalid("reasoning.max_excerpts", "must be greater than 0"));
        }
        self.reasoning.resolved_thresholds().validate()?;
        if self.retrieval.top_k_per_slice == 0 {
            return Err(invalid("retrieval.top_k_per_slice", "must be greater than 0"));
        }
        for (field, value) in [
            ("retrieval.contradiction_boost", self.retrieval.contradiction_boost),
            ("retrieval.book_match_boost", self.retrieval.book_match_boost),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(invalid(field, "must be a non-negative number"));
            }
        }
        if self.batch.max_concurrent_claims == 0 {
            return Err(invalid("batch.max_concurrent_claims", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.batch.bias_warning_fraction) {
            return Err(invalid(
                "batch.bias_warning_fraction",
                "must be between 0.0 and 1.0",
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    /// Pattern: `CANON_LLM_PROVIDER`, `CANON_BATCH_MAX_CONCURRENT_CLAIMS`, etc.
    /// Unparseable values are ignored.
    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parse("CANON_LLM_PROVIDER", ProviderKind::parse) {
            self.llm.provider = v;
        }
        if let Ok(v) = std::env::var("CANON_LLM_MODEL") {
            self.llm.model = v;
        }
        if let Ok(v) = std::env::var("CANON_LLM_BASE_URL") {
            self.llm.base_url = v;
        }
        if let Some(v) = env_parse("CANON_LLM_MAX_TOKENS", |s| s.parse().ok()) {
            self.llm.max_tokens = v;
        }
        if let Some(v) = env_parse("CANON_LLM_TIMEOUT_SECS", |s| s.parse().ok()) {
            self.llm.timeout_secs = v;
        }
        if let Some(v) = env_parse("CANON_RETRY_MAX_ATTEMPTS", |s| s.parse().ok()) {
            self.retry.max_attempts = v;
        }
        if let Some(v) = env_parse("CANON_THROTTLE_INTER_CALL_PAUSE_MS", |s| s.parse().ok()) {
            self.throttle.inter_call_pause_ms = v;
        }
        if let Some(v) = env_parse("CANON_THROTTLE_INTER_CLAIM_PAUSE_MS", |s| s.parse().ok()) {
            self.throttle.inter_claim_pause_ms = v;
        }
        if let Some(v) = env_parse("CANON_REASONING_PROFILE", ThresholdProfile::parse) {
            self.reasoning.profile = v;
        }
        if let Some(v) = env_parse("CANON_REASONING_EVALUATE_SUB_CLAIMS", |s| s.parse().ok()) {
            self.reasoning.evaluate_sub_claims = v;
        }
        if let Ok(v) = std::env::var("CANON_BATCH_EVIDENCE_DIR") {
            self.batch.evidence_dir = v;
        }
        if let Ok(v) = std::env::var("CANON_BATCH_OUTPUT_DIR") {
            self.batch.output_dir = v;
        }
        if let Some(v) = env_parse("CANON_BATCH_MAX_CONCURRENT_CLAIMS", |s| s.parse().ok()) {
            self.batch.max_concurrent_claims = v;
        }
        if let Some(v) = env_parse("CANON_OBSERVABILITY_JSON", |s| s.parse().ok()) {
            self.observability.json = v;
        }
    }

    /// Apply CLI overrides (highest priority).
    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(v) = cli.provider {
            self.llm.provider = v;
        }
        if let Some(ref v) = cli.model {
            self.llm.model = v.clone();
        }
        if let Some(ref v) = cli.evidence_dir {
            self.batch.evidence_dir = v.clone();
        }
        if let Some(ref v) = cli.output_dir {
            self.batch.output_dir = v.clone();
        }
        if let Some(v) = cli.max_concurrent_claims {
            self.batch.max_concurrent_claims = v;
        }
        if let Some(v) = cli.profile {
            self.reasoning.profile = v;
        }
    }
}

fn env_parse<T>(key: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
    std::env::var(key).ok().and_then(|v| parse(v.trim()))
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}
