//! Configuration system for Canon.
//! TOML-based, layered resolution: CLI > env > project file > defaults.

pub mod batch_config;
pub mod canon_config;
pub mod defaults;
pub mod llm_config;
pub mod observability_config;
pub mod reasoning_config;
pub mod retrieval_config;
pub mod retry_config;
pub mod throttle_config;

pub use batch_config::BatchConfig;
pub use canon_config::{CanonConfig, CliOverrides};
pub use llm_config::{LlmConfig, ProviderKind};
pub use observability_config::ObservabilityConfig;
pub use reasoning_config::{ReasoningConfig, SynthesisThresholds, ThresholdProfile};
pub use retrieval_config::RetrievalConfig;
pub use retry_config::RetryConfig;
pub use throttle_config::ThrottleConfig;
