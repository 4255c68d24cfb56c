//! # canon-llm
//!
//! Everything between a prompt and a decoded JSON value: hosted and local
//! providers, exponential backoff with jitter for transient failures, a
//! run-wide call throttle, and repair of near-JSON output.

pub mod client;
pub mod providers;
pub mod repair;
pub mod retry;
pub mod throttle;

pub use client::StructuredClient;
pub use providers::{create_provider, AnthropicProvider, OllamaProvider};
pub use repair::repair_json;
pub use retry::RetryPolicy;
pub use throttle::Throttle;
