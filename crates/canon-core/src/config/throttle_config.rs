use serde::{Deserialize, Serialize};

use super::defaults;

/// Pauses that keep a run inside the provider's rate budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Minimum gap between any two generator calls, across all claims.
    pub inter_call_pause_ms: u64,
    /// Pause a worker takes after finishing a claim.
    pub inter_claim_pause_ms: u64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            inter_call_pause_ms: defaults::DEFAULT_INTER_CALL_PAUSE_MS,
            inter_claim_pause_ms: defaults::DEFAULT_INTER_CLAIM_PAUSE_MS,
        }
    }
}
