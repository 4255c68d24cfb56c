use serde::{Deserialize, Serialize};

use super::defaults;

/// Batch run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory of per-claim evidence bundles.
    pub evidence_dir: String,
    /// Directory verdict records are written to.
    pub output_dir: String,
    pub max_concurrent_claims: usize,
    /// Share of SUPPORTED verdicts above which a bias warning is raised.
    pub bias_warning_fraction: f64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            evidence_dir: defaults::DEFAULT_EVIDENCE_DIR.to_string(),
            output_dir: defaults::DEFAULT_OUTPUT_DIR.to_string(),
            max_concurrent_claims: defaults::DEFAULT_MAX_CONCURRENT_CLAIMS,
            bias_warning_fraction: defaults::DEFAULT_BIAS_WARNING_FRACTION,
        }
    }
}
