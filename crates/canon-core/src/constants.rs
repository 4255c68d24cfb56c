/// Canon system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Sub-claim id used for violations raised against the claim as a whole.
pub const MAIN_SUB_CLAIM_ID: &str = "MAIN";

/// Placeholder for a missing character or book name.
pub const UNKNOWN_FIELD: &str = "Unknown";

/// Contradiction confidence must exceed this to record a violation.
pub const VIOLATION_REPORTING_FLOOR: f64 = 0.3;

/// Contradiction confidence above this is a DEFINITE violation.
pub const DEFINITE_SEVERITY_FLOOR: f64 = 0.6;

/// Contradiction confidence above this is a LIKELY violation.
pub const LIKELY_SEVERITY_FLOOR: f64 = 0.4;

/// Support confidence used when the support pass produced nothing usable.
pub const SUPPORT_FAILURE_CONFIDENCE: f64 = 0.3;

/// Contradiction confidence used when the contradiction pass produced nothing usable.
pub const CONTRADICTION_FAILURE_CONFIDENCE: f64 = 0.0;

// --- Produced artifact limits ---
pub const MAX_RECORD_SPANS: usize = 3;
pub const MAX_SUB_CLAIM_EXCERPTS: usize = 3;
pub const MAX_RECORD_REASONING_CHARS: usize = 300;
pub const MAX_NOVEL_EXCERPT_CHARS: usize = 500;

// --- Results aggregation ---
pub const MAX_RATIONALE_CHARS: usize = 150;
