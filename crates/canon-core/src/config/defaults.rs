// ─── LLM ───────────────────────────────────────────────────────────────────
pub const DEFAULT_PROVIDER: &str = "anthropic";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-3-haiku-20240307";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_OLLAMA_MODEL: &str = "qwen2.5:7b";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

// ─── Retry ─────────────────────────────────────────────────────────────────
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 60_000;
pub const DEFAULT_JITTER_FRACTION: f64 = 0.25;

// ─── Throttle ──────────────────────────────────────────────────────────────
pub const DEFAULT_INTER_CALL_PAUSE_MS: u64 = 500;
pub const DEFAULT_INTER_CLAIM_PAUSE_MS: u64 = 1_000;

// ─── Reasoning ─────────────────────────────────────────────────────────────
pub const DEFAULT_MAX_PASSAGES: usize = 5;
pub const DEFAULT_PASSAGE_CHAR_LIMIT: usize = 1_500;
pub const DEFAULT_MAX_EXCERPTS: usize = 5;

// Conservative synthesis profile.
pub const CONSERVATIVE_CONTRADICTION_THRESHOLD: f64 = 0.4;
pub const CONSERVATIVE_STRONG_SUPPORT_THRESHOLD: f64 = 0.7;
pub const CONSERVATIVE_WEAK_CONTRADICTION_THRESHOLD: f64 = 0.25;
pub const CONSERVATIVE_CONTRADICTION_BONUS: f64 = 0.1;
pub const CONSERVATIVE_SUPPORT_PENALTY: f64 = 0.9;

// Boosted synthesis profile.
pub const BOOSTED_CONTRADICTION_THRESHOLD: f64 = 0.5;
pub const BOOSTED_STRONG_SUPPORT_THRESHOLD: f64 = 0.6;
pub const BOOSTED_WEAK_CONTRADICTION_THRESHOLD: f64 = 0.3;
pub const BOOSTED_CONTRADICTION_BONUS: f64 = 0.15;
pub const BOOSTED_SUPPORT_PENALTY: f64 = 1.0;

pub const DEFAULT_CONFIDENCE_CAP: f64 = 0.95;
pub const DEFAULT_UNDETERMINED_FLOOR: f64 = 0.3;
pub const DEFAULT_UNDETERMINED_CAP: f64 = 0.5;

// ─── Retrieval ─────────────────────────────────────────────────────────────
pub const DEFAULT_TOP_K_PER_SLICE: usize = 3;
pub const DEFAULT_CONTRADICTION_BOOST: f64 = 0.15;
pub const DEFAULT_BOOK_MATCH_BOOST: f64 = 0.2;

// ─── Batch ─────────────────────────────────────────────────────────────────
pub const DEFAULT_EVIDENCE_DIR: &str = "evidence";
pub const DEFAULT_OUTPUT_DIR: &str = "results";
pub const DEFAULT_MAX_CONCURRENT_CLAIMS: usize = 1;
pub const DEFAULT_BIAS_WARNING_FRACTION: f64 = 0.8;

// ─── Observability ─────────────────────────────────────────────────────────
pub const DEFAULT_LOG_LEVEL: &str = "info";
