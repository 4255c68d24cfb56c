/// Text-generation transport and output errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LlmError {
    #[error("rate limited by {provider}")]
    RateLimited { provider: String },

    #[error("{provider} overloaded: HTTP {status}")]
    Overloaded { provider: String, status: u16 },

    #[error("connection to {provider} failed: {reason}")]
    Connection { provider: String, reason: String },

    #[error("{provider} returned HTTP {status}: {body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("malformed output: {reason}")]
    Malformed { reason: String },

    #[error("provider unavailable: {provider}")]
    ProviderUnavailable { provider: String },

    #[error("all {attempts} attempts exhausted: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

impl LlmError {
    /// Whether a retry has a chance of succeeding.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Overloaded { .. } | Self::Connection { .. }
        )
    }

    /// Whether the external dependency is gone for the rest of the claim.
    pub fn is_exhaustion(&self) -> bool {
        matches!(
            self,
            Self::RetriesExhausted { .. } | Self::ProviderUnavailable { .. }
        )
    }
}
