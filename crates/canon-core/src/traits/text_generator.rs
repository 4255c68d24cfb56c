use crate::errors::LlmError;

/// Top-level JSON shape a caller expects back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedShape {
    Object,
    Array,
}

/// One generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system: String,
    pub prompt: String,
    pub shape: ExpectedShape,
}

impl GenerationRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>, shape: ExpectedShape) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            shape,
        }
    }
}

/// Raw text-generation transport. Returns text that should be JSON.
pub trait ITextGenerator: Send + Sync {
    /// A single attempt. Retry and throttling live above this.
    fn complete(&self, request: &GenerationRequest) -> Result<String, LlmError>;

    /// Human-readable provider name.
    fn name(&self) -> &str;

    /// Probe the backend without generating.
    fn health_check(&self) -> Result<(), LlmError> {
        Ok(())
    }
}
