//! Per-claim dependency gate.

use std::sync::atomic::{AtomicBool, Ordering};

use canon_core::errors::LlmError;
use canon_core::models::DefaultCause;
use canon_core::traits::ExpectedShape;
use canon_llm::StructuredClient;
use serde_json::Value;

/// Trips when a call for the claim exhausts the generator. Once tripped no
/// further calls are made; every caller gets `DependencyExhausted`.
#[derive(Debug, Default)]
pub struct DependencyGate {
    tripped: AtomicBool,
}

impl DependencyGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_tripped(&self) -> bool {
        self.tripped.load(Ordering::SeqCst)
    }

    pub fn trip(&self) {
        self.tripped.store(true, Ordering::SeqCst);
    }

    /// Generate through `client` unless the gate is tripped.
    pub fn generate(
        &self,
        client: &StructuredClient,
        prompt: &str,
        shape: ExpectedShape,
    ) -> Result<Value, DefaultCause> {
        if self.is_tripped() {
            return Err(DefaultCause::DependencyExhausted);
        }
        client.generate(prompt, shape).map_err(|e| {
            if e.is_exhaustion() {
                self.trip();
            }
            cause_of(e)
        })
    }
}

fn cause_of(error: LlmError) -> DefaultCause {
    match error {
        LlmError::Malformed { reason } => DefaultCause::Malformed { reason },
        other => DefaultCause::GenerationFailed {
            reason: other.to_string(),
        },
    }
}
