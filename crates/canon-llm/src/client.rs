//! Structured generation: throttle, call, retry transient failures, repair.

use std::sync::{Arc, Mutex};

use canon_core::errors::LlmError;
use canon_core::prompts::SYSTEM_INSTRUCTION;
use canon_core::traits::{ExpectedShape, GenerationRequest, ITextGenerator, Sleeper, ThreadSleeper};
use canon_observability::events;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;
use tracing::debug;

use crate::repair::repair_json;
use crate::retry::RetryPolicy;
use crate::throttle::Throttle;

/// Wraps a raw [`ITextGenerator`] into a call that yields decoded JSON.
///
/// Only transient errors are retried. Malformed output is repaired once and
/// otherwise returned as `LlmError::Malformed`. When every attempt fails
/// transiently the result is `LlmError::RetriesExhausted`.
pub struct StructuredClient {
    generator: Arc<dyn ITextGenerator>,
    policy: RetryPolicy,
    throttle: Arc<Throttle>,
    sleeper: Arc<dyn Sleeper>,
    rng: Mutex<StdRng>,
}

impl StructuredClient {
    pub fn new(generator: Arc<dyn ITextGenerator>, policy: RetryPolicy, throttle: Arc<Throttle>) -> Self {
        Self {
            generator,
            policy,
            throttle,
            sleeper: Arc::new(ThreadSleeper),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Replace the backoff sleeper.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Deterministic jitter.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    pub fn provider_name(&self) -> &str {
        self.generator.name()
    }

    pub fn health_check(&self) -> Result<(), LlmError> {
        self.generator.health_check()
    }

    /// One structured call with the fixed system instruction.
    pub fn generate(&self, prompt: &str, shape: ExpectedShape) -> Result<Value, LlmError> {
        let request = GenerationRequest::new(SYSTEM_INSTRUCTION, prompt, shape);
        let text = self.complete_with_retry(&request)?;
        repair_json(&text, shape)
    }

    fn complete_with_retry(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let provider = self.generator.name().to_string();
        let mut last_error = None;

        for attempt in 0..self.policy.max_attempts {
            self.throttle.wait();
            match self.generator.complete(request) {
                Ok(text) => {
                    debug!(provider = %provider, attempt, "generation succeeded");
                    return Ok(text);
                }
                Err(e) if e.is_transient() => {
                    if attempt + 1 < self.policy.max_attempts {
                        let delay = {
                            let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
                            self.policy.delay_for(attempt, &mut *rng)
                        };
                        events::retry_scheduled(
                            &provider,
                            attempt + 1,
                            delay.as_millis() as u64,
                            &e.to_string(),
                        );
                        self.sleeper.sleep(delay);
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(LlmError::RetriesExhausted {
            attempts: self.policy.max_attempts,
            last: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempts made".to_string()),
        })
    }
}
