use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a stage fell back to its default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefaultCause {
    /// The generator call failed (transport or retries exhausted).
    GenerationFailed { reason: String },
    /// The generator answered but the output could not be decoded.
    Malformed { reason: String },
    /// Nothing usable came back.
    Empty,
    /// An earlier call for this claim exhausted the generator; no call was made.
    DependencyExhausted,
}

impl fmt::Display for DefaultCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GenerationFailed { reason } => write!(f, "generation failed: {reason}"),
            Self::Malformed { reason } => write!(f, "malformed output: {reason}"),
            Self::Empty => f.write_str("empty output"),
            Self::DependencyExhausted => f.write_str("dependency exhausted"),
        }
    }
}

/// Result of a stage that calls out: either what was generated, or a default.
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutcome<T> {
    Generated(T),
    Defaulted { value: T, cause: DefaultCause },
}

impl<T> StageOutcome<T> {
    pub fn defaulted(value: T, cause: DefaultCause) -> Self {
        Self::Defaulted { value, cause }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Generated(value) | Self::Defaulted { value, .. } => value,
        }
    }

    pub fn cause(&self) -> Option<&DefaultCause> {
        match self {
            Self::Generated(_) => None,
            Self::Defaulted { cause, .. } => Some(cause),
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Self::Defaulted { .. })
    }

    /// Splits into the value and the cause, if any.
    pub fn into_parts(self) -> (T, Option<DefaultCause>) {
        match self {
            Self::Generated(value) => (value, None),
            Self::Defaulted { value, cause } => (value, Some(cause)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> StageOutcome<U> {
        match self {
            Self::Generated(value) => StageOutcome::Generated(f(value)),
            Self::Defaulted { value, cause } => StageOutcome::Defaulted {
                value: f(value),
                cause,
            },
        }
    }
}

/// The step of the per-claim pipeline a fallback happened in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum EvaluationStep {
    Retrieval,
    Decomposition,
    Support,
    Contradiction,
    SubClaimSupport { sub_claim_id: String },
    SubClaimContradiction { sub_claim_id: String },
}

impl fmt::Display for EvaluationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Retrieval => f.write_str("retrieval"),
            Self::Decomposition => f.write_str("decomposition"),
            Self::Support => f.write_str("support"),
            Self::Contradiction => f.write_str("contradiction"),
            Self::SubClaimSupport { sub_claim_id } => write!(f, "support[{sub_claim_id}]"),
            Self::SubClaimContradiction { sub_claim_id } => {
                write!(f, "contradiction[{sub_claim_id}]")
            }
        }
    }
}

/// A fallback taken while analysing one claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFallback {
    pub step: EvaluationStep,
    pub cause: DefaultCause,
}
