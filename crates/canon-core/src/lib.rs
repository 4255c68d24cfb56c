//! # canon-core
//!
//! Foundation crate for the Canon backstory verifier.
//! Defines the constraint vocabulary, the per-claim aggregate, prompt
//! templates, errors, config, traits, and constants.
//! Every other crate in the workspace depends on this.

pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod prompts;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use config::CanonConfig;
pub use errors::{CanonError, CanonResult};
pub use models::{
    Claim, ClaimAnalysis, ConstraintCategory, ConstraintViolation, EvidencePassage, Severity,
    SubClaim, TemporalSlice, Verdict, VerdictRecord,
};
