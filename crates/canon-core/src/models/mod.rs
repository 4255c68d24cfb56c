//! Constraint model: the vocabulary and records shared by every stage.

mod analysis;
mod category;
mod claim;
mod evidence;
mod outcome;
mod record;
mod sub_claim;
mod verdict;
mod violation;

pub use analysis::{clamp_unit, AnalysisStage, ClaimAnalysis, SubClaimEvaluation};
pub use category::{ConstraintCategory, ViolationLabel};
pub use claim::{compare_claim_ids, string_or_number, Claim};
pub use evidence::{EvidencePassage, QueryType, TemporalPosition, TemporalSlice};
pub use outcome::{DefaultCause, EvaluationStep, StageFallback, StageOutcome};
pub use record::{
    round2, truncate_chars, AnalysisReport, SubClaimReport, TemporalCounts, VerdictRecord,
};
pub use sub_claim::SubClaim;
pub use verdict::{Severity, Verdict};
pub use violation::ConstraintViolation;
