use crate::errors::CanonResult;
use crate::models::{Claim, EvidencePassage};

/// Produces scored, temporally tagged passages for a claim.
pub trait IEvidenceStore: Send + Sync {
    fn retrieve(&self, claim: &Claim) -> CanonResult<Vec<EvidencePassage>>;
}

/// Enumerates the claims of a run.
pub trait IClaimSource: Send + Sync {
    fn claims(&self) -> CanonResult<Vec<Claim>>;
}
