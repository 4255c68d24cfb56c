use crate::errors::CanonResult;
use crate::models::VerdictRecord;

/// Persistence for produced verdict records, one per claim.
pub trait IVerdictStore: Send + Sync {
    fn exists(&self, claim_id: &str) -> CanonResult<bool>;
    fn save(&self, record: &VerdictRecord) -> CanonResult<()>;
    fn load(&self, claim_id: &str) -> CanonResult<VerdictRecord>;
    /// Every stored record, in no particular order.
    fn list(&self) -> CanonResult<Vec<VerdictRecord>>;
}
