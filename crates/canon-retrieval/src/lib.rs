//! # canon-retrieval
//!
//! Evidence stores for claim verification.
//!
//! ```text
//! IEvidenceStore
//! ├── TemporalRetriever   standard + counterfactual query over an INeighborIndex,
//! │                       same-book filter, top-k per EARLY/MID/LATE slice
//! └── FileEvidenceStore   pre-retrieved `<claim_id>.json` bundles on disk
//! ```

pub mod bundle;
pub mod counterfactual;
pub mod temporal;

pub use bundle::{EvidenceBundle, FileEvidenceStore};
pub use counterfactual::{counterfactual_query, standard_query};
pub use temporal::{same_book, TemporalRetriever};
