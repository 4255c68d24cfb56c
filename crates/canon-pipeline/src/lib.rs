//! # canon-pipeline
//!
//! Runs the verifier over every claim of a run and keeps the results.
//!
//! - [`BatchRunner`]: parallel, resumable, cancellable batch over a claim source
//! - [`FsVerdictStore`]: one JSON record per claim, written atomically
//! - [`RunStatus`]: shared progress record with a bounded log
//! - [`ResultsSummary`]: binary predictions, breakdown and bias check

pub mod aggregate;
pub mod batch;
pub mod status;
pub mod store;

pub use aggregate::{prediction_for, rationale, ResultRow, ResultsSummary, VerdictCounts};
pub use batch::{BatchReport, BatchRunner, ClaimFailure};
pub use status::{RunStatus, StatusSnapshot};
pub use store::FsVerdictStore;
