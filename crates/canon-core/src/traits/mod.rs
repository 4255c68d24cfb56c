//! Seams to external collaborators.

pub mod cancellation;
pub mod evidence_store;
pub mod neighbor_index;
pub mod sleeper;
pub mod text_generator;
pub mod verdict_store;

pub use cancellation::{Cancellable, CancellationToken};
pub use evidence_store::{IClaimSource, IEvidenceStore};
pub use neighbor_index::INeighborIndex;
pub use sleeper::{Sleeper, ThreadSleeper};
pub use text_generator::{ExpectedShape, GenerationRequest, ITextGenerator};
pub use verdict_store::IVerdictStore;
