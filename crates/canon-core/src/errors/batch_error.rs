/// Batch run errors.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("a run is already in progress")]
    AlreadyRunning,

    #[error("failed to build worker pool: {reason}")]
    WorkerPool { reason: String },

    #[error("failed to write results to {path}: {reason}")]
    ResultsWrite { path: String, reason: String },
}
