//! Error handling for Canon.
//! One error enum per subsystem, `thiserror` only, aggregated by `CanonError`.

pub mod batch_error;
pub mod config_error;
pub mod llm_error;
pub mod retrieval_error;
pub mod stage_error;
pub mod store_error;

pub use batch_error::BatchError;
pub use config_error::ConfigError;
pub use llm_error::LlmError;
pub use retrieval_error::RetrievalError;
pub use stage_error::StageError;
pub use store_error::StoreError;

/// Top-level error aggregating every subsystem error via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum CanonError {
    #[error("generation error: {0}")]
    Llm(#[from] LlmError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("stage error: {0}")]
    Stage(#[from] StageError),

    #[error("batch error: {0}")]
    Batch(#[from] BatchError),
}

pub type CanonResult<T> = Result<T, CanonError>;
