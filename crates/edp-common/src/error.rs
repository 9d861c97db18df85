//! Error types for the event pipeline
//!
//! Every stage failure is classified into one of three classes. The
//! orchestrator consults [`PipelineError::is_retryable`] to decide between
//! retrying a stage and failing the run. Field-level absence in the source
//! feed is not an error at all; it null-coalesces inside the transform.

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Pipeline error taxonomy
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Remote read/write failure, network failure, or transiently corrupt
    /// feed bytes. Retryable within the run's retry budget.
    #[error("transient I/O failure: {0}")]
    Transient(anyhow::Error),

    /// An expected structural path is absent from the source document.
    /// Signals a contract break with the feed producer; never retried.
    #[error("schema mismatch: {0}")]
    Schema(String),

    /// A stage received an empty payload where records were required.
    /// Fatal at the load boundary; persisting nothing beats persisting a
    /// vacuous artifact.
    #[error("empty payload: {0}")]
    EmptyPayload(String),
}

impl PipelineError {
    /// Wrap any error as a retryable transient failure.
    pub fn transient(err: impl Into<anyhow::Error>) -> Self {
        PipelineError::Transient(err.into())
    }

    /// Whether the orchestrator may retry the stage that produced this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PipelineError::Transient(_))
    }
}
