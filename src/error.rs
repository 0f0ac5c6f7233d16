//! Error types for the indexcheck crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. API credentials never appear in error
//! messages.

/// Errors that can occur while checking URL indexation.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// The provider rejected an entire submission batch (auth, quota,
    /// malformed payload). Recovered at the batch boundary.
    #[error("batch submission failed: {0}")]
    BatchSubmission(String),

    /// A task resolved with a non-success, non-pending provider status.
    #[error("task failed: {0}")]
    Task(String),

    /// The retry budget was exhausted while a task was still pending,
    /// or while transport kept failing.
    #[error("task timed out: {0}")]
    Timeout(String),

    /// A network-level failure during any provider call. Retried
    /// transparently before escalating to [`CheckError::Timeout`].
    #[error("transport error: {0}")]
    Transport(String),

    /// Invalid check configuration.
    #[error("config error: {0}")]
    Config(String),
}

/// Convenience type alias for indexcheck results.
pub type Result<T> = std::result::Result<T, CheckError>;
