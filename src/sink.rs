//! Collaborator interfaces: where check requests come from and where
//! verdicts go.
//!
//! The engine does not manage storage or UI. Persistence, progress
//! display, and the pending-checks queue are owned by the surrounding
//! application and consumed only through these narrow traits.

use crate::types::{CheckRequest, TerminalRecord};

/// Persistence sink for terminal records.
///
/// Called exactly once per record that reaches a terminal state.
/// Implementations own their I/O (and may queue internally); the engine
/// treats the call as infallible — a sink that can fail should handle
/// or log its own errors.
pub trait PersistSink: Send + Sync {
    /// Persist one terminal record ("latest wins" is the sink's policy).
    fn persist(&self, record: &TerminalRecord);
}

/// Advisory progress hook, fired after each batch resolves.
///
/// Fire-and-forget: must never block or fail the run.
pub trait ProgressSink: Send + Sync {
    /// `processed` of `total` input records have reached a terminal state.
    fn on_progress(&self, processed: usize, total: usize);
}

/// Supplies the point-in-time snapshot of checks to run.
pub trait CheckSource {
    /// List the records currently awaiting verification.
    fn list_pending_checks(&self) -> Vec<CheckRequest>;
}

/// A [`ProgressSink`] that discards all updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn on_progress(&self, _processed: usize, _total: usize) {}
}
