//! Core types for check requests, submitted tasks, and terminal records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Opaque identifier of one collaborator-owned record (a database row
/// in the surrounding application).
pub type RecordId = i64;

/// One URL to verify, supplied by the collaborator.
///
/// Immutable once created; the engine produces exactly one
/// [`TerminalRecord`] per request that enters a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRequest {
    /// Collaborator record this check belongs to.
    pub record_id: RecordId,
    /// The URL whose indexation is being verified.
    pub url: String,
}

impl CheckRequest {
    /// Create a new check request.
    pub fn new(record_id: RecordId, url: impl Into<String>) -> Self {
        Self {
            record_id,
            url: url.into(),
        }
    }
}

/// A query successfully enqueued with the provider.
///
/// The `task_id` → `record_id` correlation is written once at batch
/// submission and never mutated, so it is safe to share read-only
/// between concurrent pollers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedTask {
    /// Provider-assigned opaque task identifier.
    pub task_id: String,
    /// The originating record.
    pub record_id: RecordId,
}

/// Terminal outcome of one check.
///
/// A terminal outcome will not change without a fresh check run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// An organic result matched the normalized URL.
    Indexed,
    /// The query completed but no organic result matched.
    NotIndexed,
    /// Submission or the task itself failed.
    Error,
    /// The retry budget ran out while the task was still pending.
    Timeout,
}

impl Outcome {
    /// Returns the persistence flag the collaborator stores: `true`
    /// only for [`Outcome::Indexed`].
    pub fn is_indexed(&self) -> bool {
        matches!(self, Self::Indexed)
    }

    /// Returns the human-readable name of this outcome.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Indexed => "indexed",
            Self::NotIndexed => "not_indexed",
            Self::Error => "error",
            Self::Timeout => "timeout",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The final verdict for one check request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalRecord {
    /// The originating record.
    pub record_id: RecordId,
    /// Terminal outcome.
    pub outcome: Outcome,
    /// When the verdict was decided.
    pub checked_at: DateTime<Utc>,
}

impl TerminalRecord {
    /// Create a record stamped with the current time.
    pub fn now(record_id: RecordId, outcome: Outcome) -> Self {
        Self {
            record_id,
            outcome,
            checked_at: Utc::now(),
        }
    }
}

/// Aggregate counters over a set of terminal records.
///
/// Mirrors the dashboard metrics the surrounding application displays
/// (total / in index / failed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeTotals {
    /// Records with outcome [`Outcome::Indexed`].
    pub indexed: usize,
    /// Records with outcome [`Outcome::NotIndexed`].
    pub not_indexed: usize,
    /// Records with outcome [`Outcome::Error`].
    pub errors: usize,
    /// Records with outcome [`Outcome::Timeout`].
    pub timeouts: usize,
}

impl OutcomeTotals {
    /// Tally outcomes across `records`.
    pub fn from_records(records: &[TerminalRecord]) -> Self {
        let mut totals = Self::default();
        for record in records {
            match record.outcome {
                Outcome::Indexed => totals.indexed += 1,
                Outcome::NotIndexed => totals.not_indexed += 1,
                Outcome::Error => totals.errors += 1,
                Outcome::Timeout => totals.timeouts += 1,
            }
        }
        totals
    }

    /// Total number of tallied records.
    pub fn total(&self) -> usize {
        self.indexed + self.not_indexed + self.errors + self.timeouts
    }
}

/// Cooperative cancellation flag for a check run.
///
/// Cloning is cheap; all clones observe the same flag. The orchestrator
/// checks it at batch boundaries and pollers check it before every
/// attempt, so cancellation takes effect at the next poll-attempt
/// boundary at latest.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    /// Returns `true` once [`CancelToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
