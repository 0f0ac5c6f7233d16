//! Result poller: drives one submitted task to a terminal resolution.
//!
//! # State machine
//!
//! ```text
//! Submitted ──► Polling ──► Complete | Empty | Failed | TimedOut
//!                  ▲ │
//!                  └─┘ pending / transport error (budgeted)
//! ```
//!
//! Every status fetch consumes one attempt from the budget, whether it
//! returned a pending code or failed at the transport level. A task
//! that never leaves the pending bucket, or whose transport keeps
//! failing, times out rather than erroring — the task itself never
//! reported a failure.

use crate::api::{ResultItem, TaskApi};
use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::types::{CancelToken, SubmittedTask};
use std::time::Duration;

/// Terminal resolution of one polled task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResolution {
    /// The task completed with results; the matcher decides indexation.
    Complete(Vec<ResultItem>),
    /// The task completed with the distinguished no-results code.
    /// Directly not-indexed, no matching needed.
    Empty,
    /// The task resolved with a non-success, non-pending status.
    Failed {
        /// The provider status code that terminated the task.
        status_code: u32,
    },
    /// The attempt budget ran out while the task was still pending or
    /// transport kept failing.
    TimedOut,
    /// Cancellation was observed before an attempt; no verdict exists.
    Cancelled,
}

/// Delay before the next transport retry, shared between the poller and
/// the submission client: capped exponential starting from
/// `transport_retry_ms`, doubling per consecutive failure up to
/// `backoff_cap_ms`.
pub(crate) fn transport_backoff(config: &CheckConfig, consecutive_failures: u32) -> Duration {
    let shift = consecutive_failures.saturating_sub(1).min(16);
    let delay = config
        .transport_retry_ms
        .saturating_mul(1u64 << shift)
        .min(config.backoff_cap_ms);
    Duration::from_millis(delay)
}

/// Poll one submitted task until it reaches a terminal resolution or
/// the attempt budget (`config.max_attempts`) is exhausted.
///
/// Pending codes sleep `poll_interval_ms` between attempts; transport
/// errors sleep with capped exponential backoff. Both consume attempts
/// from the same budget. Cancellation is observed before every attempt.
pub async fn poll_task<A: TaskApi>(
    api: &A,
    task: &SubmittedTask,
    config: &CheckConfig,
    cancel: &CancelToken,
) -> TaskResolution {
    let mut transport_failures = 0u32;

    for attempt in 1..=config.max_attempts {
        if cancel.is_cancelled() {
            tracing::debug!(task_id = %task.task_id, "poll cancelled");
            return TaskResolution::Cancelled;
        }

        let last_attempt = attempt == config.max_attempts;

        match api.fetch_task(&task.task_id).await {
            Ok(response) => {
                transport_failures = 0;
                let code = response.task_status();

                if code == config.status.success {
                    let items = response
                        .tasks
                        .first()
                        .map(|t| t.items())
                        .unwrap_or_default();
                    tracing::debug!(
                        task_id = %task.task_id,
                        attempt,
                        items = items.len(),
                        "task complete"
                    );
                    return TaskResolution::Complete(items);
                }
                if code == config.status.no_results {
                    tracing::debug!(task_id = %task.task_id, attempt, "task complete, no results");
                    return TaskResolution::Empty;
                }
                if config.status.is_pending(code) {
                    if last_attempt {
                        tracing::warn!(
                            task_id = %task.task_id,
                            attempts = config.max_attempts,
                            "attempt budget exhausted while pending"
                        );
                        return TaskResolution::TimedOut;
                    }
                    tracing::trace!(task_id = %task.task_id, attempt, code, "task still pending");
                    tokio::time::sleep(Duration::from_millis(config.poll_interval_ms)).await;
                    continue;
                }

                tracing::warn!(task_id = %task.task_id, code, "task failed");
                return TaskResolution::Failed { status_code: code };
            }
            Err(CheckError::Transport(msg)) => {
                transport_failures += 1;
                if last_attempt {
                    tracing::warn!(
                        task_id = %task.task_id,
                        attempts = config.max_attempts,
                        error = %msg,
                        "attempt budget exhausted on transport failures"
                    );
                    return TaskResolution::TimedOut;
                }
                tracing::trace!(
                    task_id = %task.task_id,
                    attempt,
                    error = %msg,
                    "transport error, retrying"
                );
                tokio::time::sleep(transport_backoff(config, transport_failures)).await;
            }
            Err(other) => {
                // The API seam only produces transport errors today;
                // anything else is terminal for this task.
                tracing::warn!(task_id = %task.task_id, error = %other, "unexpected poll error");
                return TaskResolution::Failed { status_code: 0 };
            }
        }
    }

    TaskResolution::TimedOut
}
