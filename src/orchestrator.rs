//! Check orchestrator: drives batching, submission, polling, and
//! matching for a full input list.
//!
//! Batches are processed strictly sequentially (the provider enforces a
//! caller-wide rate limit); within a batch, pollers run with bounded
//! concurrency since tasks are independent after submission. Every
//! record that enters a batch leaves the run with exactly one terminal
//! verdict, whichever way its submission or task went.

use crate::api::TaskApi;
use crate::config::CheckConfig;
use crate::error::Result;
use crate::matcher::is_indexed;
use crate::poll::{poll_task, TaskResolution};
use crate::sink::{PersistSink, ProgressSink};
use crate::submit::{submit_batch, BatchSubmitOutcome, Submission};
use crate::types::{
    CancelToken, CheckRequest, Outcome, OutcomeTotals, RecordId, SubmittedTask, TerminalRecord,
};
use futures::StreamExt;
use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;

/// What a finished (or stopped) run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Terminal records, one per resolved input request.
    pub records: Vec<TerminalRecord>,
    /// Outcome counters over `records`.
    pub totals: OutcomeTotals,
    /// Set when a fatal provider status (dead credentials, exhausted
    /// quota) halted submission before all batches were processed.
    pub halted: Option<String>,
    /// Set when the run stopped on an external cancellation request.
    pub cancelled: bool,
}

/// The top-level check engine.
///
/// Holds the API client and configuration; each [`CheckEngine::run`]
/// call is independent and idempotent at the record level — re-running
/// a list produces fresh records and never mutates history ("latest
/// wins" is the persistence sink's policy).
#[derive(Debug)]
pub struct CheckEngine<A: TaskApi> {
    api: A,
    config: CheckConfig,
}

impl<A: TaskApi> CheckEngine<A> {
    /// Create an engine, validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::CheckError::Config`] if the configuration
    /// is invalid.
    pub fn new(api: A, config: CheckConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { api, config })
    }

    /// Check every request and return one terminal record per resolved
    /// input.
    ///
    /// Each record is handed to `sink` the moment it is decided;
    /// `progress` fires after each batch fully resolves, so batch-level
    /// progress is monotonic. One task's failure never aborts siblings;
    /// only a batch-submission failure cascades, and only within its
    /// batch. Cancellation takes effect at the next poll-attempt
    /// boundary and stops the run at the batch boundary, still emitting
    /// whatever records were already decided.
    pub async fn run(
        &self,
        requests: Vec<CheckRequest>,
        sink: &dyn PersistSink,
        progress: &dyn ProgressSink,
        cancel: &CancelToken,
    ) -> RunSummary {
        let total = requests.len();
        let batches = crate::batch::make_batches(requests, self.config.batch_size);
        tracing::debug!(total, batches = batches.len(), "check run starting");

        let mut records: Vec<TerminalRecord> = Vec::with_capacity(total);
        let mut halted: Option<String> = None;
        let mut cancelled = false;

        for (index, batch) in batches.into_iter().enumerate() {
            if cancel.is_cancelled() {
                tracing::debug!(batch = index, "run cancelled at batch boundary");
                cancelled = true;
                break;
            }
            if index > 0 {
                self.inter_batch_delay().await;
            }

            let batch_records = match submit_batch(&self.api, &batch, &self.config).await {
                Ok(BatchSubmitOutcome::Submitted(submissions)) => {
                    self.resolve_batch(&batch, submissions, cancel, &mut cancelled)
                        .await
                }
                Ok(BatchSubmitOutcome::Rejected {
                    status_code,
                    message,
                }) => {
                    if self.config.status.is_fatal(status_code) {
                        tracing::error!(
                            status_code,
                            message = %message,
                            "fatal provider status, halting submission"
                        );
                        halted = Some(format!("status {status_code}: {message}"));
                    }
                    fail_whole_batch(&batch)
                }
                Err(error) => {
                    tracing::warn!(batch = index, error = %error, "batch submission failed");
                    fail_whole_batch(&batch)
                }
            };

            for record in &batch_records {
                sink.persist(record);
            }
            records.extend(batch_records);

            // Advisory only — never allowed to fail the run.
            progress.on_progress(records.len(), total);

            if halted.is_some() || cancelled {
                break;
            }
        }

        let totals = OutcomeTotals::from_records(&records);
        tracing::debug!(
            resolved = records.len(),
            indexed = totals.indexed,
            errors = totals.errors,
            timeouts = totals.timeouts,
            "check run finished"
        );

        RunSummary {
            records,
            totals,
            halted,
            cancelled,
        }
    }

    /// Poll every accepted task of one batch with bounded concurrency
    /// and map resolutions to terminal records.
    async fn resolve_batch(
        &self,
        batch: &[CheckRequest],
        submissions: Vec<Submission>,
        cancel: &CancelToken,
        cancelled: &mut bool,
    ) -> Vec<TerminalRecord> {
        // Write-once correlation: populated here, shared read-only by
        // the concurrent pollers below.
        let urls: HashMap<RecordId, &str> = batch
            .iter()
            .map(|r| (r.record_id, r.url.as_str()))
            .collect();

        let mut records = Vec::with_capacity(batch.len());
        let mut tasks: Vec<SubmittedTask> = Vec::new();

        for submission in submissions {
            match submission {
                Submission::Accepted(task) => tasks.push(task),
                Submission::Rejected { record_id } => {
                    records.push(TerminalRecord::now(record_id, Outcome::Error));
                }
            }
        }

        let resolutions: Vec<(RecordId, TaskResolution)> = futures::stream::iter(
            tasks.iter().map(|task| async move {
                (task.record_id, poll_task(&self.api, task, &self.config, cancel).await)
            }),
        )
        .buffer_unordered(self.config.concurrency)
        .collect()
        .await;

        for (record_id, resolution) in resolutions {
            let outcome = match resolution {
                TaskResolution::Complete(items) => {
                    let url = urls.get(&record_id).copied().unwrap_or_default();
                    if is_indexed(url, &items) {
                        Outcome::Indexed
                    } else {
                        Outcome::NotIndexed
                    }
                }
                TaskResolution::Empty => Outcome::NotIndexed,
                TaskResolution::Failed { .. } => Outcome::Error,
                TaskResolution::TimedOut => Outcome::Timeout,
                TaskResolution::Cancelled => {
                    // No verdict exists for this task; the run stops at
                    // the batch boundary.
                    *cancelled = true;
                    continue;
                }
            };
            records.push(TerminalRecord::now(record_id, outcome));
        }

        records
    }

    /// Randomized pause between submission batches.
    async fn inter_batch_delay(&self) {
        let (min, max) = self.config.batch_delay_ms;
        if max == 0 {
            return;
        }
        let delay = if min == max {
            min
        } else {
            rand::thread_rng().gen_range(min..=max)
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
}

/// Error records for every request of a batch that never got tasks.
fn fail_whole_batch(batch: &[CheckRequest]) -> Vec<TerminalRecord> {
    batch
        .iter()
        .map(|request| TerminalRecord::now(request.record_id, Outcome::Error))
        .collect()
}
