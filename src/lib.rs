//! # indexcheck
//!
//! Bulk search-index verification for large URL sets via a task-based
//! SERP API.
//!
//! The engine turns a list of `{record_id, url}` check requests into
//! indexation verdicts: it derives a `site:` query per URL, submits
//! queries in fixed-size batches, polls each created task with a
//! bounded retry budget and backoff, matches returned organic results
//! against the normalized original URL, and guarantees exactly one
//! terminal record per input even under partial failure.
//!
//! ## Design
//!
//! - Batches are submitted strictly sequentially with a randomized gap,
//!   respecting the provider's caller-wide rate limit
//! - Pollers within a batch run concurrently, bounded by configuration
//! - The provider's status taxonomy is configuration, not logic
//! - Storage, UI, and ingestion are collaborator concerns behind the
//!   narrow traits in [`sink`]
//!
//! ## Security
//!
//! - API credentials never appear in logs or error messages
//! - Queries and URLs are logged only at trace level
//! - This is a library, not a server — no network listeners

pub mod api;
pub mod batch;
pub mod config;
pub mod error;
pub mod http;
pub mod matcher;
pub mod normalize;
pub mod orchestrator;
pub mod poll;
pub mod sink;
pub mod submit;
pub mod types;

pub use api::{HttpTaskApi, TaskApi};
pub use config::{CheckConfig, StatusCodes};
pub use error::{CheckError, Result};
pub use orchestrator::{CheckEngine, RunSummary};
pub use sink::{CheckSource, NoopProgress, PersistSink, ProgressSink};
pub use types::{CancelToken, CheckRequest, Outcome, OutcomeTotals, RecordId, TerminalRecord};

/// A sink that keeps nothing; [`run_checks`] returns the records
/// directly instead.
struct DiscardSink;

impl PersistSink for DiscardSink {
    fn persist(&self, _record: &TerminalRecord) {}
}

/// Check a list of URLs against the live API and return the verdicts.
///
/// Convenience wrapper wiring [`HttpTaskApi`] with no persistence or
/// progress collaborators. Callers that persist verdicts or render
/// progress should construct a [`CheckEngine`] and pass their own
/// [`PersistSink`]/[`ProgressSink`].
///
/// # Errors
///
/// Returns [`CheckError::Config`] if `config` is invalid or
/// [`CheckError::Transport`] if the HTTP client cannot be built.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> indexcheck::Result<()> {
/// let config = indexcheck::CheckConfig {
///     api_login: "login".into(),
///     api_password: "password".into(),
///     ..Default::default()
/// };
/// let requests = vec![indexcheck::CheckRequest::new(1, "https://example.com/page")];
/// let summary = indexcheck::run_checks(requests, &config).await?;
/// for record in &summary.records {
///     println!("{}: {}", record.record_id, record.outcome);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_checks(
    requests: Vec<CheckRequest>,
    config: &CheckConfig,
) -> Result<RunSummary> {
    let api = HttpTaskApi::new(config)?;
    let engine = CheckEngine::new(api, config.clone())?;
    Ok(engine
        .run(requests, &DiscardSink, &NoopProgress, &CancelToken::new())
        .await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_checks_validates_config_zero_batch_size() {
        let config = CheckConfig {
            batch_size: 0,
            ..Default::default()
        };
        let result = run_checks(vec![], &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("batch_size"));
    }

    #[tokio::test]
    async fn run_checks_validates_config_empty_base_url() {
        let config = CheckConfig {
            base_url: String::new(),
            ..Default::default()
        };
        let result = run_checks(vec![], &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("base_url"));
    }

    #[tokio::test]
    async fn run_checks_empty_input_is_a_clean_noop() {
        // No requests means no network calls; the live client is built
        // but never used.
        let config = CheckConfig::default();
        let summary = run_checks(vec![], &config).await.expect("empty run");
        assert!(summary.records.is_empty());
        assert!(!summary.cancelled);
    }
}
