//! Check engine configuration with sensible defaults.
//!
//! [`CheckConfig`] controls batching, the poll retry budget, backoff
//! timing, and the fixed search parameters attached to every submitted
//! query. [`StatusCodes`] carries the provider's status taxonomy as
//! configuration so the poller's state machine never hard-codes
//! provider-specific integers.

use crate::error::CheckError;

/// Provider status-code taxonomy.
///
/// The engine only ever asks four questions of a status code: is it
/// success, success-with-no-results, still-processing, or fatal at the
/// account level? The concrete integers are provider-specific and belong
/// here, not in the state machine.
#[derive(Debug, Clone)]
pub struct StatusCodes {
    /// Task (or top-level) call succeeded and results are available.
    pub success: u32,
    /// Top-level code confirming tasks were created.
    pub task_created: u32,
    /// Task succeeded but the query produced no search results.
    pub no_results: u32,
    /// Codes meaning the task is queued or handed to a worker — not
    /// terminal, retry after a delay.
    pub pending: Vec<u32>,
    /// Top-level codes that indicate dead credentials or exhausted
    /// quota. Halts further submission for the rest of the run.
    pub fatal: Vec<u32>,
}

impl Default for StatusCodes {
    fn default() -> Self {
        Self {
            success: 20000,
            task_created: 20100,
            no_results: 40102,
            pending: vec![40601, 40602],
            fatal: vec![40100, 40101, 40200],
        }
    }
}

impl StatusCodes {
    /// Returns `true` if `code` means the task is still being processed.
    pub fn is_pending(&self, code: u32) -> bool {
        self.pending.contains(&code)
    }

    /// Returns `true` if `code` halts further submission for the run.
    pub fn is_fatal(&self, code: u32) -> bool {
        self.fatal.contains(&code)
    }
}

/// Configuration for a check run.
///
/// Use [`Default::default()`] for sensible defaults, or construct with
/// field overrides for custom behaviour. Credentials have no defaults
/// and must be supplied by the caller.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Base URL of the SERP task API.
    pub base_url: String,
    /// API login for HTTP basic auth.
    pub api_login: String,
    /// API password for HTTP basic auth.
    pub api_password: String,
    /// Maximum number of queries submitted in one task-creation call.
    pub batch_size: usize,
    /// Maximum status fetches per task before giving up with a timeout.
    pub max_attempts: u32,
    /// Delay in milliseconds between poll attempts while a task is pending.
    pub poll_interval_ms: u64,
    /// Base delay in milliseconds before retrying after a transport error.
    /// Grows exponentially per consecutive transport failure.
    pub transport_retry_ms: u64,
    /// Upper bound in milliseconds on the transport retry delay.
    pub backoff_cap_ms: u64,
    /// Random delay range in milliseconds `(min, max)` between submission
    /// batches. Spreads load to respect the provider's caller-wide rate limit.
    pub batch_delay_ms: (u64, u64),
    /// Maximum number of tasks polled concurrently within one batch.
    pub concurrency: usize,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, a crate identifier is used.
    pub user_agent: Option<String>,
    /// Provider location code attached to every query.
    pub location_code: u32,
    /// Provider language code attached to every query.
    pub language_code: String,
    /// Device profile attached to every query.
    pub device: String,
    /// How many results the provider should collect per query.
    pub depth: u32,
    /// Provider status-code taxonomy.
    pub status: StatusCodes,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.dataforseo.com".into(),
            api_login: String::new(),
            api_password: String::new(),
            batch_size: 50,
            max_attempts: 10,
            poll_interval_ms: 3000,
            transport_retry_ms: 500,
            backoff_cap_ms: 30_000,
            batch_delay_ms: (500, 1500),
            concurrency: 10,
            timeout_seconds: 30,
            user_agent: None,
            location_code: 2840,
            language_code: "en".into(),
            device: "desktop".into(),
            depth: 100,
            status: StatusCodes::default(),
        }
    }
}

impl CheckConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - `batch_size` must be greater than 0
    /// - `max_attempts` must be greater than 0
    /// - `concurrency` must be greater than 0
    /// - `timeout_seconds` must be greater than 0
    /// - `base_url` must not be empty
    /// - `batch_delay_ms.0` must be <= `batch_delay_ms.1`
    pub fn validate(&self) -> Result<(), CheckError> {
        if self.batch_size == 0 {
            return Err(CheckError::Config(
                "batch_size must be greater than 0".into(),
            ));
        }
        if self.max_attempts == 0 {
            return Err(CheckError::Config(
                "max_attempts must be greater than 0".into(),
            ));
        }
        if self.concurrency == 0 {
            return Err(CheckError::Config(
                "concurrency must be greater than 0".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(CheckError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.base_url.is_empty() {
            return Err(CheckError::Config("base_url must not be empty".into()));
        }
        if self.batch_delay_ms.0 > self.batch_delay_ms.1 {
            return Err(CheckError::Config(
                "batch_delay_ms min must be <= max".into(),
            ));
        }
        Ok(())
    }
}
