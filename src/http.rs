//! Shared HTTP client construction for provider calls.
//!
//! One [`reqwest::Client`] is built per engine from configuration and
//! reused for every submission and poll, so connection pooling and the
//! per-request timeout apply uniformly across the run.

use crate::config::CheckConfig;
use crate::error::CheckError;
use std::time::Duration;

/// Default User-Agent when the caller does not override it.
const DEFAULT_USER_AGENT: &str = concat!("indexcheck/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] configured for the task API.
///
/// The client has:
/// - Timeout from config (doubles as the cooperative deadline for
///   in-flight calls during cancellation)
/// - Crate-identifying User-Agent (or custom if configured)
/// - Limited redirect following
///
/// # Errors
///
/// Returns [`CheckError::Transport`] if the client cannot be constructed.
pub fn build_client(config: &CheckConfig) -> Result<reqwest::Client, CheckError> {
    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(ua)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| CheckError::Transport(format!("failed to build HTTP client: {e}")))
}
