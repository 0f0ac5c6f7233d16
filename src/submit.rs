//! Batch submission client: one task-creation call per batch.
//!
//! Correlation between submitted queries and returned task ids is
//! positional — the provider returns descriptors in request order, so
//! batch order must not be disturbed between query construction and
//! descriptor pairing.

use crate::api::{TaskApi, TaskQuery};
use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::normalize::site_query;
use crate::poll::transport_backoff;
use crate::types::{CheckRequest, RecordId, SubmittedTask};

/// Transport retries for the submission call itself. Provider-level
/// rejections are never retried (fail-fast at the batch boundary).
const SUBMIT_TRANSPORT_ATTEMPTS: u32 = 3;

/// Per-request result of a successful batch submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The provider accepted this query and assigned a task id.
    Accepted(SubmittedTask),
    /// The response entry for this query carried no task id; the record
    /// goes straight to a terminal error without ever being polled.
    Rejected {
        /// The record whose query was rejected.
        record_id: RecordId,
    },
}

/// Outcome of one task-creation call.
#[derive(Debug, Clone)]
pub enum BatchSubmitOutcome {
    /// The batch was accepted; one [`Submission`] per request, in order.
    Submitted(Vec<Submission>),
    /// The provider rejected the batch as a whole (auth, quota,
    /// malformed payload). Every record in the batch becomes a terminal
    /// error; no tasks were created.
    Rejected {
        /// Top-level provider status code.
        status_code: u32,
        /// Provider status message.
        message: String,
    },
}

/// Build the provider query for one check request.
pub fn build_query(request: &CheckRequest, config: &CheckConfig) -> TaskQuery {
    TaskQuery {
        keyword: site_query(&request.url),
        location_code: config.location_code,
        language_code: config.language_code.clone(),
        device: config.device.clone(),
        depth: config.depth,
    }
}

/// Submit one batch of check requests in a single task-creation call.
///
/// Transport failures are retried a small fixed number of times with
/// capped exponential backoff (shared policy with the poller);
/// exhausting those retries returns the transport error and the
/// orchestrator fails the whole batch.
///
/// # Errors
///
/// Returns [`CheckError::Transport`] if the call never reached the
/// provider. Provider-level rejection is reported through
/// [`BatchSubmitOutcome::Rejected`], not as an error.
pub async fn submit_batch<A: TaskApi>(
    api: &A,
    batch: &[CheckRequest],
    config: &CheckConfig,
) -> Result<BatchSubmitOutcome, CheckError> {
    let queries: Vec<TaskQuery> = batch.iter().map(|r| build_query(r, config)).collect();

    let mut transport_failures = 0;
    let response = loop {
        match api.create_tasks(&queries).await {
            Ok(response) => break response,
            Err(CheckError::Transport(msg)) => {
                transport_failures += 1;
                if transport_failures >= SUBMIT_TRANSPORT_ATTEMPTS {
                    return Err(CheckError::Transport(msg));
                }
                tracing::warn!(
                    attempt = transport_failures,
                    error = %msg,
                    "submission transport error, retrying"
                );
                tokio::time::sleep(transport_backoff(config, transport_failures)).await;
            }
            Err(other) => return Err(other),
        }
    };

    if response.status_code != config.status.success
        && response.status_code != config.status.task_created
    {
        tracing::warn!(
            status_code = response.status_code,
            records = batch.len(),
            "batch rejected by provider"
        );
        return Ok(BatchSubmitOutcome::Rejected {
            status_code: response.status_code,
            message: response.status_message,
        });
    }

    // Pair descriptors with requests by position. A short descriptor
    // array leaves the tail rejected.
    let submissions: Vec<Submission> = batch
        .iter()
        .enumerate()
        .map(|(index, request)| {
            let task_id = response
                .tasks
                .get(index)
                .and_then(|descriptor| descriptor.id.clone());
            match task_id {
                Some(task_id) => Submission::Accepted(SubmittedTask {
                    task_id,
                    record_id: request.record_id,
                }),
                None => {
                    tracing::debug!(record_id = request.record_id, "query rejected in batch");
                    Submission::Rejected {
                        record_id: request.record_id,
                    }
                }
            }
        })
        .collect();

    let accepted = submissions
        .iter()
        .filter(|s| matches!(s, Submission::Accepted(_)))
        .count();
    tracing::debug!(accepted, total = batch.len(), "batch submitted");

    Ok(BatchSubmitOutcome::Submitted(submissions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{TaskDescriptor, TaskGetResponse, TaskPostResponse};
    use std::sync::Mutex;

    struct FixedApi {
        response: TaskPostResponse,
        seen: Mutex<Vec<Vec<TaskQuery>>>,
    }

    impl FixedApi {
        fn new(response: TaskPostResponse) -> Self {
            Self {
                response,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl TaskApi for FixedApi {
        async fn create_tasks(&self, queries: &[TaskQuery]) -> Result<TaskPostResponse, CheckError> {
            self.seen
                .lock()
                .expect("lock poisoned")
                .push(queries.to_vec());
            Ok(self.response.clone())
        }

        async fn fetch_task(&self, _task_id: &str) -> Result<TaskGetResponse, CheckError> {
            unreachable!("submission tests never fetch");
        }
    }

    fn descriptor(id: Option<&str>) -> TaskDescriptor {
        TaskDescriptor {
            id: id.map(String::from),
            status_code: 20100,
        }
    }

    fn batch_of(urls: &[&str]) -> Vec<CheckRequest> {
        urls.iter()
            .enumerate()
            .map(|(i, url)| CheckRequest::new(i as i64 + 1, *url))
            .collect()
    }

    #[test]
    fn build_query_uses_site_query_and_config_constants() {
        let config = CheckConfig::default();
        let request = CheckRequest::new(1, "https://www.example.com/blog/post/");
        let query = build_query(&request, &config);
        assert_eq!(query.keyword, "site:example.com/blog/post");
        assert_eq!(query.location_code, config.location_code);
        assert_eq!(query.language_code, config.language_code);
        assert_eq!(query.device, config.device);
        assert_eq!(query.depth, config.depth);
    }

    #[tokio::test]
    async fn accepted_batch_maps_ids_in_order() {
        let api = FixedApi::new(TaskPostResponse {
            status_code: 20000,
            status_message: "Ok.".into(),
            tasks: vec![descriptor(Some("t-1")), descriptor(Some("t-2"))],
        });
        let batch = batch_of(&["https://a.com/x", "https://b.com/y"]);
        let config = CheckConfig::default();

        let outcome = submit_batch(&api, &batch, &config)
            .await
            .expect("transport ok");
        let BatchSubmitOutcome::Submitted(submissions) = outcome else {
            panic!("expected Submitted");
        };
        assert_eq!(submissions.len(), 2);
        assert_eq!(
            submissions[0],
            Submission::Accepted(SubmittedTask {
                task_id: "t-1".into(),
                record_id: 1,
            })
        );
        assert_eq!(
            submissions[1],
            Submission::Accepted(SubmittedTask {
                task_id: "t-2".into(),
                record_id: 2,
            })
        );
    }

    #[tokio::test]
    async fn missing_task_id_rejects_that_record_only() {
        let api = FixedApi::new(TaskPostResponse {
            status_code: 20000,
            status_message: "Ok.".into(),
            tasks: vec![descriptor(Some("t-1")), descriptor(None)],
        });
        let batch = batch_of(&["https://a.com", "https://b.com"]);
        let config = CheckConfig::default();

        let outcome = submit_batch(&api, &batch, &config)
            .await
            .expect("transport ok");
        let BatchSubmitOutcome::Submitted(submissions) = outcome else {
            panic!("expected Submitted");
        };
        assert!(matches!(submissions[0], Submission::Accepted(_)));
        assert_eq!(submissions[1], Submission::Rejected { record_id: 2 });
    }

    #[tokio::test]
    async fn short_descriptor_array_rejects_tail() {
        let api = FixedApi::new(TaskPostResponse {
            status_code: 20000,
            status_message: "Ok.".into(),
            tasks: vec![descriptor(Some("t-1"))],
        });
        let batch = batch_of(&["https://a.com", "https://b.com", "https://c.com"]);
        let config = CheckConfig::default();

        let outcome = submit_batch(&api, &batch, &config)
            .await
            .expect("transport ok");
        let BatchSubmitOutcome::Submitted(submissions) = outcome else {
            panic!("expected Submitted");
        };
        assert!(matches!(submissions[0], Submission::Accepted(_)));
        assert_eq!(submissions[1], Submission::Rejected { record_id: 2 });
        assert_eq!(submissions[2], Submission::Rejected { record_id: 3 });
    }

    #[tokio::test]
    async fn non_success_top_level_status_rejects_whole_batch() {
        let api = FixedApi::new(TaskPostResponse {
            status_code: 40101,
            status_message: "Authentication failed.".into(),
            tasks: vec![],
        });
        let batch = batch_of(&["https://a.com"]);
        let config = CheckConfig::default();

        let outcome = submit_batch(&api, &batch, &config)
            .await
            .expect("transport ok");
        let BatchSubmitOutcome::Rejected {
            status_code,
            message,
        } = outcome
        else {
            panic!("expected Rejected");
        };
        assert_eq!(status_code, 40101);
        assert!(message.contains("Authentication"));
    }

    #[tokio::test]
    async fn exactly_one_call_per_batch() {
        let api = FixedApi::new(TaskPostResponse {
            status_code: 20000,
            status_message: "Ok.".into(),
            tasks: vec![descriptor(Some("t-1")), descriptor(Some("t-2"))],
        });
        let batch = batch_of(&["https://a.com", "https://b.com"]);
        let config = CheckConfig::default();

        let _ = submit_batch(&api, &batch, &config).await;
        let seen = api.seen.lock().expect("lock poisoned");
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].len(), 2);
        assert_eq!(seen[0][0].keyword, "site:a.com");
    }

    #[tokio::test]
    async fn transport_failure_retried_then_surfaced() {
        struct FlakyApi {
            calls: Mutex<u32>,
        }

        impl TaskApi for FlakyApi {
            async fn create_tasks(
                &self,
                _queries: &[TaskQuery],
            ) -> Result<TaskPostResponse, CheckError> {
                *self.calls.lock().expect("lock poisoned") += 1;
                Err(CheckError::Transport("connection reset".into()))
            }

            async fn fetch_task(&self, _task_id: &str) -> Result<TaskGetResponse, CheckError> {
                unreachable!()
            }
        }

        let api = FlakyApi {
            calls: Mutex::new(0),
        };
        let batch = batch_of(&["https://a.com"]);
        let config = CheckConfig {
            transport_retry_ms: 0,
            ..Default::default()
        };

        let result = submit_batch(&api, &batch, &config).await;
        assert!(matches!(result, Err(CheckError::Transport(_))));
        assert_eq!(
            *api.calls.lock().expect("lock poisoned"),
            SUBMIT_TRANSPORT_ATTEMPTS
        );
    }
}
