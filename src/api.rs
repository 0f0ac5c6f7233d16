//! Provider wire types and the task API seam.
//!
//! [`TaskApi`] is the boundary the rest of the engine is written
//! against: one call to create a batch of tasks, one call to fetch a
//! task's status and results. [`HttpTaskApi`] is the live
//! implementation; tests substitute their own.
//!
//! The provider contract the engine depends on: task descriptors in the
//! creation response arrive in request order (position is the only
//! correlation mechanism), and every response carries integer status
//! codes interpreted through [`crate::config::StatusCodes`].

use crate::config::CheckConfig;
use crate::error::CheckError;
use crate::http;
use serde::{Deserialize, Serialize};

/// One search query in a task-creation payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskQuery {
    /// The literal search query, e.g. `site:example.com/blog/post`.
    pub keyword: String,
    /// Geographic location code.
    pub location_code: u32,
    /// Interface language code.
    pub language_code: String,
    /// Device profile (`desktop` or `mobile`).
    pub device: String,
    /// How many results the provider should collect.
    pub depth: u32,
}

/// One entry in the task-creation response, in request order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDescriptor {
    /// Provider-assigned task id. Absent when this query was rejected.
    #[serde(default)]
    pub id: Option<String>,
    /// Per-task status code.
    #[serde(default)]
    pub status_code: u32,
}

/// Response to a task-creation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskPostResponse {
    /// Top-level status code for the whole submission.
    pub status_code: u32,
    /// Human-readable status message.
    #[serde(default)]
    pub status_message: String,
    /// Task descriptors, one per submitted query, in request order.
    #[serde(default)]
    pub tasks: Vec<TaskDescriptor>,
}

/// One search result item in a completed task's payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Result type tag; only `organic` items count towards indexation.
    #[serde(rename = "type", default)]
    pub item_type: String,
    /// URL of the result, when present.
    #[serde(default)]
    pub url: Option<String>,
}

impl ResultItem {
    /// Returns `true` if this is a natural (non-paid, non-special) result.
    pub fn is_organic(&self) -> bool {
        self.item_type == "organic"
    }
}

/// One result page inside a completed task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultPage {
    /// Result items; absent for empty pages.
    #[serde(default)]
    pub items: Option<Vec<ResultItem>>,
}

/// Status and payload of one task in a task-fetch response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResult {
    /// Provider task id.
    #[serde(default)]
    pub id: Option<String>,
    /// Task-level status code.
    pub status_code: u32,
    /// Result pages; present only for completed tasks.
    #[serde(default)]
    pub result: Option<Vec<ResultPage>>,
}

impl TaskResult {
    /// Flatten all result items across pages.
    pub fn items(&self) -> Vec<ResultItem> {
        self.result
            .iter()
            .flatten()
            .filter_map(|page| page.items.as_ref())
            .flatten()
            .cloned()
            .collect()
    }
}

/// Response to a task-fetch call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskGetResponse {
    /// Top-level status code.
    pub status_code: u32,
    /// The fetched task (the provider wraps it in an array).
    #[serde(default)]
    pub tasks: Vec<TaskResult>,
}

impl TaskGetResponse {
    /// The task-level status code, falling back to the top-level code
    /// when the provider omitted the task entry.
    pub fn task_status(&self) -> u32 {
        self.tasks
            .first()
            .map_or(self.status_code, |task| task.status_code)
    }
}

/// The task-based SERP API the engine drives.
///
/// Implementations must be `Send + Sync`; pollers for one batch run
/// concurrently against a shared reference.
pub trait TaskApi: Send + Sync {
    /// Submit a batch of queries in one call.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Transport`] for network-level failures.
    /// A provider-level rejection is *not* an error at this layer — it
    /// comes back as a non-success `status_code` in the response.
    fn create_tasks(
        &self,
        queries: &[TaskQuery],
    ) -> impl std::future::Future<Output = Result<TaskPostResponse, CheckError>> + Send;

    /// Fetch the current status (and results, when complete) of one task.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Transport`] for network-level failures,
    /// including HTTP 429 and 5xx responses, which the poller retries
    /// with backoff.
    fn fetch_task(
        &self,
        task_id: &str,
    ) -> impl std::future::Future<Output = Result<TaskGetResponse, CheckError>> + Send;
}

/// Live [`TaskApi`] implementation over HTTP with basic auth.
#[derive(Debug, Clone)]
pub struct HttpTaskApi {
    client: reqwest::Client,
    base_url: String,
    login: String,
    password: String,
}

impl HttpTaskApi {
    /// Build a live client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::Transport`] if the HTTP client cannot be
    /// constructed.
    pub fn new(config: &CheckConfig) -> Result<Self, CheckError> {
        Ok(Self {
            client: http::build_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            login: config.api_login.clone(),
            password: config.api_password.clone(),
        })
    }

    fn post_url(&self) -> String {
        format!("{}/v3/serp/google/organic/task_post", self.base_url)
    }

    fn get_url(&self, task_id: &str) -> String {
        format!(
            "{}/v3/serp/google/organic/task_get/advanced/{task_id}",
            self.base_url
        )
    }
}

impl TaskApi for HttpTaskApi {
    async fn create_tasks(&self, queries: &[TaskQuery]) -> Result<TaskPostResponse, CheckError> {
        tracing::trace!(count = queries.len(), "submitting task batch");

        let response = self
            .client
            .post(self.post_url())
            .basic_auth(&self.login, Some(&self.password))
            .json(queries)
            .send()
            .await
            .map_err(|e| CheckError::Transport(format!("task creation request failed: {e}")))?
            .error_for_status()
            .map_err(|e| CheckError::Transport(format!("task creation HTTP error: {e}")))?;

        response
            .json::<TaskPostResponse>()
            .await
            .map_err(|e| CheckError::Transport(format!("task creation response decode failed: {e}")))
    }

    async fn fetch_task(&self, task_id: &str) -> Result<TaskGetResponse, CheckError> {
        tracing::trace!(task_id, "fetching task status");

        let response = self
            .client
            .get(self.get_url(task_id))
            .basic_auth(&self.login, Some(&self.password))
            .send()
            .await
            .map_err(|e| CheckError::Transport(format!("task fetch request failed: {e}")))?
            .error_for_status()
            .map_err(|e| CheckError::Transport(format!("task fetch HTTP error: {e}")))?;

        response
            .json::<TaskGetResponse>()
            .await
            .map_err(|e| CheckError::Transport(format!("task fetch response decode failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_query_serializes_provider_fields() {
        let query = TaskQuery {
            keyword: "site:example.com".into(),
            location_code: 2840,
            language_code: "en".into(),
            device: "desktop".into(),
            depth: 100,
        };
        let json = serde_json::to_value(&query).expect("serialize");
        assert_eq!(json["keyword"], "site:example.com");
        assert_eq!(json["location_code"], 2840);
        assert_eq!(json["depth"], 100);
    }

    #[test]
    fn post_response_decodes_ordered_descriptors() {
        let json = r#"{
            "status_code": 20000,
            "status_message": "Ok.",
            "tasks": [
                {"id": "task-a", "status_code": 20100},
                {"status_code": 40501},
                {"id": "task-c", "status_code": 20100}
            ]
        }"#;
        let decoded: TaskPostResponse = serde_json::from_str(json).expect("decode");
        assert_eq!(decoded.status_code, 20000);
        assert_eq!(decoded.tasks.len(), 3);
        assert_eq!(decoded.tasks[0].id.as_deref(), Some("task-a"));
        assert!(decoded.tasks[1].id.is_none());
        assert_eq!(decoded.tasks[2].id.as_deref(), Some("task-c"));
    }

    #[test]
    fn get_response_decodes_items() {
        let json = r#"{
            "status_code": 20000,
            "tasks": [{
                "id": "task-a",
                "status_code": 20000,
                "result": [{
                    "items": [
                        {"type": "organic", "url": "https://example.com/p"},
                        {"type": "paid", "url": "https://ads.example.com"},
                        {"type": "featured_snippet"}
                    ]
                }]
            }]
        }"#;
        let decoded: TaskGetResponse = serde_json::from_str(json).expect("decode");
        assert_eq!(decoded.task_status(), 20000);
        let items = decoded.tasks[0].items();
        assert_eq!(items.len(), 3);
        assert!(items[0].is_organic());
        assert!(!items[1].is_organic());
        assert!(items[2].url.is_none());
    }

    #[test]
    fn get_response_without_task_entry_uses_top_level_status() {
        let json = r#"{"status_code": 40401, "tasks": []}"#;
        let decoded: TaskGetResponse = serde_json::from_str(json).expect("decode");
        assert_eq!(decoded.task_status(), 40401);
    }

    #[test]
    fn result_items_compare_by_value() {
        let organic = ResultItem {
            item_type: "organic".into(),
            url: Some("https://a.com/p".into()),
        };
        assert_eq!(organic, organic.clone());
        let paid = ResultItem {
            item_type: "paid".into(),
            url: Some("https://a.com/p".into()),
        };
        assert_ne!(organic, paid);
    }

    #[test]
    fn items_flatten_across_pages() {
        let task = TaskResult {
            id: Some("t".into()),
            status_code: 20000,
            result: Some(vec![
                ResultPage {
                    items: Some(vec![ResultItem {
                        item_type: "organic".into(),
                        url: Some("https://a.com".into()),
                    }]),
                },
                ResultPage { items: None },
                ResultPage {
                    items: Some(vec![ResultItem {
                        item_type: "organic".into(),
                        url: Some("https://b.com".into()),
                    }]),
                },
            ]),
        };
        let items = task.items();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn http_api_builds_endpoint_urls() {
        let config = CheckConfig {
            base_url: "https://api.example.com/".into(),
            ..Default::default()
        };
        let api = HttpTaskApi::new(&config).expect("client should build");
        assert_eq!(
            api.post_url(),
            "https://api.example.com/v3/serp/google/organic/task_post"
        );
        assert_eq!(
            api.get_url("abc-123"),
            "https://api.example.com/v3/serp/google/organic/task_get/advanced/abc-123"
        );
    }

    #[test]
    fn http_api_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpTaskApi>();
    }
}
