use std::time::Duration;

use async_trait::async_trait;
use rolegrid_application::SubjectSearchClient;
use rolegrid_core::{AppError, AppResult};
use serde_json::Value;
use tracing::warn;

/// HTTP client for the subject search service.
///
/// The round trip is bounded by the configured timeout; an expired wait
/// yields an empty candidate list, which the criteria strategy reports as
/// "No eligible subjects found".
pub struct HttpSubjectSearchClient {
    http_client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpSubjectSearchClient {
    /// Creates a client against one search service base URL.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            http_client,
            endpoint: format!("{}/subjects/search", base_url.trim_end_matches('/')),
            timeout,
        }
    }

    async fn round_trip(
        &self,
        search_filter: &Value,
        selection_dsl_workflow_id: &str,
    ) -> AppResult<Vec<String>> {
        let payload = serde_json::json!({
            "search_filter": search_filter,
            "dsl_workflow_id": selection_dsl_workflow_id,
        });

        let response = self
            .http_client
            .post(self.endpoint.as_str())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                AppError::External(format!("subject search transport error: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::External(format!(
                "subject search returned status {}: {body}",
                status.as_u16()
            )));
        }

        let body = response.json::<Value>().await.map_err(|error| {
            AppError::External(format!("failed to parse subject search response: {error}"))
        })?;

        Ok(body
            .get("subjects")
            .and_then(Value::as_array)
            .map(|subjects| {
                subjects
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl SubjectSearchClient for HttpSubjectSearchClient {
    async fn search(
        &self,
        search_filter: &Value,
        selection_dsl_workflow_id: &str,
    ) -> AppResult<Vec<String>> {
        match tokio::time::timeout(
            self.timeout,
            self.round_trip(search_filter, selection_dsl_workflow_id),
        )
        .await
        {
            Ok(result) => result,
            Err(_elapsed) => {
                warn!(
                    timeout_seconds = self.timeout.as_secs(),
                    "subject search timed out"
                );
                Ok(Vec::new())
            }
        }
    }
}
