use async_trait::async_trait;
use rolegrid_application::{DslEvaluator, DslRunOutput};
use rolegrid_core::{AppError, AppResult};
use serde_json::Value;

/// HTTP client for the external DSL workflow service.
pub struct HttpDslEvaluator {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpDslEvaluator {
    /// Creates an evaluator against one workflow service base URL.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }
}

#[async_trait]
impl DslEvaluator for HttpDslEvaluator {
    async fn execute(&self, workflow_id: &str, input: Value) -> AppResult<DslRunOutput> {
        let endpoint = format!("{}/workflows/{workflow_id}/execute", self.base_url);
        let response = self
            .http_client
            .post(endpoint)
            .json(&input)
            .send()
            .await
            .map_err(|error| {
                AppError::External(format!(
                    "workflow '{workflow_id}' execution transport error: {error}"
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::External(format!(
                "workflow '{workflow_id}' execution returned status {}: {body}",
                status.as_u16()
            )));
        }

        let output = response.json::<Value>().await.map_err(|error| {
            AppError::External(format!(
                "failed to parse workflow '{workflow_id}' output: {error}"
            ))
        })?;

        Ok(DslRunOutput::new(output))
    }
}
