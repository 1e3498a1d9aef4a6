use async_trait::async_trait;
use rolegrid_application::AssociationClient;
use rolegrid_core::{AppError, AppResult};
use serde_json::Value;

/// HTTP client for the subject association system of record.
pub struct HttpAssociationClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpAssociationClient {
    /// Creates a client against one association system base URL.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            endpoint: format!(
                "{}/associations/create-for-role",
                base_url.trim_end_matches('/')
            ),
        }
    }
}

#[async_trait]
impl AssociationClient for HttpAssociationClient {
    async fn create_association(
        &self,
        subject_id: &str,
        subject_data: &Value,
        role_data: &Value,
    ) -> AppResult<Value> {
        let payload = serde_json::json!({
            "subject_id": subject_id,
            "subject_data": subject_data,
            "role_data": role_data,
        });

        let response = self
            .http_client
            .post(self.endpoint.as_str())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                AppError::External(format!("association request transport error: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::External(format!(
                "association endpoint returned status {}: {body}",
                status.as_u16()
            )));
        }

        let body = response.json::<Value>().await.map_err(|error| {
            AppError::External(format!("failed to parse association response: {error}"))
        })?;

        if !body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            let message = body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("association refused without a message");
            return Err(AppError::External(format!(
                "association refused for subject '{subject_id}': {message}"
            )));
        }

        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    }
}
