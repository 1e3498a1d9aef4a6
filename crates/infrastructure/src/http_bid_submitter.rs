use async_trait::async_trait;
use rolegrid_core::{AppError, AppResult};
use serde_json::Value;

use crate::auction_runner::BidSubmitter;

/// HTTP submitter for the external auction system.
pub struct HttpBidSubmitter {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpBidSubmitter {
    /// Creates a submitter against one auction system base URL.
    #[must_use]
    pub fn new(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            endpoint: format!("{}/bid-task/submit-task", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl BidSubmitter for HttpBidSubmitter {
    async fn submit(&self, bid_payload: &Value) -> AppResult<()> {
        let response = self
            .http_client
            .post(self.endpoint.as_str())
            .json(bid_payload)
            .send()
            .await
            .map_err(|error| {
                AppError::External(format!("bid submission transport error: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_owned());
            return Err(AppError::External(format!(
                "bid submission returned status {}: {body}",
                status.as_u16()
            )));
        }

        let body = response.json::<Value>().await.map_err(|error| {
            AppError::External(format!("failed to parse bid submission response: {error}"))
        })?;

        if !body
            .get("success")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            return Err(AppError::External(
                "bid task submission was not accepted".to_owned(),
            ));
        }

        Ok(())
    }
}
