use async_trait::async_trait;
use futures::StreamExt;
use rolegrid_core::{AppError, AppResult};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auction_runner::BidEventListener;

/// Redis pub/sub listener for the organization's bid event channel.
///
/// Each wait opens a transient subscription to `{org_id}_bid_events` and
/// resolves on the first decodable message; dropping the subscription tears
/// it down.
pub struct RedisBidEventListener {
    client: redis::Client,
    channel: String,
}

impl RedisBidEventListener {
    /// Creates a listener for one organization's bid events.
    pub fn new(redis_url: &str, org_id: &str) -> AppResult<Self> {
        let client = redis::Client::open(redis_url).map_err(|error| {
            AppError::External(format!("invalid redis URL '{redis_url}': {error}"))
        })?;

        Ok(Self {
            client,
            channel: format!("{org_id}_bid_events"),
        })
    }
}

#[async_trait]
impl BidEventListener for RedisBidEventListener {
    async fn next_event(&self) -> AppResult<Value> {
        let mut pubsub = self.client.get_async_pubsub().await.map_err(|error| {
            AppError::External(format!("failed to connect to redis pub/sub: {error}"))
        })?;
        pubsub
            .subscribe(self.channel.as_str())
            .await
            .map_err(|error| {
                AppError::External(format!(
                    "failed to subscribe to '{}': {error}",
                    self.channel
                ))
            })?;
        debug!(channel = %self.channel, "subscribed to bid events");

        let mut messages = pubsub.on_message();
        while let Some(message) = messages.next().await {
            let payload: String = match message.get_payload() {
                Ok(payload) => payload,
                Err(error) => {
                    warn!(channel = %self.channel, %error, "undecodable bid event payload");
                    continue;
                }
            };

            match serde_json::from_str::<Value>(payload.as_str()) {
                Ok(event) => {
                    debug!(channel = %self.channel, "bid event received");
                    return Ok(event);
                }
                Err(error) => {
                    warn!(channel = %self.channel, %error, "bid event is not valid JSON");
                }
            }
        }

        Err(AppError::External(
            "bid event stream closed before a result arrived".to_owned(),
        ))
    }
}
