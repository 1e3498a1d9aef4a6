use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle status of a tracked role application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleApplicationStatus {
    /// Accepted and queued, not yet resolved.
    Pending,
    /// Resolved with a successful outcome.
    Success,
    /// Resolved with a failure outcome.
    Failed,
}

impl RoleApplicationStatus {
    /// Returns the stable wire value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }

    /// Parses the stable wire value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "success" => Some(Self::Success),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Tracked request to fill or vacate a role.
///
/// Created once when the worker dequeues a task and mutated exactly once more
/// with the terminal outcome. The engine never deletes these rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleApplication {
    /// Tracking id handed back to the submitter.
    pub role_application_id: String,
    /// Raw payload as submitted.
    pub application_data: Value,
    /// Time the worker accepted the task.
    pub submission_time: DateTime<Utc>,
    /// Lifecycle status.
    pub status: RoleApplicationStatus,
    /// Structured resolution outcome, empty while pending.
    pub response_data: Value,
}

impl RoleApplication {
    /// Creates a pending application record for a dequeued task.
    #[must_use]
    pub fn pending(role_application_id: impl Into<String>, application_data: Value) -> Self {
        Self {
            role_application_id: role_application_id.into(),
            application_data,
            submission_time: Utc::now(),
            status: RoleApplicationStatus::Pending,
            response_data: Value::Object(serde_json::Map::new()),
        }
    }
}
