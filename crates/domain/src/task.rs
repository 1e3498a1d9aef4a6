use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Candidate filter handed to the subject search collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionCriteria {
    /// Search filter forwarded verbatim.
    #[serde(default)]
    pub filter_data: Value,
    /// Workflow id the search service uses to rank candidates.
    #[serde(default)]
    pub selection_dsl_workflow_id: String,
}

/// One auction participant as submitted by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuctionCandidate {
    /// Candidate subject id.
    pub subject_id: String,
    /// Opaque subject payload forwarded to the association system.
    #[serde(default)]
    pub subject_data: Value,
}

/// Closed set of role task actions.
///
/// The `action` tag and per-variant required fields are the submission wire
/// contract; an unknown action or a missing field is a deserialization error
/// surfaced to the caller as a validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RoleTaskAction {
    /// Bind a named subject to a role of the requested type.
    AssignDirect {
        /// Tracking id of the owning application.
        role_application_id: String,
        /// Application payload; `role_type` is read from it.
        application_data: Value,
        /// Subject to bind.
        subject_id: String,
        /// Opaque subject payload for the association system.
        subject_data: Value,
    },
    /// Search for candidates and bind the first match.
    AssignByCriteria {
        /// Tracking id of the owning application.
        role_application_id: String,
        /// Application payload; `role_type` is read from it.
        application_data: Value,
        /// Candidate search configuration.
        selection_criteria: SelectionCriteria,
    },
    /// Run an auction over the submitted candidates and bind the winner.
    AssignByAuction {
        /// Tracking id of the owning application.
        role_application_id: String,
        /// Application payload; `role_type` is read from it.
        application_data: Value,
        /// Auction participants; the winner must be one of them.
        subject_list: Vec<AuctionCandidate>,
    },
    /// Vacate one bound role under DSL approval.
    Remove {
        /// Role occupancy to vacate.
        role_id: String,
        /// Subject expected to hold the role.
        subject_id: String,
    },
}

impl RoleTaskAction {
    /// Returns the stable action tag value.
    #[must_use]
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::AssignDirect { .. } => "assign_direct",
            Self::AssignByCriteria { .. } => "assign_by_criteria",
            Self::AssignByAuction { .. } => "assign_by_auction",
            Self::Remove { .. } => "remove",
        }
    }
}

/// Structured result of resolving one role task.
///
/// Serialized verbatim into the application's `response_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    /// Whether the task resolved successfully.
    pub success: bool,
    /// Failure reason or success note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Role id minted for a successful binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
    /// Subject chosen by criteria search or auction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    /// Association system response for a successful binding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub association: Option<Value>,
}

impl ResolutionOutcome {
    /// Creates a failure outcome with the given reason.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            role_id: None,
            subject_id: None,
            association: None,
        }
    }

    /// Creates a successful binding outcome.
    #[must_use]
    pub fn assigned(role_id: impl Into<String>, association: Value) -> Self {
        Self {
            success: true,
            message: None,
            role_id: Some(role_id.into()),
            subject_id: None,
            association: Some(association),
        }
    }

    /// Attaches the selected subject to a binding outcome.
    #[must_use]
    pub fn with_subject(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    /// Creates a successful removal outcome.
    #[must_use]
    pub fn removed() -> Self {
        Self {
            success: true,
            message: Some("Role removed successfully".to_owned()),
            role_id: None,
            subject_id: None,
            association: None,
        }
    }
}
