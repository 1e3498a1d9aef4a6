use rolegrid_application::{MappingQuery, RoleApplicationQuery, RoleTypeAssignmentUpdate};
use rolegrid_core::AppError;
use rolegrid_domain::{RoleApplicationStatus, RoleAssignmentPolicy};
use serde::{Deserialize, Serialize};

/// Response body for task submission.
#[derive(Debug, Serialize)]
pub struct SubmitRoleTaskResponse {
    pub success: bool,
    pub role_application_id: String,
}

/// Filter body shared by the mapping query endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct MappingQueryRequest {
    pub role_type: Option<String>,
    pub subject_type: Option<String>,
    pub group_type: Option<String>,
    pub job_space_id: Option<String>,
}

impl From<MappingQueryRequest> for MappingQuery {
    fn from(value: MappingQueryRequest) -> Self {
        Self {
            role_type: value.role_type,
            type_filter: value.subject_type.or(value.group_type),
            job_space_id: value.job_space_id,
        }
    }
}

/// Filter body for role application queries.
#[derive(Debug, Default, Deserialize)]
pub struct RoleApplicationQueryRequest {
    pub status: Option<String>,
}

impl TryFrom<RoleApplicationQueryRequest> for RoleApplicationQuery {
    type Error = AppError;

    fn try_from(value: RoleApplicationQueryRequest) -> Result<Self, Self::Error> {
        let status = value
            .status
            .map(|status| {
                RoleApplicationStatus::parse(status.as_str()).ok_or_else(|| {
                    AppError::Validation(format!("unknown application status '{status}'"))
                })
            })
            .transpose()?;

        Ok(Self { status })
    }
}

/// Partial update body for one role type row.
#[derive(Debug, Default, Deserialize)]
pub struct RoleTypeUpdateRequest {
    pub role_assignment_type: Option<String>,
    pub role_post_removal_dsl_workflow_id: Option<String>,
    pub role_post_addition_dsl_workflow_id: Option<String>,
    pub role_auction_creation_dsl_workflow_id: Option<String>,
    pub position_filled: Option<bool>,
    pub job_space_id: Option<String>,
}

impl TryFrom<RoleTypeUpdateRequest> for RoleTypeAssignmentUpdate {
    type Error = AppError;

    fn try_from(value: RoleTypeUpdateRequest) -> Result<Self, Self::Error> {
        let role_assignment_type = value
            .role_assignment_type
            .map(|policy| {
                RoleAssignmentPolicy::parse(policy.as_str()).ok_or_else(|| {
                    AppError::Validation(format!("unknown role assignment type '{policy}'"))
                })
            })
            .transpose()?;

        Ok(Self {
            role_assignment_type,
            role_post_removal_dsl_workflow_id: value.role_post_removal_dsl_workflow_id,
            role_post_addition_dsl_workflow_id: value.role_post_addition_dsl_workflow_id,
            role_auction_creation_dsl_workflow_id: value.role_auction_creation_dsl_workflow_id,
            position_filled: value.position_filled,
            job_space_id: value.job_space_id,
        })
    }
}
