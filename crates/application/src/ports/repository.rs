use async_trait::async_trait;
use rolegrid_core::AppResult;
use rolegrid_domain::{
    GroupConstraintsMapping, RoleApplication, RoleApplicationStatus, RoleAssignmentPolicy,
    RoleGroupMapping, RoleTypeAssignmentMapping, SubjectRolesMapping,
};
use serde_json::Value;

/// Shared filter shape for mapping query endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingQuery {
    /// Restricts results to one role type.
    pub role_type: Option<String>,
    /// Restricts results to one subject or group category.
    pub type_filter: Option<String>,
    /// Restricts results to one job space.
    pub job_space_id: Option<String>,
}

/// Partial update for one role type assignment row.
///
/// Mirrors the generic field update of the original store wrapper; absent
/// fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleTypeAssignmentUpdate {
    /// Replaces the assignment policy.
    pub role_assignment_type: Option<RoleAssignmentPolicy>,
    /// Replaces the evaluation/removal workflow id.
    pub role_post_removal_dsl_workflow_id: Option<String>,
    /// Replaces the PQT workflow id.
    pub role_post_addition_dsl_workflow_id: Option<String>,
    /// Replaces the auction creation workflow id.
    pub role_auction_creation_dsl_workflow_id: Option<String>,
    /// Replaces the single-occupancy flag.
    pub position_filled: Option<bool>,
    /// Replaces the owning job space.
    pub job_space_id: Option<String>,
}

/// Filter for role application queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleApplicationQuery {
    /// Restricts results to one lifecycle status.
    pub status: Option<RoleApplicationStatus>,
}

/// Store of roles held per subject.
#[async_trait]
pub trait SubjectRolesRepository: Send + Sync {
    /// Returns one subject row by subject id.
    async fn find(&self, subject_id: &str) -> AppResult<Option<SubjectRolesMapping>>;

    /// Inserts a new subject row.
    async fn insert(&self, mapping: SubjectRolesMapping) -> AppResult<()>;

    /// Replaces the role id set of one subject row.
    async fn update_role_ids(&self, subject_id: &str, role_ids: Vec<String>) -> AppResult<()>;

    /// Deletes one subject row.
    async fn delete(&self, subject_id: &str) -> AppResult<()>;

    /// Lists subject rows matching a filter.
    async fn list(&self, query: MappingQuery) -> AppResult<Vec<SubjectRolesMapping>>;
}

/// Store of bound role occupancies.
#[async_trait]
pub trait RoleGroupRepository: Send + Sync {
    /// Returns one occupancy row by role id.
    async fn find(&self, role_id: &str) -> AppResult<Option<RoleGroupMapping>>;

    /// Inserts a new occupancy row.
    async fn insert(&self, mapping: RoleGroupMapping) -> AppResult<()>;

    /// Deletes one occupancy row.
    async fn delete(&self, role_id: &str) -> AppResult<()>;

    /// Lists occupancy rows matching a filter.
    async fn list(&self, query: MappingQuery) -> AppResult<Vec<RoleGroupMapping>>;
}

/// Store of per-role-type assignment configuration.
#[async_trait]
pub trait RoleTypeAssignmentRepository: Send + Sync {
    /// Returns one role type row.
    async fn find(&self, role_type: &str) -> AppResult<Option<RoleTypeAssignmentMapping>>;

    /// Inserts a new role type row.
    async fn insert(&self, mapping: RoleTypeAssignmentMapping) -> AppResult<()>;

    /// Applies a partial update to one role type row.
    async fn update(&self, role_type: &str, update: RoleTypeAssignmentUpdate) -> AppResult<()>;

    /// Deletes one role type row.
    async fn delete(&self, role_type: &str) -> AppResult<()>;

    /// Lists role type rows matching a filter.
    async fn list(&self, query: MappingQuery) -> AppResult<Vec<RoleTypeAssignmentMapping>>;

    /// Claims the single-occupancy slot of one role type.
    ///
    /// Sets `position_filled` to true only when it is currently false, in one
    /// conditional update. Returns whether this caller won the claim; a lost
    /// claim means the position was filled concurrently.
    async fn try_fill_position(&self, role_type: &str) -> AppResult<bool>;
}

/// Store of per-group constraint sets.
#[async_trait]
pub trait GroupConstraintsRepository: Send + Sync {
    /// Returns one group row.
    async fn find(&self, group_id: &str) -> AppResult<Option<GroupConstraintsMapping>>;

    /// Inserts a new group row.
    async fn insert(&self, mapping: GroupConstraintsMapping) -> AppResult<()>;

    /// Replaces one group row.
    async fn update(&self, mapping: GroupConstraintsMapping) -> AppResult<()>;

    /// Deletes one group row.
    async fn delete(&self, group_id: &str) -> AppResult<()>;

    /// Lists group rows matching a filter.
    async fn list(&self, query: MappingQuery) -> AppResult<Vec<GroupConstraintsMapping>>;
}

/// Store of tracked role applications.
///
/// Only the task executor writes through this port.
#[async_trait]
pub trait RoleApplicationRepository: Send + Sync {
    /// Inserts a pending application record.
    async fn insert(&self, application: RoleApplication) -> AppResult<()>;

    /// Writes the terminal status and outcome of one application.
    async fn complete(
        &self,
        role_application_id: &str,
        status: RoleApplicationStatus,
        response_data: Value,
    ) -> AppResult<()>;

    /// Returns one application by tracking id.
    async fn find(&self, role_application_id: &str) -> AppResult<Option<RoleApplication>>;

    /// Lists applications matching a filter.
    async fn list(&self, query: RoleApplicationQuery) -> AppResult<Vec<RoleApplication>>;
}
