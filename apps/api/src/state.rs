use std::sync::Arc;

use rolegrid_application::{
    GroupConstraintsRepository, RoleApplicationRepository, RoleGroupRepository, RoleTaskExecutor,
    RoleTypeAssignmentRepository, SubjectRolesRepository,
};

/// Shared handler state: the task executor plus read/CRUD access to the
/// mapping stores.
#[derive(Clone)]
pub struct AppState {
    pub executor: Arc<RoleTaskExecutor>,
    pub subject_roles: Arc<dyn SubjectRolesRepository>,
    pub role_groups: Arc<dyn RoleGroupRepository>,
    pub role_types: Arc<dyn RoleTypeAssignmentRepository>,
    pub group_constraints: Arc<dyn GroupConstraintsRepository>,
    pub applications: Arc<dyn RoleApplicationRepository>,
}
