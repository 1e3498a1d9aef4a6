use std::collections::HashMap;

use async_trait::async_trait;
use rolegrid_application::{
    GroupConstraintsRepository, MappingQuery, RoleApplicationQuery, RoleApplicationRepository,
    RoleGroupRepository, RoleTypeAssignmentRepository, RoleTypeAssignmentUpdate,
    SubjectRolesRepository,
};
use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{
    GroupConstraintsMapping, RoleApplication, RoleApplicationStatus, RoleGroupMapping,
    RoleTypeAssignmentMapping, SubjectRolesMapping,
};
use serde_json::Value;
use tokio::sync::RwLock;

/// In-memory implementation of every mapping store.
///
/// Backs tests and the standalone (no `DATABASE_URL`) runtime. The
/// single-occupancy claim runs under the write lock, so it stays a single
/// conditional update exactly like the SQL adapter.
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    subject_roles: RwLock<HashMap<String, SubjectRolesMapping>>,
    role_groups: RwLock<HashMap<String, RoleGroupMapping>>,
    role_types: RwLock<HashMap<String, RoleTypeAssignmentMapping>>,
    group_constraints: RwLock<HashMap<String, GroupConstraintsMapping>>,
    applications: RwLock<HashMap<String, RoleApplication>>,
}

impl InMemoryRoleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_filter(candidate: &str, filter: &Option<String>) -> bool {
    filter.as_deref().is_none_or(|wanted| candidate == wanted)
}

#[async_trait]
impl SubjectRolesRepository for InMemoryRoleStore {
    async fn find(&self, subject_id: &str) -> AppResult<Option<SubjectRolesMapping>> {
        Ok(self.subject_roles.read().await.get(subject_id).cloned())
    }

    async fn insert(&self, mapping: SubjectRolesMapping) -> AppResult<()> {
        let mut rows = self.subject_roles.write().await;
        if rows.contains_key(mapping.subject_id.as_str()) {
            return Err(AppError::Conflict(format!(
                "subject '{}' already has a roles row",
                mapping.subject_id
            )));
        }

        rows.insert(mapping.subject_id.clone(), mapping);
        Ok(())
    }

    async fn update_role_ids(&self, subject_id: &str, role_ids: Vec<String>) -> AppResult<()> {
        let mut rows = self.subject_roles.write().await;
        let mapping = rows
            .get_mut(subject_id)
            .ok_or_else(|| AppError::NotFound(format!("subject '{subject_id}' not found")))?;

        mapping.role_ids = role_ids;
        Ok(())
    }

    async fn delete(&self, subject_id: &str) -> AppResult<()> {
        if self.subject_roles.write().await.remove(subject_id).is_none() {
            return Err(AppError::NotFound(format!(
                "subject '{subject_id}' not found"
            )));
        }

        Ok(())
    }

    async fn list(&self, query: MappingQuery) -> AppResult<Vec<SubjectRolesMapping>> {
        let rows = self.subject_roles.read().await;
        let mut listed: Vec<SubjectRolesMapping> = rows
            .values()
            .filter(|mapping| {
                matches_filter(mapping.subject_type.as_str(), &query.type_filter)
                    && matches_filter(mapping.job_space_id.as_str(), &query.job_space_id)
            })
            .cloned()
            .collect();
        listed.sort_by(|left, right| left.subject_id.cmp(&right.subject_id));

        Ok(listed)
    }
}

#[async_trait]
impl RoleGroupRepository for InMemoryRoleStore {
    async fn find(&self, role_id: &str) -> AppResult<Option<RoleGroupMapping>> {
        Ok(self.role_groups.read().await.get(role_id).cloned())
    }

    async fn insert(&self, mapping: RoleGroupMapping) -> AppResult<()> {
        let mut rows = self.role_groups.write().await;
        if rows.contains_key(mapping.role_id.as_str()) {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                mapping.role_id
            )));
        }

        rows.insert(mapping.role_id.clone(), mapping);
        Ok(())
    }

    async fn delete(&self, role_id: &str) -> AppResult<()> {
        if self.role_groups.write().await.remove(role_id).is_none() {
            return Err(AppError::NotFound(format!("role '{role_id}' not found")));
        }

        Ok(())
    }

    async fn list(&self, query: MappingQuery) -> AppResult<Vec<RoleGroupMapping>> {
        let rows = self.role_groups.read().await;
        let mut listed: Vec<RoleGroupMapping> = rows
            .values()
            .filter(|mapping| {
                matches_filter(mapping.role_type.as_str(), &query.role_type)
                    && matches_filter(mapping.job_space_id.as_str(), &query.job_space_id)
            })
            .cloned()
            .collect();
        listed.sort_by(|left, right| left.role_id.cmp(&right.role_id));

        Ok(listed)
    }
}

#[async_trait]
impl RoleTypeAssignmentRepository for InMemoryRoleStore {
    async fn find(&self, role_type: &str) -> AppResult<Option<RoleTypeAssignmentMapping>> {
        Ok(self.role_types.read().await.get(role_type).cloned())
    }

    async fn insert(&self, mapping: RoleTypeAssignmentMapping) -> AppResult<()> {
        let mut rows = self.role_types.write().await;
        if rows.contains_key(mapping.role_type.as_str()) {
            return Err(AppError::Conflict(format!(
                "role type '{}' already exists",
                mapping.role_type
            )));
        }

        rows.insert(mapping.role_type.clone(), mapping);
        Ok(())
    }

    async fn update(&self, role_type: &str, update: RoleTypeAssignmentUpdate) -> AppResult<()> {
        let mut rows = self.role_types.write().await;
        let mapping = rows
            .get_mut(role_type)
            .ok_or_else(|| AppError::NotFound(format!("role type '{role_type}' not found")))?;

        if let Some(policy) = update.role_assignment_type {
            mapping.role_assignment_type = policy;
        }
        if let Some(workflow_id) = update.role_post_removal_dsl_workflow_id {
            mapping.role_post_removal_dsl_workflow_id = workflow_id;
        }
        if let Some(workflow_id) = update.role_post_addition_dsl_workflow_id {
            mapping.role_post_addition_dsl_workflow_id = workflow_id;
        }
        if let Some(workflow_id) = update.role_auction_creation_dsl_workflow_id {
            mapping.role_auction_creation_dsl_workflow_id = workflow_id;
        }
        if let Some(filled) = update.position_filled {
            mapping.position_filled = filled;
        }
        if let Some(job_space_id) = update.job_space_id {
            mapping.job_space_id = job_space_id;
        }

        Ok(())
    }

    async fn delete(&self, role_type: &str) -> AppResult<()> {
        if self.role_types.write().await.remove(role_type).is_none() {
            return Err(AppError::NotFound(format!(
                "role type '{role_type}' not found"
            )));
        }

        Ok(())
    }

    async fn list(&self, query: MappingQuery) -> AppResult<Vec<RoleTypeAssignmentMapping>> {
        let rows = self.role_types.read().await;
        let mut listed: Vec<RoleTypeAssignmentMapping> = rows
            .values()
            .filter(|mapping| {
                matches_filter(mapping.role_type.as_str(), &query.role_type)
                    && matches_filter(mapping.job_space_id.as_str(), &query.job_space_id)
            })
            .cloned()
            .collect();
        listed.sort_by(|left, right| left.role_type.cmp(&right.role_type));

        Ok(listed)
    }

    async fn try_fill_position(&self, role_type: &str) -> AppResult<bool> {
        let mut rows = self.role_types.write().await;
        let mapping = rows
            .get_mut(role_type)
            .ok_or_else(|| AppError::NotFound(format!("role type '{role_type}' not found")))?;

        if mapping.position_filled {
            return Ok(false);
        }

        mapping.position_filled = true;
        Ok(true)
    }
}

#[async_trait]
impl GroupConstraintsRepository for InMemoryRoleStore {
    async fn find(&self, group_id: &str) -> AppResult<Option<GroupConstraintsMapping>> {
        Ok(self.group_constraints.read().await.get(group_id).cloned())
    }

    async fn insert(&self, mapping: GroupConstraintsMapping) -> AppResult<()> {
        let mut rows = self.group_constraints.write().await;
        if rows.contains_key(mapping.group_id.as_str()) {
            return Err(AppError::Conflict(format!(
                "group '{}' already exists",
                mapping.group_id
            )));
        }

        rows.insert(mapping.group_id.clone(), mapping);
        Ok(())
    }

    async fn update(&self, mapping: GroupConstraintsMapping) -> AppResult<()> {
        let mut rows = self.group_constraints.write().await;
        if !rows.contains_key(mapping.group_id.as_str()) {
            return Err(AppError::NotFound(format!(
                "group '{}' not found",
                mapping.group_id
            )));
        }

        rows.insert(mapping.group_id.clone(), mapping);
        Ok(())
    }

    async fn delete(&self, group_id: &str) -> AppResult<()> {
        if self.group_constraints.write().await.remove(group_id).is_none() {
            return Err(AppError::NotFound(format!("group '{group_id}' not found")));
        }

        Ok(())
    }

    async fn list(&self, query: MappingQuery) -> AppResult<Vec<GroupConstraintsMapping>> {
        let rows = self.group_constraints.read().await;
        let mut listed: Vec<GroupConstraintsMapping> = rows
            .values()
            .filter(|mapping| {
                matches_filter(mapping.group_type.as_str(), &query.type_filter)
                    && matches_filter(mapping.job_space_id.as_str(), &query.job_space_id)
            })
            .cloned()
            .collect();
        listed.sort_by(|left, right| left.group_id.cmp(&right.group_id));

        Ok(listed)
    }
}

#[async_trait]
impl RoleApplicationRepository for InMemoryRoleStore {
    async fn insert(&self, application: RoleApplication) -> AppResult<()> {
        let mut rows = self.applications.write().await;
        if rows.contains_key(application.role_application_id.as_str()) {
            return Err(AppError::Conflict(format!(
                "application '{}' already exists",
                application.role_application_id
            )));
        }

        rows.insert(application.role_application_id.clone(), application);
        Ok(())
    }

    async fn complete(
        &self,
        role_application_id: &str,
        status: RoleApplicationStatus,
        response_data: Value,
    ) -> AppResult<()> {
        let mut rows = self.applications.write().await;
        let application = rows.get_mut(role_application_id).ok_or_else(|| {
            AppError::NotFound(format!("application '{role_application_id}' not found"))
        })?;

        application.status = status;
        application.response_data = response_data;
        Ok(())
    }

    async fn find(&self, role_application_id: &str) -> AppResult<Option<RoleApplication>> {
        Ok(self
            .applications
            .read()
            .await
            .get(role_application_id)
            .cloned())
    }

    async fn list(&self, query: RoleApplicationQuery) -> AppResult<Vec<RoleApplication>> {
        let rows = self.applications.read().await;
        let mut listed: Vec<RoleApplication> = rows
            .values()
            .filter(|application| {
                query
                    .status
                    .is_none_or(|status| application.status == status)
            })
            .cloned()
            .collect();
        listed.sort_by(|left, right| left.role_application_id.cmp(&right.role_application_id));

        Ok(listed)
    }
}
