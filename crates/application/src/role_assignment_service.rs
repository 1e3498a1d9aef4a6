use std::sync::Arc;

use rolegrid_core::{AppError, AppResult, RoleId};
use rolegrid_domain::{
    ResolutionOutcome, RoleGroupMapping, RoleTypeAssignmentMapping, SubjectRolesMapping,
};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::ports::{
    AssociationClient, AuctionGateway, DslEvaluator, RoleGroupRepository,
    RoleTypeAssignmentRepository, SubjectRolesRepository, SubjectSearchClient,
};

mod auction;
mod criteria;
mod direct;
mod removal;

/// Resolves role applications against the mapping stores and collaborators.
///
/// All strategies share the role-type preamble and the binding commit; gate
/// rejections surface as structured outcomes while infrastructure failures
/// propagate as errors for the executor to record.
#[derive(Clone)]
pub struct RoleAssignmentService {
    role_types: Arc<dyn RoleTypeAssignmentRepository>,
    subject_roles: Arc<dyn SubjectRolesRepository>,
    role_groups: Arc<dyn RoleGroupRepository>,
    dsl: Arc<dyn DslEvaluator>,
    association: Arc<dyn AssociationClient>,
    subject_search: Arc<dyn SubjectSearchClient>,
    auction: Arc<dyn AuctionGateway>,
}

/// Result of the shared role-type preamble.
enum RoleTypeGate {
    Eligible(RoleTypeAssignmentMapping),
    Rejected(ResolutionOutcome),
}

impl RoleAssignmentService {
    /// Creates an assignment service over injected stores and collaborators.
    #[must_use]
    pub fn new(
        role_types: Arc<dyn RoleTypeAssignmentRepository>,
        subject_roles: Arc<dyn SubjectRolesRepository>,
        role_groups: Arc<dyn RoleGroupRepository>,
        dsl: Arc<dyn DslEvaluator>,
        association: Arc<dyn AssociationClient>,
        subject_search: Arc<dyn SubjectSearchClient>,
        auction: Arc<dyn AuctionGateway>,
    ) -> Self {
        Self {
            role_types,
            subject_roles,
            role_groups,
            dsl,
            association,
            subject_search,
            auction,
        }
    }

    /// Reads the role type key out of an application payload.
    fn role_type_of(application_data: &Value) -> AppResult<&str> {
        application_data
            .get("role_type")
            .and_then(Value::as_str)
            .filter(|role_type| !role_type.is_empty())
            .ok_or_else(|| {
                AppError::Validation("role_type not found in application_data".to_owned())
            })
    }

    /// Fetches the role type row and applies the assignability guards.
    async fn load_assignable_role_type(&self, role_type: &str) -> AppResult<RoleTypeGate> {
        let Some(mapping) = self.role_types.find(role_type).await? else {
            return Err(AppError::NotFound(format!("Role type {role_type} not found")));
        };

        if !mapping.role_assignment_type.supports_dynamic_assignment() {
            warn!(
                role_type,
                policy = mapping.role_assignment_type.as_str(),
                "role type does not permit dynamic assignment"
            );
            return Ok(RoleTypeGate::Rejected(ResolutionOutcome::rejected(
                "Unsupported role assignment type",
            )));
        }

        if mapping.role_assignment_type.is_single_subject() && mapping.position_filled {
            warn!(role_type, "position already filled");
            return Ok(RoleTypeGate::Rejected(ResolutionOutcome::rejected(
                "Role already filled",
            )));
        }

        Ok(RoleTypeGate::Eligible(mapping))
    }

    /// Runs the application evaluation gate shared by all three strategies.
    async fn evaluation_gate_passes(
        &self,
        mapping: &RoleTypeAssignmentMapping,
        application_data: &Value,
    ) -> AppResult<bool> {
        let workflow_id = mapping.role_post_removal_dsl_workflow_id.as_str();
        if workflow_id.is_empty() {
            return Err(AppError::Validation(format!(
                "role type '{}' has no role_post_removal_dsl_workflow_id",
                mapping.role_type
            )));
        }

        let input = json!({
            "role_type_data": role_type_document(mapping)?,
            "application_data": application_data,
        });
        let output = self.dsl.execute(workflow_id, input).await?;
        Ok(output.is_approved())
    }

    /// Commits one binding: association, mapping writes, occupancy claim.
    ///
    /// Writes are ordered role_group/subject_roles before the occupancy flag;
    /// a lost conditional claim is reported as the already-filled outcome.
    async fn commit_binding(
        &self,
        role_application_id: &str,
        application_data: &Value,
        mapping: &RoleTypeAssignmentMapping,
        subject_id: &str,
        subject_data: &Value,
    ) -> AppResult<ResolutionOutcome> {
        let role_id = RoleId::new().to_string();
        let role_data = json!({
            "role_id": role_id,
            "role_type": mapping.role_type,
            "role_application_id": role_application_id,
        });

        let association = match self
            .association
            .create_association(subject_id, subject_data, &role_data)
            .await
        {
            Ok(response) => response,
            Err(error) => {
                warn!(subject_id, %error, "subject association failed");
                return Ok(ResolutionOutcome::rejected("Subject association failed"));
            }
        };

        match self.subject_roles.find(subject_id).await? {
            Some(mut entry) => {
                entry.add_role(role_id.as_str());
                self.subject_roles
                    .update_role_ids(subject_id, entry.role_ids)
                    .await?;
            }
            None => {
                let subject_type = application_data
                    .get("subject_type")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned();
                self.subject_roles
                    .insert(SubjectRolesMapping {
                        subject_id: subject_id.to_owned(),
                        role_ids: vec![role_id.clone()],
                        subject_type,
                        job_space_id: mapping.job_space_id.clone(),
                    })
                    .await?;
            }
        }

        if self.role_groups.find(role_id.as_str()).await?.is_none() {
            self.role_groups
                .insert(RoleGroupMapping {
                    role_id: role_id.clone(),
                    role_type: mapping.role_type.clone(),
                    group_ids: group_ids_of(application_data),
                    job_space_id: mapping.job_space_id.clone(),
                })
                .await?;
        }

        if mapping.role_assignment_type.is_single_subject()
            && !self.role_types.try_fill_position(mapping.role_type.as_str()).await?
        {
            warn!(
                role_type = %mapping.role_type,
                "occupancy claim lost after binding writes"
            );
            return Ok(ResolutionOutcome::rejected("Role already filled"));
        }

        info!(
            subject_id,
            role_id = %role_id,
            role_type = %mapping.role_type,
            "subject assigned to role"
        );
        Ok(ResolutionOutcome::assigned(role_id, association))
    }
}

fn role_type_document(mapping: &RoleTypeAssignmentMapping) -> AppResult<Value> {
    serde_json::to_value(mapping).map_err(|error| {
        AppError::Internal(format!(
            "failed to serialize role type '{}': {error}",
            mapping.role_type
        ))
    })
}

fn group_ids_of(application_data: &Value) -> Vec<String> {
    application_data
        .get("group_ids")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests;
