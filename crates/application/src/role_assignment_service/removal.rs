use rolegrid_domain::RoleAssignmentPolicy;

use super::*;

impl RoleAssignmentService {
    /// Vacates one bound role under DSL approval.
    ///
    /// The occupancy row is deleted and the role id stripped from the
    /// subject's set; the subject row disappears once its set empties. The
    /// role type's `position_filled` flag is left untouched: refilling a
    /// vacated single-subject role goes through the operator update path.
    pub async fn remove_role(
        &self,
        role_id: &str,
        subject_id: &str,
    ) -> AppResult<ResolutionOutcome> {
        let Some(role_entry) = self.role_groups.find(role_id).await? else {
            return Ok(ResolutionOutcome::rejected(format!(
                "Role {role_id} not found"
            )));
        };

        let Some(role_type_entry) = self.role_types.find(role_entry.role_type.as_str()).await?
        else {
            return Ok(ResolutionOutcome::rejected(format!(
                "Role type {} not found",
                role_entry.role_type
            )));
        };

        if role_type_entry.role_assignment_type == RoleAssignmentPolicy::Fixed {
            warn!(role_id, role_type = %role_entry.role_type, "fixed role cannot be removed");
            return Ok(ResolutionOutcome::rejected(
                "Role is fixed and cannot be removed",
            ));
        }

        let removal_workflow_id = role_type_entry.role_post_removal_dsl_workflow_id.as_str();
        if removal_workflow_id.is_empty() {
            return Ok(ResolutionOutcome::rejected(
                "No role_post_removal_dsl_workflow_id configured",
            ));
        }

        let role_data = serde_json::to_value(&role_entry).map_err(|error| {
            AppError::Internal(format!("failed to serialize role '{role_id}': {error}"))
        })?;
        let dsl_input = json!({"subject_id": subject_id, "role_data": role_data});
        let output = self.dsl.execute(removal_workflow_id, dsl_input).await?;
        if !output.is_approved() {
            warn!(role_id, subject_id, "removal workflow denied the request");
            return Ok(ResolutionOutcome::rejected("DSL denied role removal"));
        }

        self.role_groups.delete(role_id).await?;

        let Some(mut subject_entry) = self.subject_roles.find(subject_id).await? else {
            return Ok(ResolutionOutcome::rejected(format!(
                "Subject {subject_id} not found"
            )));
        };

        subject_entry.remove_role(role_id);
        if subject_entry.holds_no_roles() {
            self.subject_roles.delete(subject_id).await?;
        } else {
            self.subject_roles
                .update_role_ids(subject_id, subject_entry.role_ids)
                .await?;
        }

        info!(role_id, subject_id, "role removed from subject");
        Ok(ResolutionOutcome::removed())
    }
}
