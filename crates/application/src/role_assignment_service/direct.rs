use super::*;

impl RoleAssignmentService {
    /// Binds a caller-named subject to a role of the requested type.
    ///
    /// Two sequential DSL gates guard the binding: the PQT check against the
    /// addition workflow, then the application evaluation. Both must pass.
    pub async fn assign_direct(
        &self,
        role_application_id: &str,
        application_data: &Value,
        subject_id: &str,
        subject_data: &Value,
    ) -> AppResult<ResolutionOutcome> {
        let role_type = Self::role_type_of(application_data)?;
        let mapping = match self.load_assignable_role_type(role_type).await? {
            RoleTypeGate::Eligible(mapping) => mapping,
            RoleTypeGate::Rejected(outcome) => return Ok(outcome),
        };

        let pqt_workflow_id = mapping.role_post_addition_dsl_workflow_id.as_str();
        if pqt_workflow_id.is_empty() {
            return Err(AppError::Validation(format!(
                "role type '{role_type}' has no role_post_addition_dsl_workflow_id"
            )));
        }

        let pqt_input = json!({
            "role_type_data": role_type_document(&mapping)?,
            "application_data": application_data,
        });
        let pqt_output = self.dsl.execute(pqt_workflow_id, pqt_input).await?;
        if !pqt_output.is_approved() {
            warn!(role_type, subject_id, "PQT check denied assignment");
            return Ok(ResolutionOutcome::rejected("PQT check failed"));
        }

        if !self
            .evaluation_gate_passes(&mapping, application_data)
            .await?
        {
            warn!(role_type, subject_id, "application evaluation denied assignment");
            return Ok(ResolutionOutcome::rejected("Application evaluation failed"));
        }

        self.commit_binding(
            role_application_id,
            application_data,
            &mapping,
            subject_id,
            subject_data,
        )
        .await
    }
}
