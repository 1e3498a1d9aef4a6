use rolegrid_domain::SelectionCriteria;

use super::*;

impl RoleAssignmentService {
    /// Searches for eligible subjects and binds the first candidate.
    ///
    /// The search round trip is bounded by the client's configured timeout.
    /// Selection policy: the first id in the returned list wins; the
    /// deterministic tie-break is part of the compatibility contract.
    pub async fn assign_by_criteria(
        &self,
        role_application_id: &str,
        application_data: &Value,
        selection_criteria: &SelectionCriteria,
    ) -> AppResult<ResolutionOutcome> {
        let role_type = Self::role_type_of(application_data)?;
        let mapping = match self.load_assignable_role_type(role_type).await? {
            RoleTypeGate::Eligible(mapping) => mapping,
            RoleTypeGate::Rejected(outcome) => return Ok(outcome),
        };

        if selection_criteria.selection_dsl_workflow_id.is_empty() {
            return Err(AppError::Validation(
                "selection_dsl_workflow_id missing in selection_criteria".to_owned(),
            ));
        }

        let subjects = self
            .subject_search
            .search(
                &selection_criteria.filter_data,
                selection_criteria.selection_dsl_workflow_id.as_str(),
            )
            .await?;

        let Some(selected_subject_id) = subjects.first().cloned() else {
            warn!(role_type, "no subjects matched the selection criteria");
            return Ok(ResolutionOutcome::rejected("No eligible subjects found"));
        };
        let subject_data = json!({"selection": "auto"});

        if !self
            .evaluation_gate_passes(&mapping, application_data)
            .await?
        {
            warn!(
                role_type,
                subject_id = %selected_subject_id,
                "application evaluation denied the selected subject"
            );
            return Ok(ResolutionOutcome::rejected(
                "Evaluation failed for selected subject",
            ));
        }

        let outcome = self
            .commit_binding(
                role_application_id,
                application_data,
                &mapping,
                selected_subject_id.as_str(),
                &subject_data,
            )
            .await?;

        Ok(if outcome.success {
            outcome.with_subject(selected_subject_id)
        } else {
            outcome
        })
    }
}
