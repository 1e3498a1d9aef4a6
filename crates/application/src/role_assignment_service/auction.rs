use rolegrid_domain::AuctionCandidate;

use crate::ports::BidOutcome;

use super::*;

impl RoleAssignmentService {
    /// Runs an auction over the submitted candidates and binds the winner.
    ///
    /// The bid payload is produced by the role type's auction creation
    /// workflow; the winner reported on the bid event channel must belong to
    /// the submitted candidate list, which defends against stale or
    /// cross-talk results.
    pub async fn assign_by_auction(
        &self,
        role_application_id: &str,
        application_data: &Value,
        subject_list: &[AuctionCandidate],
    ) -> AppResult<ResolutionOutcome> {
        let role_type = Self::role_type_of(application_data)?;
        let mapping = match self.load_assignable_role_type(role_type).await? {
            RoleTypeGate::Eligible(mapping) => mapping,
            RoleTypeGate::Rejected(outcome) => return Ok(outcome),
        };

        let auction_workflow_id = mapping.role_auction_creation_dsl_workflow_id.as_str();
        if auction_workflow_id.is_empty() {
            return Err(AppError::Validation(format!(
                "role type '{role_type}' has no role_auction_creation_dsl_workflow_id"
            )));
        }

        let dsl_input = json!({
            "role_type_data": role_type_document(&mapping)?,
            "subjects": subject_list,
        });
        let auction_output = self.dsl.execute(auction_workflow_id, dsl_input).await?;
        let Some(bid_payload) = auction_output.approved_output().cloned() else {
            warn!(role_type, "auction workflow produced no bid payload");
            return Ok(ResolutionOutcome::rejected(
                "Auction DSL failed to generate payload",
            ));
        };

        let result = match self.auction.submit_bid_and_wait(bid_payload).await? {
            BidOutcome::Resolved { result } => result,
            BidOutcome::TimedOut => {
                warn!(role_type, "timed out waiting for bid result");
                return Ok(ResolutionOutcome::rejected("Timeout waiting for bid result"));
            }
            BidOutcome::Rejected { message } => {
                warn!(role_type, %message, "auction submission rejected");
                return Ok(ResolutionOutcome::rejected("Auction execution failed"));
            }
        };

        let Some(winner_subject_id) = result
            .get("winner_subject_id")
            .and_then(Value::as_str)
            .filter(|winner| !winner.is_empty())
        else {
            return Ok(ResolutionOutcome::rejected("No winner selected in auction"));
        };

        let Some(winner) = subject_list
            .iter()
            .find(|candidate| candidate.subject_id == winner_subject_id)
        else {
            warn!(
                role_type,
                winner_subject_id, "auction winner is not among the submitted candidates"
            );
            return Ok(ResolutionOutcome::rejected(
                "Winner subject not found in original list",
            ));
        };

        if !self
            .evaluation_gate_passes(&mapping, application_data)
            .await?
        {
            warn!(
                role_type,
                winner_subject_id, "application evaluation denied the auction winner"
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
                winner_subject_id,
                &winner.subject_data,
            )
            .await?;

        Ok(if outcome.success {
            outcome.with_subject(winner_subject_id)
        } else {
            outcome
        })
    }
}
