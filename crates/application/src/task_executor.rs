use std::sync::Arc;

use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{ResolutionOutcome, RoleApplication, RoleApplicationStatus, RoleTaskAction};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::ports::RoleApplicationRepository;
use crate::role_assignment_service::RoleAssignmentService;

struct QueuedRoleTask {
    role_application_id: String,
    payload: Value,
}

/// Single-worker FIFO pipeline over all role task processing.
///
/// `submit` is fire-and-forget; exactly one worker drains the queue, so tasks
/// of one executor instance never interleave. The worker is the only writer
/// of role application rows: it inserts the pending record, resolves the
/// task, and writes the terminal outcome. Task failures are recorded and
/// logged, never propagated, so one bad task cannot stop the pipeline.
pub struct RoleTaskExecutor {
    queue: mpsc::UnboundedSender<QueuedRoleTask>,
}

impl RoleTaskExecutor {
    /// Starts the background worker and returns the submission handle.
    #[must_use]
    pub fn spawn(
        service: RoleAssignmentService,
        applications: Arc<dyn RoleApplicationRepository>,
    ) -> Self {
        let (queue, receiver) = mpsc::unbounded_channel();
        tokio::spawn(worker_loop(service, applications, receiver));
        info!("role task executor started");

        Self { queue }
    }

    /// Enqueues one role task and returns immediately.
    pub fn submit(&self, role_application_id: &str, payload: Value) -> AppResult<()> {
        self.queue
            .send(QueuedRoleTask {
                role_application_id: role_application_id.to_owned(),
                payload,
            })
            .map_err(|_| AppError::Internal("role task worker is not running".to_owned()))?;

        info!(role_application_id, "role task submitted");
        Ok(())
    }
}

async fn worker_loop(
    service: RoleAssignmentService,
    applications: Arc<dyn RoleApplicationRepository>,
    mut receiver: mpsc::UnboundedReceiver<QueuedRoleTask>,
) {
    while let Some(task) = receiver.recv().await {
        let QueuedRoleTask {
            role_application_id,
            payload,
        } = task;
        info!(%role_application_id, "processing role task");

        let pending = RoleApplication::pending(role_application_id.as_str(), payload.clone());
        if let Err(error) = applications.insert(pending).await {
            warn!(
                %role_application_id,
                %error,
                "failed to persist pending role application"
            );
            continue;
        }

        let outcome = resolve_role_task(&service, payload).await;
        let status = if outcome.success {
            RoleApplicationStatus::Success
        } else {
            RoleApplicationStatus::Failed
        };
        let response_data = serde_json::to_value(&outcome).unwrap_or_else(|error| {
            warn!(%role_application_id, %error, "failed to serialize task outcome");
            Value::Object(serde_json::Map::new())
        });

        if let Err(error) = applications
            .complete(role_application_id.as_str(), status, response_data)
            .await
        {
            warn!(
                %role_application_id,
                %error,
                "failed to persist role task outcome"
            );
            continue;
        }

        info!(
            %role_application_id,
            status = status.as_str(),
            "role task processed"
        );
    }
}

/// Parses one submitted payload and dispatches it to its strategy.
///
/// Parse failures (unknown action, missing required fields) become structured
/// validation failures before any strategy runs or state is touched; strategy
/// errors are folded into failure outcomes at this boundary.
pub async fn resolve_role_task(
    service: &RoleAssignmentService,
    payload: Value,
) -> ResolutionOutcome {
    let action: RoleTaskAction = match serde_json::from_value(payload) {
        Ok(action) => action,
        Err(error) => {
            warn!(%error, "rejected malformed role task payload");
            return ResolutionOutcome::rejected(format!("Invalid role task payload: {error}"));
        }
    };

    let resolved = match &action {
        RoleTaskAction::AssignDirect {
            role_application_id,
            application_data,
            subject_id,
            subject_data,
        } => {
            service
                .assign_direct(
                    role_application_id,
                    application_data,
                    subject_id,
                    subject_data,
                )
                .await
        }
        RoleTaskAction::AssignByCriteria {
            role_application_id,
            application_data,
            selection_criteria,
        } => {
            service
                .assign_by_criteria(role_application_id, application_data, selection_criteria)
                .await
        }
        RoleTaskAction::AssignByAuction {
            role_application_id,
            application_data,
            subject_list,
        } => {
            service
                .assign_by_auction(role_application_id, application_data, subject_list)
                .await
        }
        RoleTaskAction::Remove {
            role_id,
            subject_id,
        } => service.remove_role(role_id, subject_id).await,
    };

    match resolved {
        Ok(outcome) => outcome,
        Err(error) => {
            warn!(action = action.action_name(), %error, "role task failed");
            ResolutionOutcome::rejected(error.to_string())
        }
    }
}
