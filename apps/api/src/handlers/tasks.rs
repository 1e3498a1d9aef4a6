use axum::Json;
use axum::extract::{Path, State};
use rolegrid_application::RoleApplicationQuery;
use rolegrid_core::AppError;
use rolegrid_domain::RoleApplication;
use serde_json::Value;
use uuid::Uuid;

use crate::dto::{RoleApplicationQueryRequest, SubmitRoleTaskResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn submit_role_task_handler(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> ApiResult<Json<SubmitRoleTaskResponse>> {
    if !payload.is_object() {
        return Err(AppError::Validation("payload must be a JSON object".to_owned()).into());
    }

    let role_application_id = Uuid::new_v4().to_string();
    state
        .executor
        .submit(role_application_id.as_str(), payload)?;

    Ok(Json(SubmitRoleTaskResponse {
        success: true,
        role_application_id,
    }))
}

pub async fn get_role_application_handler(
    State(state): State<AppState>,
    Path(role_application_id): Path<String>,
) -> ApiResult<Json<RoleApplication>> {
    let application = state
        .applications
        .find(role_application_id.as_str())
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("application '{role_application_id}' not found"))
        })?;

    Ok(Json(application))
}

pub async fn query_role_applications_handler(
    State(state): State<AppState>,
    Json(query): Json<RoleApplicationQueryRequest>,
) -> ApiResult<Json<Vec<RoleApplication>>> {
    let query = RoleApplicationQuery::try_from(query)?;
    Ok(Json(state.applications.list(query).await?))
}
