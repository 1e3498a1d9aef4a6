use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use rolegrid_application::RoleTypeAssignmentUpdate;
use rolegrid_core::AppError;
use rolegrid_domain::{
    GroupConstraintsMapping, RoleGroupMapping, RoleTypeAssignmentMapping, SubjectRolesMapping,
};

use crate::dto::{MappingQueryRequest, RoleTypeUpdateRequest};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn query_subject_roles_handler(
    State(state): State<AppState>,
    Json(query): Json<MappingQueryRequest>,
) -> ApiResult<Json<Vec<SubjectRolesMapping>>> {
    Ok(Json(state.subject_roles.list(query.into()).await?))
}

pub async fn get_subject_roles_handler(
    State(state): State<AppState>,
    Path(subject_id): Path<String>,
) -> ApiResult<Json<SubjectRolesMapping>> {
    let mapping = state
        .subject_roles
        .find(subject_id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("subject '{subject_id}' not found")))?;

    Ok(Json(mapping))
}

pub async fn query_role_groups_handler(
    State(state): State<AppState>,
    Json(query): Json<MappingQueryRequest>,
) -> ApiResult<Json<Vec<RoleGroupMapping>>> {
    Ok(Json(state.role_groups.list(query.into()).await?))
}

pub async fn get_role_group_handler(
    State(state): State<AppState>,
    Path(role_id): Path<String>,
) -> ApiResult<Json<RoleGroupMapping>> {
    let mapping = state
        .role_groups
        .find(role_id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' not found")))?;

    Ok(Json(mapping))
}

pub async fn insert_role_type_handler(
    State(state): State<AppState>,
    Json(mapping): Json<RoleTypeAssignmentMapping>,
) -> ApiResult<(StatusCode, Json<RoleTypeAssignmentMapping>)> {
    state.role_types.insert(mapping.clone()).await?;
    Ok((StatusCode::CREATED, Json(mapping)))
}

pub async fn query_role_types_handler(
    State(state): State<AppState>,
    Json(query): Json<MappingQueryRequest>,
) -> ApiResult<Json<Vec<RoleTypeAssignmentMapping>>> {
    Ok(Json(state.role_types.list(query.into()).await?))
}

pub async fn get_role_type_handler(
    State(state): State<AppState>,
    Path(role_type): Path<String>,
) -> ApiResult<Json<RoleTypeAssignmentMapping>> {
    let mapping = state
        .role_types
        .find(role_type.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("role type '{role_type}' not found")))?;

    Ok(Json(mapping))
}

pub async fn update_role_type_handler(
    State(state): State<AppState>,
    Path(role_type): Path<String>,
    Json(update): Json<RoleTypeUpdateRequest>,
) -> ApiResult<Json<RoleTypeAssignmentMapping>> {
    let update = RoleTypeAssignmentUpdate::try_from(update)?;
    state.role_types.update(role_type.as_str(), update).await?;

    let mapping = state
        .role_types
        .find(role_type.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("role type '{role_type}' not found")))?;

    Ok(Json(mapping))
}

pub async fn delete_role_type_handler(
    State(state): State<AppState>,
    Path(role_type): Path<String>,
) -> ApiResult<StatusCode> {
    state.role_types.delete(role_type.as_str()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn insert_group_constraints_handler(
    State(state): State<AppState>,
    Json(mapping): Json<GroupConstraintsMapping>,
) -> ApiResult<(StatusCode, Json<GroupConstraintsMapping>)> {
    state.group_constraints.insert(mapping.clone()).await?;
    Ok((StatusCode::CREATED, Json(mapping)))
}

pub async fn query_group_constraints_handler(
    State(state): State<AppState>,
    Json(query): Json<MappingQueryRequest>,
) -> ApiResult<Json<Vec<GroupConstraintsMapping>>> {
    Ok(Json(state.group_constraints.list(query.into()).await?))
}

pub async fn get_group_constraints_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<Json<GroupConstraintsMapping>> {
    let mapping = state
        .group_constraints
        .find(group_id.as_str())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("group '{group_id}' not found")))?;

    Ok(Json(mapping))
}

pub async fn update_group_constraints_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
    Json(mut mapping): Json<GroupConstraintsMapping>,
) -> ApiResult<Json<GroupConstraintsMapping>> {
    mapping.group_id = group_id;
    state.group_constraints.update(mapping.clone()).await?;
    Ok(Json(mapping))
}

pub async fn delete_group_constraints_handler(
    State(state): State<AppState>,
    Path(group_id): Path<String>,
) -> ApiResult<StatusCode> {
    state.group_constraints.delete(group_id.as_str()).await?;
    Ok(StatusCode::NO_CONTENT)
}
