use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rolegrid_application::{RoleApplicationQuery, RoleApplicationRepository};
use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{RoleApplication, RoleApplicationStatus};
use serde_json::Value;

use super::PostgresRoleStore;

#[derive(sqlx::FromRow)]
struct RoleApplicationRow {
    role_application_id: String,
    application_data: Value,
    submission_time: DateTime<Utc>,
    status: String,
    response_data: Value,
}

impl RoleApplicationRow {
    fn into_application(self) -> AppResult<RoleApplication> {
        let status = RoleApplicationStatus::parse(self.status.as_str()).ok_or_else(|| {
            AppError::Internal(format!(
                "application '{}' has unknown status '{}'",
                self.role_application_id, self.status
            ))
        })?;

        Ok(RoleApplication {
            role_application_id: self.role_application_id,
            application_data: self.application_data,
            submission_time: self.submission_time,
            status,
            response_data: self.response_data,
        })
    }
}

#[async_trait]
impl RoleApplicationRepository for PostgresRoleStore {
    async fn insert(&self, application: RoleApplication) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO role_applications (
                role_application_id,
                application_data,
                submission_time,
                status,
                response_data
            )
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (role_application_id) DO NOTHING
            "#,
        )
        .bind(application.role_application_id.as_str())
        .bind(&application.application_data)
        .bind(application.submission_time)
        .bind(application.status.as_str())
        .bind(&application.response_data)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to insert application '{}': {error}",
                application.role_application_id
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "application '{}' already exists",
                application.role_application_id
            )));
        }

        Ok(())
    }

    async fn complete(
        &self,
        role_application_id: &str,
        status: RoleApplicationStatus,
        response_data: Value,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE role_applications
            SET status = $2, response_data = $3
            WHERE role_application_id = $1
            "#,
        )
        .bind(role_application_id)
        .bind(status.as_str())
        .bind(&response_data)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to complete application '{role_application_id}': {error}"
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "application '{role_application_id}' not found"
            )));
        }

        Ok(())
    }

    async fn find(&self, role_application_id: &str) -> AppResult<Option<RoleApplication>> {
        let row = sqlx::query_as::<_, RoleApplicationRow>(
            r#"
            SELECT role_application_id, application_data, submission_time, status, response_data
            FROM role_applications
            WHERE role_application_id = $1
            "#,
        )
        .bind(role_application_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load application '{role_application_id}': {error}"
            ))
        })?;

        row.map(RoleApplicationRow::into_application).transpose()
    }

    async fn list(&self, query: RoleApplicationQuery) -> AppResult<Vec<RoleApplication>> {
        let rows = sqlx::query_as::<_, RoleApplicationRow>(
            r#"
            SELECT role_application_id, application_data, submission_time, status, response_data
            FROM role_applications
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY submission_time ASC
            "#,
        )
        .bind(query.status.map(|status| status.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list applications: {error}")))?;

        rows.into_iter()
            .map(RoleApplicationRow::into_application)
            .collect()
    }
}
