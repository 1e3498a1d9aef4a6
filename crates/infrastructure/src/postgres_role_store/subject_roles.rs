use async_trait::async_trait;
use rolegrid_application::{MappingQuery, SubjectRolesRepository};
use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::SubjectRolesMapping;

use super::PostgresRoleStore;

#[derive(sqlx::FromRow)]
struct SubjectRolesRow {
    subject_id: String,
    role_ids: Vec<String>,
    subject_type: String,
    job_space_id: String,
}

impl From<SubjectRolesRow> for SubjectRolesMapping {
    fn from(row: SubjectRolesRow) -> Self {
        Self {
            subject_id: row.subject_id,
            role_ids: row.role_ids,
            subject_type: row.subject_type,
            job_space_id: row.job_space_id,
        }
    }
}

#[async_trait]
impl SubjectRolesRepository for PostgresRoleStore {
    async fn find(&self, subject_id: &str) -> AppResult<Option<SubjectRolesMapping>> {
        let row = sqlx::query_as::<_, SubjectRolesRow>(
            r#"
            SELECT subject_id, role_ids, subject_type, job_space_id
            FROM subject_roles_mapping
            WHERE subject_id = $1
            "#,
        )
        .bind(subject_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load subject roles for '{subject_id}': {error}"
            ))
        })?;

        Ok(row.map(SubjectRolesMapping::from))
    }

    async fn insert(&self, mapping: SubjectRolesMapping) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO subject_roles_mapping (subject_id, role_ids, subject_type, job_space_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (subject_id) DO NOTHING
            "#,
        )
        .bind(mapping.subject_id.as_str())
        .bind(&mapping.role_ids)
        .bind(mapping.subject_type.as_str())
        .bind(mapping.job_space_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to insert subject roles for '{}': {error}",
                mapping.subject_id
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "subject '{}' already has a roles row",
                mapping.subject_id
            )));
        }

        Ok(())
    }

    async fn update_role_ids(&self, subject_id: &str, role_ids: Vec<String>) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE subject_roles_mapping
            SET role_ids = $2, updated_at = now()
            WHERE subject_id = $1
            "#,
        )
        .bind(subject_id)
        .bind(&role_ids)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to update subject roles for '{subject_id}': {error}"
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "subject '{subject_id}' not found"
            )));
        }

        Ok(())
    }

    async fn delete(&self, subject_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM subject_roles_mapping WHERE subject_id = $1")
            .bind(subject_id)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to delete subject roles for '{subject_id}': {error}"
                ))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "subject '{subject_id}' not found"
            )));
        }

        Ok(())
    }

    async fn list(&self, query: MappingQuery) -> AppResult<Vec<SubjectRolesMapping>> {
        let rows = sqlx::query_as::<_, SubjectRolesRow>(
            r#"
            SELECT subject_id, role_ids, subject_type, job_space_id
            FROM subject_roles_mapping
            WHERE ($1::TEXT IS NULL OR subject_type = $1)
              AND ($2::TEXT IS NULL OR job_space_id = $2)
            ORDER BY subject_id ASC
            "#,
        )
        .bind(query.type_filter.as_deref())
        .bind(query.job_space_id.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list subject roles rows: {error}"))
        })?;

        Ok(rows.into_iter().map(SubjectRolesMapping::from).collect())
    }
}
