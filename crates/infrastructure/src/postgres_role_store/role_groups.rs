use async_trait::async_trait;
use rolegrid_application::{MappingQuery, RoleGroupRepository};
use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::RoleGroupMapping;

use super::PostgresRoleStore;

#[derive(sqlx::FromRow)]
struct RoleGroupRow {
    role_id: String,
    role_type: String,
    group_ids: Vec<String>,
    job_space_id: String,
}

impl From<RoleGroupRow> for RoleGroupMapping {
    fn from(row: RoleGroupRow) -> Self {
        Self {
            role_id: row.role_id,
            role_type: row.role_type,
            group_ids: row.group_ids,
            job_space_id: row.job_space_id,
        }
    }
}

#[async_trait]
impl RoleGroupRepository for PostgresRoleStore {
    async fn find(&self, role_id: &str) -> AppResult<Option<RoleGroupMapping>> {
        let row = sqlx::query_as::<_, RoleGroupRow>(
            r#"
            SELECT role_id, role_type, group_ids, job_space_id
            FROM role_group_mapping
            WHERE role_id = $1
            "#,
        )
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load role group '{role_id}': {error}"))
        })?;

        Ok(row.map(RoleGroupMapping::from))
    }

    async fn insert(&self, mapping: RoleGroupMapping) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO role_group_mapping (role_id, role_type, group_ids, job_space_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (role_id) DO NOTHING
            "#,
        )
        .bind(mapping.role_id.as_str())
        .bind(mapping.role_type.as_str())
        .bind(&mapping.group_ids)
        .bind(mapping.job_space_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to insert role group '{}': {error}",
                mapping.role_id
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                mapping.role_id
            )));
        }

        Ok(())
    }

    async fn delete(&self, role_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM role_group_mapping WHERE role_id = $1")
            .bind(role_id)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete role group '{role_id}': {error}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' not found")));
        }

        Ok(())
    }

    async fn list(&self, query: MappingQuery) -> AppResult<Vec<RoleGroupMapping>> {
        let rows = sqlx::query_as::<_, RoleGroupRow>(
            r#"
            SELECT role_id, role_type, group_ids, job_space_id
            FROM role_group_mapping
            WHERE ($1::TEXT IS NULL OR role_type = $1)
              AND ($2::TEXT IS NULL OR job_space_id = $2)
            ORDER BY role_id ASC
            "#,
        )
        .bind(query.role_type.as_deref())
        .bind(query.job_space_id.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role group rows: {error}")))?;

        Ok(rows.into_iter().map(RoleGroupMapping::from).collect())
    }
}
