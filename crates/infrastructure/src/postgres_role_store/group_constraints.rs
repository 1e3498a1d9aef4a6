use async_trait::async_trait;
use rolegrid_application::{GroupConstraintsRepository, MappingQuery};
use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::GroupConstraintsMapping;

use super::PostgresRoleStore;

#[derive(sqlx::FromRow)]
struct GroupConstraintsRow {
    group_id: String,
    group_type: String,
    constraint_ids: Vec<String>,
    job_space_id: String,
}

impl From<GroupConstraintsRow> for GroupConstraintsMapping {
    fn from(row: GroupConstraintsRow) -> Self {
        Self {
            group_id: row.group_id,
            group_type: row.group_type,
            constraint_ids: row.constraint_ids,
            job_space_id: row.job_space_id,
        }
    }
}

#[async_trait]
impl GroupConstraintsRepository for PostgresRoleStore {
    async fn find(&self, group_id: &str) -> AppResult<Option<GroupConstraintsMapping>> {
        let row = sqlx::query_as::<_, GroupConstraintsRow>(
            r#"
            SELECT group_id, group_type, constraint_ids, job_space_id
            FROM group_constraints_mapping
            WHERE group_id = $1
            "#,
        )
        .bind(group_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load group constraints '{group_id}': {error}"
            ))
        })?;

        Ok(row.map(GroupConstraintsMapping::from))
    }

    async fn insert(&self, mapping: GroupConstraintsMapping) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO group_constraints_mapping (group_id, group_type, constraint_ids, job_space_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (group_id) DO NOTHING
            "#,
        )
        .bind(mapping.group_id.as_str())
        .bind(mapping.group_type.as_str())
        .bind(&mapping.constraint_ids)
        .bind(mapping.job_space_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to insert group constraints '{}': {error}",
                mapping.group_id
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "group '{}' already exists",
                mapping.group_id
            )));
        }

        Ok(())
    }

    async fn update(&self, mapping: GroupConstraintsMapping) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE group_constraints_mapping
            SET group_type = $2, constraint_ids = $3, job_space_id = $4
            WHERE group_id = $1
            "#,
        )
        .bind(mapping.group_id.as_str())
        .bind(mapping.group_type.as_str())
        .bind(&mapping.constraint_ids)
        .bind(mapping.job_space_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to update group constraints '{}': {error}",
                mapping.group_id
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "group '{}' not found",
                mapping.group_id
            )));
        }

        Ok(())
    }

    async fn delete(&self, group_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM group_constraints_mapping WHERE group_id = $1")
            .bind(group_id)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to delete group constraints '{group_id}': {error}"
                ))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("group '{group_id}' not found")));
        }

        Ok(())
    }

    async fn list(&self, query: MappingQuery) -> AppResult<Vec<GroupConstraintsMapping>> {
        let rows = sqlx::query_as::<_, GroupConstraintsRow>(
            r#"
            SELECT group_id, group_type, constraint_ids, job_space_id
            FROM group_constraints_mapping
            WHERE ($1::TEXT IS NULL OR group_type = $1)
              AND ($2::TEXT IS NULL OR job_space_id = $2)
            ORDER BY group_id ASC
            "#,
        )
        .bind(query.type_filter.as_deref())
        .bind(query.job_space_id.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list group constraints rows: {error}"))
        })?;

        Ok(rows.into_iter().map(GroupConstraintsMapping::from).collect())
    }
}
