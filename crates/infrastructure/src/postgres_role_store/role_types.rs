use async_trait::async_trait;
use rolegrid_application::{MappingQuery, RoleTypeAssignmentRepository, RoleTypeAssignmentUpdate};
use rolegrid_core::{AppError, AppResult};
use rolegrid_domain::{RoleAssignmentPolicy, RoleTypeAssignmentMapping};

use super::PostgresRoleStore;

#[derive(sqlx::FromRow)]
struct RoleTypeRow {
    role_type: String,
    role_assignment_type: String,
    role_post_removal_dsl_workflow_id: String,
    role_post_addition_dsl_workflow_id: String,
    role_auction_creation_dsl_workflow_id: String,
    position_filled: bool,
    job_space_id: String,
}

impl RoleTypeRow {
    fn into_mapping(self) -> AppResult<RoleTypeAssignmentMapping> {
        let policy =
            RoleAssignmentPolicy::parse(self.role_assignment_type.as_str()).ok_or_else(|| {
                AppError::Internal(format!(
                    "role type '{}' has unknown assignment policy '{}'",
                    self.role_type, self.role_assignment_type
                ))
            })?;

        Ok(RoleTypeAssignmentMapping {
            role_type: self.role_type,
            role_assignment_type: policy,
            role_post_removal_dsl_workflow_id: self.role_post_removal_dsl_workflow_id,
            role_post_addition_dsl_workflow_id: self.role_post_addition_dsl_workflow_id,
            role_auction_creation_dsl_workflow_id: self.role_auction_creation_dsl_workflow_id,
            position_filled: self.position_filled,
            job_space_id: self.job_space_id,
        })
    }
}

const ROLE_TYPE_COLUMNS: &str = r#"
    role_type,
    role_assignment_type,
    role_post_removal_dsl_workflow_id,
    role_post_addition_dsl_workflow_id,
    role_auction_creation_dsl_workflow_id,
    position_filled,
    job_space_id
"#;

#[async_trait]
impl RoleTypeAssignmentRepository for PostgresRoleStore {
    async fn find(&self, role_type: &str) -> AppResult<Option<RoleTypeAssignmentMapping>> {
        let row = sqlx::query_as::<_, RoleTypeRow>(&format!(
            "SELECT {ROLE_TYPE_COLUMNS} FROM role_type_assignment_mapping WHERE role_type = $1"
        ))
        .bind(role_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to load role type '{role_type}': {error}"))
        })?;

        row.map(RoleTypeRow::into_mapping).transpose()
    }

    async fn insert(&self, mapping: RoleTypeAssignmentMapping) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO role_type_assignment_mapping (
                role_type,
                role_assignment_type,
                role_post_removal_dsl_workflow_id,
                role_post_addition_dsl_workflow_id,
                role_auction_creation_dsl_workflow_id,
                position_filled,
                job_space_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (role_type) DO NOTHING
            "#,
        )
        .bind(mapping.role_type.as_str())
        .bind(mapping.role_assignment_type.as_str())
        .bind(mapping.role_post_removal_dsl_workflow_id.as_str())
        .bind(mapping.role_post_addition_dsl_workflow_id.as_str())
        .bind(mapping.role_auction_creation_dsl_workflow_id.as_str())
        .bind(mapping.position_filled)
        .bind(mapping.job_space_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to insert role type '{}': {error}",
                mapping.role_type
            ))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(format!(
                "role type '{}' already exists",
                mapping.role_type
            )));
        }

        Ok(())
    }

    async fn update(&self, role_type: &str, update: RoleTypeAssignmentUpdate) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE role_type_assignment_mapping
            SET
                role_assignment_type = COALESCE($2, role_assignment_type),
                role_post_removal_dsl_workflow_id = COALESCE($3, role_post_removal_dsl_workflow_id),
                role_post_addition_dsl_workflow_id = COALESCE($4, role_post_addition_dsl_workflow_id),
                role_auction_creation_dsl_workflow_id = COALESCE($5, role_auction_creation_dsl_workflow_id),
                position_filled = COALESCE($6, position_filled),
                job_space_id = COALESCE($7, job_space_id),
                updated_at = now()
            WHERE role_type = $1
            "#,
        )
        .bind(role_type)
        .bind(update.role_assignment_type.map(|policy| policy.as_str()))
        .bind(update.role_post_removal_dsl_workflow_id)
        .bind(update.role_post_addition_dsl_workflow_id)
        .bind(update.role_auction_creation_dsl_workflow_id)
        .bind(update.position_filled)
        .bind(update.job_space_id)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to update role type '{role_type}': {error}"))
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role type '{role_type}' not found"
            )));
        }

        Ok(())
    }

    async fn delete(&self, role_type: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM role_type_assignment_mapping WHERE role_type = $1")
            .bind(role_type)
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete role type '{role_type}': {error}"))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "role type '{role_type}' not found"
            )));
        }

        Ok(())
    }

    async fn list(&self, query: MappingQuery) -> AppResult<Vec<RoleTypeAssignmentMapping>> {
        let rows = sqlx::query_as::<_, RoleTypeRow>(&format!(
            r#"
            SELECT {ROLE_TYPE_COLUMNS}
            FROM role_type_assignment_mapping
            WHERE ($1::TEXT IS NULL OR role_type = $1)
              AND ($2::TEXT IS NULL OR job_space_id = $2)
            ORDER BY role_type ASC
            "#
        ))
        .bind(query.role_type.as_deref())
        .bind(query.job_space_id.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list role type rows: {error}")))?;

        rows.into_iter().map(RoleTypeRow::into_mapping).collect()
    }

    async fn try_fill_position(&self, role_type: &str) -> AppResult<bool> {
        // One conditional update closes the check-then-set race across
        // processes: the claim only succeeds while the flag is still false.
        let result = sqlx::query(
            r#"
            UPDATE role_type_assignment_mapping
            SET position_filled = TRUE, updated_at = now()
            WHERE role_type = $1 AND position_filled = FALSE
            "#,
        )
        .bind(role_type)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to claim position for role type '{role_type}': {error}"
            ))
        })?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }

        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM role_type_assignment_mapping WHERE role_type = $1)",
        )
        .bind(role_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to check role type '{role_type}': {error}"))
        })?;

        if !exists {
            return Err(AppError::NotFound(format!(
                "role type '{role_type}' not found"
            )));
        }

        Ok(false)
    }
}
