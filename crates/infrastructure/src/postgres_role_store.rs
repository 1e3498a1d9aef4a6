use sqlx::PgPool;

mod group_constraints;
mod role_applications;
mod role_groups;
mod role_types;
mod subject_roles;

/// Postgres-backed implementation of every mapping store.
///
/// Queries are runtime-bound; the schema lives in this crate's `migrations/`
/// directory and is applied by the API composition root at startup.
pub struct PostgresRoleStore {
    pool: PgPool,
}

impl PostgresRoleStore {
    /// Creates a store over one connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
