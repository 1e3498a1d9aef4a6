//! Rolegrid API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod dto;
mod error;
mod handlers;
mod state;

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use rolegrid_application::{
    GroupConstraintsRepository, RoleApplicationRepository, RoleAssignmentService,
    RoleGroupRepository, RoleTaskExecutor, RoleTypeAssignmentRepository, SubjectRolesRepository,
};
use rolegrid_core::AppError;
use rolegrid_infrastructure::{
    AuctionRunner, HttpAssociationClient, HttpBidSubmitter, HttpDslEvaluator,
    HttpSubjectSearchClient, InMemoryRoleStore, PostgresRoleStore, RedisBidEventListener,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::api_config::ApiConfig;
use crate::state::AppState;

struct EngineStores {
    subject_roles: Arc<dyn SubjectRolesRepository>,
    role_groups: Arc<dyn RoleGroupRepository>,
    role_types: Arc<dyn RoleTypeAssignmentRepository>,
    group_constraints: Arc<dyn GroupConstraintsRepository>,
    applications: Arc<dyn RoleApplicationRepository>,
}

impl EngineStores {
    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: SubjectRolesRepository
            + RoleGroupRepository
            + RoleTypeAssignmentRepository
            + GroupConstraintsRepository
            + RoleApplicationRepository
            + 'static,
    {
        Self {
            subject_roles: store.clone(),
            role_groups: store.clone(),
            role_types: store.clone(),
            group_constraints: store.clone(),
            applications: store,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let stores = build_stores(&config).await?;
    if config.migrate_only {
        info!("database migrations applied successfully");
        return Ok(());
    }

    let http_client = reqwest::Client::builder()
        .timeout(config.http_client_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let dsl = Arc::new(HttpDslEvaluator::new(
        http_client.clone(),
        config.workflows_api_url.as_str(),
    ));
    let association = Arc::new(HttpAssociationClient::new(
        http_client.clone(),
        config.association_api_url.as_str(),
    ));
    // The search client enforces its own bounded wait, so it gets a client
    // without the blanket request timeout.
    let search_http_client = reqwest::Client::builder()
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;
    let subject_search = Arc::new(HttpSubjectSearchClient::new(
        search_http_client,
        config.subject_search_api_url.as_str(),
        config.subject_search_timeout,
    ));
    let bid_submitter = Arc::new(HttpBidSubmitter::new(
        http_client,
        config.auction_api_url.as_str(),
    ));
    let bid_events = Arc::new(RedisBidEventListener::new(
        config.redis_url.as_str(),
        config.org_id.as_str(),
    )?);
    let auction = Arc::new(AuctionRunner::spawn(
        bid_submitter,
        bid_events,
        config.bid_result_timeout,
    ));

    let service = RoleAssignmentService::new(
        stores.role_types.clone(),
        stores.subject_roles.clone(),
        stores.role_groups.clone(),
        dsl,
        association,
        subject_search,
        auction,
    );
    let executor = Arc::new(RoleTaskExecutor::spawn(
        service,
        stores.applications.clone(),
    ));

    let app_state = AppState {
        executor,
        subject_roles: stores.subject_roles,
        role_groups: stores.role_groups,
        role_types: stores.role_types,
        group_constraints: stores.group_constraints,
        applications: stores.applications,
    };

    let app = Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/submit-role-task",
            post(handlers::tasks::submit_role_task_handler),
        )
        .route(
            "/role-applications/query",
            post(handlers::tasks::query_role_applications_handler),
        )
        .route(
            "/role-applications/{role_application_id}",
            get(handlers::tasks::get_role_application_handler),
        )
        .route(
            "/subject-roles/query",
            post(handlers::mappings::query_subject_roles_handler),
        )
        .route(
            "/subject-roles/{subject_id}",
            get(handlers::mappings::get_subject_roles_handler),
        )
        .route(
            "/role-group/query",
            post(handlers::mappings::query_role_groups_handler),
        )
        .route(
            "/role-group/{role_id}",
            get(handlers::mappings::get_role_group_handler),
        )
        .route(
            "/role-type",
            post(handlers::mappings::insert_role_type_handler),
        )
        .route(
            "/role-type/query",
            post(handlers::mappings::query_role_types_handler),
        )
        .route(
            "/role-type/{role_type}",
            get(handlers::mappings::get_role_type_handler)
                .put(handlers::mappings::update_role_type_handler)
                .delete(handlers::mappings::delete_role_type_handler),
        )
        .route(
            "/group-constraints",
            post(handlers::mappings::insert_group_constraints_handler),
        )
        .route(
            "/group-constraints/query",
            post(handlers::mappings::query_group_constraints_handler),
        )
        .route(
            "/group-constraints/{group_id}",
            get(handlers::mappings::get_group_constraints_handler)
                .put(handlers::mappings::update_group_constraints_handler)
                .delete(handlers::mappings::delete_group_constraints_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let host = IpAddr::from_str(config.api_host.as_str()).map_err(|error| {
        AppError::Internal(format!("invalid API_HOST '{}': {error}", config.api_host))
    })?;
    let address = SocketAddr::from((host, config.api_port));

    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, org_id = %config.org_id, "rolegrid-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}

async fn build_stores(config: &ApiConfig) -> Result<EngineStores, AppError> {
    match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to connect to database: {error}"))
                })?;

            sqlx::migrate!("../../crates/infrastructure/migrations")
                .run(&pool)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to run migrations: {error}"))
                })?;

            info!("using postgres mapping stores");
            Ok(EngineStores::from_store(Arc::new(PostgresRoleStore::new(
                pool,
            ))))
        }
        None => {
            warn!("DATABASE_URL not set; using in-memory mapping stores");
            Ok(EngineStores::from_store(Arc::new(InMemoryRoleStore::new())))
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
