use std::env;
use std::time::Duration;

use rolegrid_core::AppError;

/// Runtime configuration for the role engine API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub api_host: String,
    pub api_port: u16,
    pub database_url: Option<String>,
    pub redis_url: String,
    pub org_id: String,
    pub auction_api_url: String,
    pub workflows_api_url: String,
    pub association_api_url: String,
    pub subject_search_api_url: String,
    pub bid_result_timeout: Duration,
    pub subject_search_timeout: Duration,
    pub http_client_timeout: Duration,
}

impl ApiConfig {
    /// Loads configuration from the environment.
    pub fn load() -> Result<Self, AppError> {
        let migrate_only = env::args().nth(1).as_deref() == Some("migrate");

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = env::var("API_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(7100);

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let redis_url =
            env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_owned());
        let org_id = env::var("ORG_ID").unwrap_or_else(|_| "default_org".to_owned());

        let auction_api_url =
            env::var("AUCTION_API_URL").unwrap_or_else(|_| "http://localhost:7000".to_owned());
        let workflows_api_url =
            env::var("WORKFLOWS_API_URL").unwrap_or_else(|_| "http://localhost:8000".to_owned());
        let association_api_url =
            env::var("ASSOCIATION_API_URL").unwrap_or_else(|_| "http://localhost:8080".to_owned());
        let subject_search_api_url = env::var("SUBJECT_SEARCH_API_URL")
            .unwrap_or_else(|_| "http://localhost:9000".to_owned());

        let bid_result_timeout =
            Duration::from_secs(parse_env_u64("BID_RESULT_TIMEOUT_SECONDS", 30)?);
        let subject_search_timeout =
            Duration::from_secs(parse_env_u64("SUBJECT_SEARCH_TIMEOUT_SECONDS", 30)?);
        let http_client_timeout =
            Duration::from_secs(parse_env_u64("HTTP_CLIENT_TIMEOUT_SECONDS", 10)?);

        if migrate_only && database_url.is_none() {
            return Err(AppError::Validation(
                "DATABASE_URL is required to run migrations".to_owned(),
            ));
        }

        Ok(Self {
            migrate_only,
            api_host,
            api_port,
            database_url,
            redis_url,
            org_id,
            auction_api_url,
            workflows_api_url,
            association_api_url,
            subject_search_api_url,
            bid_result_timeout,
            subject_search_timeout,
            http_client_timeout,
        })
    }
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, AppError> {
    match env::var(name) {
        Ok(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
