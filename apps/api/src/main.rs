//! RegionGate API composition root.

#![forbid(unsafe_code)]

mod access_token;
mod api_config;
mod api_router;
mod dto;
mod error;
mod handlers;
mod middleware;
mod state;

use std::sync::Arc;

use chrono::{Duration, Utc};
use regiongate_application::{AccessEvaluator, GrantStoreService};
use regiongate_core::AppError;
use regiongate_infrastructure::{
    PostgresAuditLogRepository, PostgresAuditRepository, PostgresGrantRepository,
    PostgresUserRepository,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::access_token::AccessTokenCodec;
use crate::api_config::{ApiCommand, ApiConfig};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    api_config::init_tracing();

    let config = ApiConfig::load()?;
    let access_tokens = AccessTokenCodec::new(config.jwt_secret.as_str());

    if let ApiCommand::IssueToken {
        user_id,
        ttl_minutes,
    } = &config.command
    {
        let ttl = Duration::try_minutes(i64::try_from(*ttl_minutes).unwrap_or(i64::MAX))
            .ok_or_else(|| AppError::Validation("ttl-minutes is too large".to_owned()))?;
        let token = access_tokens.issue(*user_id, ttl, Utc::now())?;
        info!(user_id = %user_id, ttl_minutes, "access token issued");
        println!("{token}");
        return Ok(());
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    match &config.command {
        ApiCommand::Migrate => {
            info!("database migrations applied successfully");
            Ok(())
        }
        ApiCommand::CreateUser {
            display_name,
            role,
            email,
        } => {
            let identity = PostgresUserRepository::new(pool)
                .create_user(display_name.as_str(), email.as_deref(), *role)
                .await?;
            info!(
                user_id = %identity.user_id(),
                role = identity.role().as_str(),
                "user created"
            );
            println!("{}", identity.user_id());
            Ok(())
        }
        ApiCommand::Serve | ApiCommand::IssueToken { .. } => {
            serve(&config, pool, access_tokens).await
        }
    }
}

async fn serve(
    config: &ApiConfig,
    pool: PgPool,
    access_tokens: AccessTokenCodec,
) -> Result<(), AppError> {
    let grant_repository = Arc::new(PostgresGrantRepository::new(pool.clone()));
    let audit_repository = Arc::new(PostgresAuditRepository::new(pool.clone()));
    let audit_log_repository = Arc::new(PostgresAuditLogRepository::new(pool.clone()));
    let user_directory = Arc::new(PostgresUserRepository::new(pool));

    let grant_store_service =
        GrantStoreService::new(grant_repository, audit_repository.clone(), audit_log_repository);
    let access_evaluator = AccessEvaluator::new(grant_store_service.clone(), audit_repository);

    let app_state = AppState {
        grant_store_service,
        access_evaluator,
        user_directory,
        access_tokens,
    };
    let app = api_router::build_router(app_state, config.frontend_url.as_str())?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, "regiongate-api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("api server error: {error}")))
}
