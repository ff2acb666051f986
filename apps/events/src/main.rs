//! Stratus audit event operator tool.

#![forbid(unsafe_code)]

mod dto;
mod events_config;

use std::io::Write;
use std::sync::Arc;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use stratus_application::AuditEventQueryService;
use stratus_core::{AppError, AppResult};
use stratus_infrastructure::PostgresAuditEventRepository;
use tracing::info;

use crate::dto::AuditEventResponse;
use crate::events_config::{EventsCommand, EventsConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = EventsConfig::load()?;
    let pool = connect_and_migrate(&config).await?;

    if config.command == EventsCommand::Migrate {
        info!("migrations applied");
        return Ok(());
    }

    let service = AuditEventQueryService::new(Arc::new(PostgresAuditEventRepository::new(pool)));
    let events = service.list_events(config.query.clone()).await?;

    info!(
        count = events.len(),
        type_prefix = config.query.type_prefix.as_deref().unwrap_or("*"),
        "listed audit events"
    );

    let mut stdout = std::io::stdout().lock();
    for event in events {
        let line = serde_json::to_string(&AuditEventResponse::from(event)).map_err(|error| {
            AppError::Internal(format!("failed to encode audit event: {error}"))
        })?;
        writeln!(stdout, "{line}")
            .map_err(|error| AppError::Internal(format!("failed to write output: {error}")))?;
    }

    Ok(())
}

async fn connect_and_migrate(config: &EventsConfig) -> AppResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    sqlx::migrate!("../../crates/infrastructure/migrations")
        .run(&pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;

    Ok(pool)
}
