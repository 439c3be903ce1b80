//! Warden server entry point.
//!
//! Loads configuration, connects to Postgres, applies migrations and the
//! permission seed, then serves the HTTP API until shutdown.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use warden_api::{AppState, run_server};
use warden_core::config::{AppConfig, LoggingConfig};
use warden_core::error::AppError;
use warden_database::{DatabasePool, PgStore};

#[tokio::main]
async fn main() {
    let env = std::env::var("WARDEN_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.app.environment,
        "Starting Warden"
    );

    let pool = DatabasePool::connect(&config.database).await?;

    tracing::info!("Running database migrations...");
    warden_database::migration::run_migrations(pool.pool()).await?;
    warden_database::seed::seed_permissions(pool.pool()).await?;

    let state = AppState::new(config, Arc::new(PgStore::new(pool.pool().clone())));
    run_server(state).await?;

    pool.close().await;
    tracing::info!("Warden shut down gracefully");
    Ok(())
}
