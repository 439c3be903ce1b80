//! Start the Warden server.

use std::sync::Arc;

use clap::Args;

use warden_api::{AppState, run_server};
use warden_core::error::AppError;
use warden_database::{MemoryStore, PgStore};

use crate::output;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Do not run migrations and permission seeding on startup
    #[arg(long)]
    pub skip_migrations: bool,

    /// Serve from an in-memory store seeded with the demo accounts
    #[arg(long)]
    pub memory: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, env: &str) -> Result<(), AppError> {
    let mut config = super::load_config(env)?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }

    println!("Starting Warden server...");
    output::print_kv("Host", &config.server.host);
    output::print_kv("Port", &config.server.port.to_string());
    output::print_kv("Environment", &config.app.environment.to_string());

    if args.memory {
        output::print_warning("Serving from memory; all data is lost on exit.");
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store.clone());
        super::seed::seed_demo_users(store.as_ref(), state.tokens.hasher()).await?;
        return run_server(state).await;
    }

    let pool = super::connect(&config).await?;
    if !args.skip_migrations {
        println!("Running database migrations...");
        warden_database::migration::run_migrations(pool.pool()).await?;
        warden_database::seed::seed_permissions(pool.pool()).await?;
        output::print_success("Migrations applied.");
    }

    let state = AppState::new(config, Arc::new(PgStore::new(pool.into_pool())));
    run_server(state).await
}
