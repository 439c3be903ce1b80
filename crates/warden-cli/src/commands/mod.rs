//! CLI command definitions and dispatch.

pub mod migrate;
pub mod seed;
pub mod serve;
pub mod user;

use clap::{Parser, Subcommand};

use warden_core::config::AppConfig;
use warden_core::error::AppError;
use warden_database::{DatabasePool, PgStore};

use crate::output::OutputFormat;

/// Warden authentication service
#[derive(Debug, Parser)]
#[command(name = "warden", version, about, long_about = None)]
pub struct Cli {
    /// Environment overlay to load (`config/{env}.toml`)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Seed permissions and, optionally, demo users
    Seed(seed::SeedArgs),
    /// User management
    User(user::UserArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.env).await,
            Commands::Migrate(args) => migrate::execute(args, &self.env).await,
            Commands::Seed(args) => seed::execute(args, &self.env).await,
            Commands::User(args) => user::execute(args, &self.env, self.format).await,
        }
    }
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(env)
}

/// Helper: connect to the configured database
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: a Postgres-backed store from configuration
pub async fn create_store(config: &AppConfig) -> Result<PgStore, AppError> {
    let pool = connect(config).await?;
    Ok(PgStore::new(pool.into_pool()))
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_user_create() {
        let cli = Cli::try_parse_from([
            "warden",
            "--format",
            "json",
            "user",
            "create",
            "ops@example.com",
            "ops",
            "--role",
            "admin",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.env, "development");
        assert!(matches!(cli.command, Commands::User(_)));
    }

    #[test]
    fn test_parses_memory_serve() {
        let cli = Cli::try_parse_from(["warden", "serve", "--memory", "--port", "9000"]).unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert!(args.memory);
        assert_eq!(args.port, Some(9000));
    }
}
