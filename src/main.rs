//! Warden server entry point.
//!
//! Loads configuration, initializes logging, and dispatches the selected
//! subcommand. `serve` is the default.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use warden_core::config::{AppConfig, LoggingConfig};

mod commands;

use commands::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env = std::env::var("WARDEN_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("failed to load configuration")?;

    init_logging(&config.logging);
    tracing::info!(env = %env, version = env!("CARGO_PKG_VERSION"), "Starting Warden");

    if config.auth.uses_fallback_secret() {
        tracing::warn!(
            "auth.jwt_secret is the built-in fallback; set WARDEN__AUTH__JWT_SECRET before deploying"
        );
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => commands::serve(config).await,
        Command::Migrate => commands::migrate(config).await,
        Command::PurgeTokens => commands::purge_tokens(config).await,
        Command::CreateAdmin(args) => commands::create_admin(config, args).await,
    }
}

/// Initialize tracing. `RUST_LOG` overrides the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format.as_str() {
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
