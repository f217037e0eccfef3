//! Command-line subcommands.

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use warden_api::{AppState, run_server};
use warden_auth::password::{PasswordHasher, PasswordValidator};
use warden_core::config::AppConfig;
use warden_database::connection::DatabasePool;
use warden_database::migration::run_migrations;
use warden_database::seed::seed_defaults;
use warden_database::store::Stores;
use warden_entity::user::CreateUser;

/// Warden authentication and authorization server.
#[derive(Debug, Parser)]
#[command(name = "warden-server", version, about)]
pub struct Cli {
    /// Subcommand; defaults to `serve`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Delete expired and revoked refresh tokens once and exit
    PurgeTokens,
    /// Create a user holding the `admin` role
    CreateAdmin(CreateAdminArgs),
}

/// Arguments for `create-admin`.
#[derive(Debug, Args)]
pub struct CreateAdminArgs {
    /// Username
    #[arg(long)]
    pub username: String,
    /// Email address
    #[arg(long)]
    pub email: String,
    /// Password; read from `WARDEN_ADMIN_PASSWORD` when omitted
    #[arg(long, env = "WARDEN_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: String,
}

/// Connects, migrates and seeds as configured, then returns the stores.
async fn prepare_stores(config: &AppConfig) -> anyhow::Result<Stores> {
    tracing::info!("Connecting to database...");
    let db = DatabasePool::connect(&config.database)
        .await
        .context("database connection failed")?;

    if config.database.run_migrations {
        tracing::info!("Running database migrations...");
        run_migrations(db.pool()).await.context("migration failed")?;
    }

    let stores = Stores::postgres(db.into_pool());

    if config.database.seed_defaults {
        seed_defaults(&stores)
            .await
            .context("seeding default roles and permissions failed")?;
    }

    Ok(stores)
}

/// `serve`
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let stores = prepare_stores(&config).await?;
    let state = AppState::new(config, stores);
    run_server(state).await.context("server error")?;
    Ok(())
}

/// `migrate`
pub async fn migrate(config: AppConfig) -> anyhow::Result<()> {
    let db = DatabasePool::connect(&config.database)
        .await
        .context("database connection failed")?;
    run_migrations(db.pool()).await.context("migration failed")?;
    tracing::info!("All migrations applied");
    db.close().await;
    Ok(())
}

/// `purge-tokens`
pub async fn purge_tokens(config: AppConfig) -> anyhow::Result<()> {
    let stores = prepare_stores(&config).await?;
    let state = AppState::new(config, stores);
    let purged = state
        .session_manager
        .store()
        .purge_expired()
        .await
        .context("purge failed")?;
    tracing::info!(purged, "Refresh tokens purged");
    Ok(())
}

/// `create-admin`
pub async fn create_admin(config: AppConfig, args: CreateAdminArgs) -> anyhow::Result<()> {
    PasswordValidator::new(&config.auth).validate(&args.password)?;

    let stores = prepare_stores(&config).await?;
    let Some(admin) = stores.roles.find_by_name("admin").await? else {
        bail!("the admin role does not exist; enable database.seed_defaults or create it first");
    };

    if stores
        .users
        .exists_by_username_or_email(&args.username, &args.email)
        .await?
    {
        bail!("username or email already exists");
    }

    let password_hash = PasswordHasher::new()
        .hash_password_blocking(args.password)
        .await?;
    let user = stores
        .users
        .create(CreateUser {
            username: args.username,
            email: args.email,
            password_hash,
            first_name: None,
            last_name: None,
        })
        .await?;
    stores.users.assign_role(user.id, admin.id, None).await?;

    tracing::info!(user_id = %user.id, username = %user.username, "Administrator created");
    Ok(())
}
