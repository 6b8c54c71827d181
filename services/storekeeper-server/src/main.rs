//! Storekeeper API Server
//!
//! REST API server for the store-management backend.
//!
//! # Usage
//!
//! ```bash
//! # Start with default settings (PostgreSQL store)
//! storekeeper-server
//!
//! # Start with custom config
//! storekeeper-server --config /path/to/config.toml
//!
//! # Development run without PostgreSQL
//! storekeeper-server --memory-store
//!
//! # Environment overrides
//! STOREKEEPER__SERVER__PORT=3000 storekeeper-server
//! ```

mod config;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storekeeper_api::{create_router, ApiConfig, AppState};
use storekeeper_auth::{AuthConfig, AuthService};
use storekeeper_db::{
    MemoryUserStore, NewUser, PgUserStore, Role, StoreConfig as DbStoreConfig, UserStore,
};

use crate::config::{ServerConfig, StoreBackend};

/// Storekeeper API Server
#[derive(Parser, Debug)]
#[command(name = "storekeeper-server")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "STOREKEEPER_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "STOREKEEPER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "STOREKEEPER_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "STOREKEEPER_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Log format (json, pretty)
    #[arg(long, env = "STOREKEEPER_LOG_FORMAT", default_value = "pretty")]
    log_format: String,

    /// PostgreSQL connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// JWT secret key
    #[arg(long, env = "JWT_SECRET")]
    jwt_secret: Option<String>,

    /// Use the in-memory store instead of PostgreSQL
    #[arg(long, env = "STOREKEEPER_MEMORY_STORE")]
    memory_store: bool,

    /// Enable development mode (relaxed security checks)
    #[arg(long, env = "STOREKEEPER_DEV_MODE")]
    dev_mode: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut server_config = ServerConfig::load(args.config.as_deref())?;

    // CLI overrides
    if let Some(host) = args.host {
        server_config.server.host = host;
    }
    if let Some(port) = args.port {
        server_config.server.port = port;
    }
    if let Some(db_url) = args.database_url {
        server_config.store.postgres_url = db_url;
    }
    if args.memory_store {
        server_config.store.backend = StoreBackend::Memory;
    }
    server_config.logging.level = args.log_level;
    server_config.logging.format = args.log_format;

    init_logging(&server_config.logging)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting Storekeeper API Server"
    );

    // Authentication service
    let auth_config = build_auth_config(&server_config, args.jwt_secret);

    validate_config(&server_config, &auth_config, args.dev_mode)?;

    auth_config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid auth configuration: {}", e))?;
    let auth = Arc::new(AuthService::new(auth_config));

    // Credential store
    let store = init_store(&server_config).await?;

    // Optional admin bootstrap
    bootstrap_admin(&server_config, store.as_ref(), &auth).await?;

    let state = Arc::new(AppState::new(store, auth));

    let api_config = ApiConfig {
        enable_cors: server_config.api.enable_cors,
        cors_origins: server_config.api.cors_origins.clone(),
        enable_compression: server_config.api.enable_compression,
        enable_tracing: server_config.api.enable_tracing,
    };

    let app = create_router(state, api_config);

    let addr = server_config.server.socket_addr()?;

    tracing::info!(
        host = %server_config.server.host,
        port = %server_config.server.port,
        "Server listening"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(server_config.server.shutdown_timeout()))
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

/// Initialize tracing/logging
fn init_logging(config: &config::LoggingConfig) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => {
            subscriber.with(fmt::layer().json().with_target(true)).init();
        }
        _ => {
            subscriber
                .with(fmt::layer().pretty().with_target(true))
                .init();
        }
    }

    Ok(())
}

/// Validate configuration
fn validate_config(
    config: &ServerConfig,
    auth: &AuthConfig,
    dev_mode: bool,
) -> anyhow::Result<()> {
    if !dev_mode && auth.jwt.secret == "change-me-in-production" {
        anyhow::bail!(
            "JWT secret must be changed in production. Set JWT_SECRET environment variable."
        );
    }

    if !dev_mode && config.store.backend == StoreBackend::Memory {
        tracing::warn!("In-memory store selected; all users are lost on restart");
    }

    if config.auth.bootstrap_admin_email.is_some() != config.auth.bootstrap_admin_password.is_some()
    {
        anyhow::bail!("Bootstrap admin requires both email and password");
    }

    Ok(())
}

/// Map the server auth settings onto the auth crate's config.
///
/// Layering, weakest first: config file and `STOREKEEPER__` variables
/// (already merged into `config`), dedicated environment overrides, then
/// the CLI flag.
fn build_auth_config(config: &ServerConfig, cli_jwt_secret: Option<String>) -> AuthConfig {
    let mut auth_config = AuthConfig::default();
    auth_config.jwt.secret = config.auth.jwt_secret.clone();
    auth_config.jwt.expiration_days = config.auth.expiration_days;
    auth_config.jwt.cookie_name = config.auth.cookie_name.clone();

    let mut auth_config = auth_config.from_env();
    if let Some(secret) = cli_jwt_secret {
        auth_config.jwt.secret = secret;
    }
    auth_config
}

/// Connect the configured credential store
async fn init_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory user store");
            Ok(Arc::new(MemoryUserStore::new()))
        }
        StoreBackend::Postgres => {
            let store_config = DbStoreConfig {
                postgres_url: config.store.postgres_url.clone(),
                max_connections: config.store.max_connections,
                min_connections: config.store.min_connections,
                acquire_timeout_secs: config.store.acquire_timeout_secs,
            };

            let store = PgUserStore::connect(&store_config).await?;

            if config.store.run_migrations {
                store.migrate().await?;
            }

            store.ping().await?;
            tracing::info!("User store ready");

            Ok(Arc::new(store))
        }
    }
}

/// Create the configured admin account if it does not exist yet
async fn bootstrap_admin(
    config: &ServerConfig,
    store: &dyn UserStore,
    auth: &AuthService,
) -> anyhow::Result<()> {
    let (Some(email), Some(password)) = (
        config.auth.bootstrap_admin_email.as_deref(),
        config.auth.bootstrap_admin_password.as_deref(),
    ) else {
        return Ok(());
    };

    if store.exists_by_email(email).await? {
        tracing::debug!(email = %email, "Bootstrap admin already present");
        return Ok(());
    }

    let password_hash = auth
        .password
        .hash_password(password)
        .map_err(|e| anyhow::anyhow!("Bootstrap admin password rejected: {}", e))?;

    store.ensure_role(Role::User).await?;
    store.ensure_role(Role::Admin).await?;

    let admin = store
        .create(NewUser {
            email: email.to_string(),
            password_hash,
            first_name: "Store".to_string(),
            last_name: "Admin".to_string(),
            gender: storekeeper_db::Gender::Other,
            birth_date: NaiveDate::from_ymd_opt(1970, 1, 1)
                .ok_or_else(|| anyhow::anyhow!("Invalid bootstrap birth date"))?,
            enabled: true,
            roles: HashSet::from([Role::User, Role::Admin]),
        })
        .await?;

    tracing::info!(user_id = %admin.id, email = %email, "Bootstrap admin created");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    tracing::info!(
        timeout_secs = timeout.as_secs(),
        "Waiting for in-flight requests to complete..."
    );

    tokio::time::sleep(timeout).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from(["storekeeper-server", "--port", "3000", "--memory-store"]);
        assert_eq!(args.port, Some(3000));
        assert!(args.memory_store);
    }

    #[test]
    fn test_bootstrap_requires_both_fields() {
        let mut config = ServerConfig::default();
        config.auth.bootstrap_admin_email = Some("root@example.com".to_string());
        assert!(validate_config(&config, &AuthConfig::default(), true).is_err());
    }

    #[test]
    fn test_cli_jwt_secret_wins_over_env() {
        std::env::set_var("STOREKEEPER_JWT_SECRET", "secret-from-environment-variable!");
        let config = ServerConfig::default();

        let from_env = build_auth_config(&config, None);
        assert_eq!(from_env.jwt.secret, "secret-from-environment-variable!");

        let from_cli = build_auth_config(&config, Some("secret-from-cli-flag!".to_string()));
        assert_eq!(from_cli.jwt.secret, "secret-from-cli-flag!");

        std::env::remove_var("STOREKEEPER_JWT_SECRET");
    }
}
