//! Tournament registration server.
//!
//! Serves the registry over a JSON HTTP API backed by a single SQLite database.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Error};
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use tokio::sync::watch;
use tourney::{AuthManager, CredentialHasher, Database, RegistryStore, SqliteRegistry};
use tourney_server::{api, config::ServerConfig, logging};

const HELP: &str = "\
Run the tournament registration server

USAGE:
  tourney_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:6969]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or sqlite://tourney.db]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL             SQLite connection string
  JWT_SECRET               JWT signing secret (required, 32+ chars)
  PASSWORD_PEPPER          Password hashing pepper (required, 16+ chars)
  ARGON2_MEMORY_KIB        Argon2id memory cost
  ARGON2_ITERATIONS        Argon2id iterations
  ARGON2_PARALLELISM       Argon2id lanes
  ACCESS_TOKEN_MINUTES     Access token lifetime
  REFRESH_TOKEN_DAYS       Refresh token lifetime
  RUST_LOG                 Log filter (default: info,sqlx=warn,hyper=warn)
  (See .env file for all configuration options)
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let bind: Option<SocketAddr> = pargs.opt_value_from_str("--bind")?;
    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;

    logging::init();

    let config = ServerConfig::from_env(bind, database_url)?;

    // Catching SIGINT/SIGTERM for graceful shutdown.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    set_handler(move || {
        let _ = shutdown_tx.send(true);
    })?;

    info!("Connecting to database: {}", config.database.database_url);
    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Database ready");

    let hasher = CredentialHasher::with_params(
        config.security.password_pepper.clone(),
        config.hashing.memory_kib,
        config.hashing.iterations,
        config.hashing.parallelism,
    )?;
    let registry: Arc<dyn RegistryStore> =
        Arc::new(SqliteRegistry::new(db.pool().clone(), hasher));

    let auth_manager = Arc::new(
        AuthManager::new(
            registry.clone(),
            db.pool().clone(),
            config.security.jwt_secret.clone(),
        )
        .with_token_durations(
            config.sessions.access_token_duration(),
            config.sessions.refresh_token_duration(),
        ),
    );

    let purged = auth_manager.purge_expired_sessions().await?;
    if purged > 0 {
        info!("Removed {} expired session(s) at startup", purged);
    }

    let state = api::AppState {
        auth_manager,
        registry,
        pool: db.pool().clone(),
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Resolves once the signal handler has fired
async fn shutdown_signal(mut rx: watch::Receiver<bool>) {
    // A closed channel also means shutdown.
    let _ = rx.wait_for(|stop| *stop).await;
}
