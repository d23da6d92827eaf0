//! QCall admin panel server.
//!
//! Serves the login and dashboard pages and the session-gated stats API on
//! top of the spam-reporting MongoDB database.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Error};
use pico_args::Arguments;
use qcall_admin::{
    AuthManager, SessionStore, StatsService,
    db::{Database, MongoRepository},
};
use qa_server::{api, config::ServerConfig, logging};
use tracing::info;

const HELP: &str = "\
Run the QCall admin panel

USAGE:
  qa_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8000]
  --db-uri     URI         MongoDB connection string   [default: env DB_URI]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  DB_URI                   MongoDB connection string (required)
  DB_NAME                  Database name [default: qcall_db]
  JWT_SECRET               JWT signing secret, at least 16 characters (required)
  APP_URL                  Public base URL, token issuer [default: http://localhost:8000]
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8000)
  SESSION_TTL_SECS         Session lifetime [default: 86400]
  DB_CONNECT_TIMEOUT_SECS  Connect timeout [default: 10]
  (A .env file in the working directory is loaded first)
";

/// How often expired sessions are swept
const SESSION_PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

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

    let bind_override: Option<SocketAddr> = pargs
        .opt_value_from_str("--bind")
        .context("Invalid --bind address")?;
    let db_uri_override: Option<String> = pargs
        .opt_value_from_str("--db-uri")
        .context("Invalid --db-uri")?;

    logging::init();

    let config = ServerConfig::from_env(bind_override, db_uri_override)?;
    info!("Starting QCall admin panel at {}", config.bind);

    info!(database = %config.database.database_name, "Connecting to MongoDB");
    let db = Database::connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected successfully");

    let repository = Arc::new(MongoRepository::new(&db));
    let auth_manager = Arc::new(AuthManager::new(
        repository.clone(),
        config.security.jwt_secret.clone(),
        config.security.app_url.clone(),
    ));
    let stats_service = Arc::new(StatsService::new(repository.clone(), repository));
    let sessions = Arc::new(SessionStore::new(config.session_ttl_secs));

    tokio::spawn(purge_sessions(sessions.clone()));

    let state = api::AppState::new(
        auth_manager,
        stats_service,
        sessions,
        config.security.app_url.clone(),
    );
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutting down server...");
    db.shutdown().await;

    Ok(())
}

/// Periodically drop expired session entries
async fn purge_sessions(sessions: Arc<SessionStore>) {
    let mut interval = tokio::time::interval(SESSION_PURGE_INTERVAL);
    loop {
        interval.tick().await;
        let removed = sessions.purge_expired().await;
        if removed > 0 {
            tracing::debug!(removed, "Purged expired sessions");
        }
    }
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
