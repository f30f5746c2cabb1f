//! League tournament server.
//!
//! Connects to PostgreSQL, applies the schema and serves the HTTP API.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use league_engine::{
    League,
    auth::TokenVerifier,
    db::{Database, PgLeagueStore, schema},
};
use league_server::{
    api::{self, AppState},
    config::ServerConfig,
    logging, metrics,
};
use log::info;
use pico_args::Arguments;

const HELP: &str = "\
Run the league tournament server

USAGE:
  league_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL or postgres://postgres@localhost/league_db]

FLAGS:
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND                   Server bind address (e.g., 0.0.0.0:8080)
  DATABASE_URL                  PostgreSQL connection string
  JWT_SECRET                    JWT signing secret (required, 32+ characters)
  METRICS_BIND                  Prometheus exporter address (optional)
  DEFAULT_TOURNAMENT_CAPACITY   Capacity when a create request omits one [default: 16]
  DB_MAX_CONNECTIONS, DB_MIN_CONNECTIONS, DB_CONNECTION_TIMEOUT_SECS,
  DB_IDLE_TIMEOUT_SECS, DB_MAX_LIFETIME_SECS   Pool tuning
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
}

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

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url)?;
    info!("Starting league server at {}", config.bind);

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(|e| anyhow::anyhow!(e))?;
        info!("Prometheus metrics available at http://{}/metrics", metrics_bind);
    }

    let db = Database::new(&config.database)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
    schema::migrate(db.pool())
        .await
        .map_err(|e| anyhow::anyhow!("Failed to apply schema: {}", e))?;
    info!("Database connected successfully");

    let store = PgLeagueStore::new(Arc::new(db.pool().clone()));
    let state = AppState {
        league: League::new(Arc::new(store)),
        tokens: Arc::new(TokenVerifier::new(&config.security.jwt_secret)),
        default_capacity: config.default_capacity,
    };

    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", config.bind, e))?;

    info!(
        "Server is running at http://{}. Press Ctrl+C to stop.",
        config.bind
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("Shutting down server...");
    db.close().await;

    Ok(())
}

/// Graceful shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for CTRL+C: {}", e);
    }
}
