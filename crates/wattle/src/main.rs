//! Wattle server.
//!
//! Personal health records with a FHIR-shaped document store and AI analysis.

use clap::Parser;
use tracing::info;
use wattle_persistence::backends::memory::MemoryStore;
use wattle_rest::{ServerConfig, create_app_with_config, init_logging};

#[cfg(feature = "sqlite")]
use wattle_persistence::backends::sqlite::SqliteBackend;

/// Creates and initializes a SQLite backend from the database URL.
#[cfg(feature = "sqlite")]
fn create_sqlite_backend(db_path: &str) -> anyhow::Result<SqliteBackend> {
    info!(database = %db_path, "Initializing SQLite backend");

    let backend = if db_path == ":memory:" {
        SqliteBackend::in_memory()?
    } else {
        SqliteBackend::open(db_path)?
    };
    backend.init_schema()?;

    Ok(backend)
}

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        database = config.database_url.as_deref().unwrap_or("memory"),
        openai_base_url = %config.openai_base_url,
        "Starting Wattle server"
    );

    match config.database_url.clone() {
        None => start_memory(config).await,
        Some(db_path) => start_sqlite(&db_path, config).await,
    }
}

/// Starts the server with the in-process store.
async fn start_memory(config: ServerConfig) -> anyhow::Result<()> {
    info!("Using in-memory store; data is lost on exit");
    let app = create_app_with_config(MemoryStore::new(), config.clone())?;
    serve(app, &config).await
}

/// Starts the server with the SQLite store.
#[cfg(feature = "sqlite")]
async fn start_sqlite(db_path: &str, config: ServerConfig) -> anyhow::Result<()> {
    let backend = create_sqlite_backend(db_path)?;
    let app = create_app_with_config(backend, config.clone())?;
    serve(app, &config).await
}

/// Fallback when sqlite feature is not enabled.
#[cfg(not(feature = "sqlite"))]
async fn start_sqlite(_db_path: &str, _config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "A database URL requires the 'sqlite' feature. \
         Build with: cargo build -p wattle --features sqlite"
    )
}
