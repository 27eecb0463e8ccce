//! # dtm-rs
//!
//! DTM web application backend core in Rust.
//!
//! Environment-driven settings and the `/users` authentication surface:
//! signup with storage-enforced uniqueness and password login minting
//! time-bounded bearer tokens.
//!
//! ## Architecture
//!
//! - **Settings**: typed env configuration, constructed once and injected
//! - **Users**: storage trait with Postgres (sqlx) and in-memory backends
//! - **Tokens**: HS256 bearer tokens with configurable expiry
//! - **HTTP**: Axum router with rate limiting, request IDs, CORS, and graceful shutdown

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

mod config;
mod http;
mod password;
mod store;
mod token;
mod users;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use axum::serve;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::http::{router, AppState};
use crate::store::{MemoryUserStore, PgUserStore};
use crate::users::UserStore;

#[derive(Debug, Parser)]
#[command(
    name = "dtm-rs",
    version,
    about = "DTM backend: settings loader and user authentication API"
)]
struct Cli {
    #[arg(long, value_name = "ADDR", default_value = "0.0.0.0:8000")]
    bind: SocketAddr,

    /// Load environment variables from this dotenv file before reading
    /// settings (defaults to a `.env` in the working directory, if any).
    #[arg(long, value_name = "FILE")]
    env_file: Option<PathBuf>,

    /// Run against the in-memory user store instead of Postgres.
    #[arg(long)]
    memory_store: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(path) = &cli.env_file {
        dotenvy::from_path(path)
            .with_context(|| format!("failed to load env file {}", path.display()))?;
    } else {
        let _ = dotenvy::dotenv();
    }

    init_logging().context("failed to initialize logging")?;

    let settings = Settings::shared().context("failed to load configuration")?;
    info!(
        app = %settings.app_name,
        bind = %cli.bind,
        api_prefix = %settings.api_prefix,
        cors_origins = settings.extra_cors_origins.len(),
        token_expire_minutes = settings.access_token_expire_minutes,
        postgres_host = %settings.postgres_host,
        memory_store = cli.memory_store,
        "configuration loaded"
    );

    let users: Arc<dyn UserStore> = if cli.memory_store {
        info!("using in-memory user store; data is lost on restart");
        Arc::new(MemoryUserStore::new())
    } else {
        let store = PgUserStore::connect(&settings.db_url)
            .await
            .context("failed to connect to database")?;
        info!(host = %settings.postgres_host, db = %settings.postgres_db, "database ready");
        Arc::new(store)
    };

    let state = AppState::new(Arc::clone(&settings), users);
    let app = router(state);
    let listener = TcpListener::bind(cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;

    let shutdown = tokio::signal::ctrl_c();
    info!(bind = %cli.bind, app = %settings.app_name, "dtm-rs listening");

    serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = shutdown.await;
            info!("shutting down gracefully");
        })
        .await
        .context("server exited with error")
}

/// Initialize the tracing subscriber. `RUST_LOG` wins; otherwise the
/// `LOG_LEVEL` setting applies, defaulting to `info`.
fn init_logging() -> anyhow::Result<()> {
    let directives = std::env::var("RUST_LOG")
        .or_else(|_| std::env::var("LOG_LEVEL").map(|level| level.to_ascii_lowercase()))
        .unwrap_or_else(|_| String::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(directives))
        .with_target(false)
        .compact()
        .init();

    Ok(())
}
