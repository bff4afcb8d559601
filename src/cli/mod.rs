use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::app::{app, AppState};
use crate::auth::Argon2Hasher;
use crate::config::AppConfig;
use crate::database::{MemoryStore, PgStore};

#[derive(Parser)]
#[command(name = "interview-qa-api")]
#[command(about = "Interview question sharing API server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Listen port (overrides PORT)")]
        port: Option<u16>,

        #[arg(long, value_enum, help = "Backing store (postgres when DATABASE_URL is set, else memory)")]
        store: Option<StoreKind>,
    },

    #[command(about = "Create database tables and indexes, then exit")]
    Migrate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// Process-local, lost on exit
    Memory,
    Postgres,
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let command = cli.command.unwrap_or(Commands::Serve { port: None, store: None });

    match command {
        Commands::Serve { port, store } => serve(config, port, store).await,
        Commands::Migrate => {
            let store = PgStore::connect(&config.database).await.context("failed to connect to database")?;
            store.ensure_schema().await.context("failed to apply schema")?;
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, port: Option<u16>, store: Option<StoreKind>) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;

    let store = store.unwrap_or(if config.database.url.is_some() {
        StoreKind::Postgres
    } else {
        StoreKind::Memory
    });

    let port = port.unwrap_or(config.server.port);
    let hasher = Arc::new(Argon2Hasher::default());

    let state = match store {
        StoreKind::Memory => {
            info!("Using in-memory store");
            AppState::new(Arc::new(MemoryStore::new()), hasher, config)
        }
        StoreKind::Postgres => {
            let pg = PgStore::connect(&config.database).await.context("failed to connect to database")?;
            pg.ensure_schema().await.context("failed to apply schema")?;
            AppState::new(Arc::new(pg), hasher, config)
        }
    };

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    info!("Interview Q&A API listening on http://{}", bind_addr);

    axum::serve(listener, app(state).into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("server error")?;
    Ok(())
}
