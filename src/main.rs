use clap::Parser;
use tracing_subscriber::EnvFilter;

use interview_qa_api::cli::{self, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET, etc. are picked up
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    // Initialize configuration (this loads the config singleton)
    let config = interview_qa_api::config::config();
    tracing::info!("Starting Interview Q&A API in {} mode", config.environment);

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli, config.clone()).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
