use std::path::PathBuf;

use clap::Parser;
use pr_reviewer::config::AppConfig;
use pr_reviewer::services::{http_server, ReviewService};
use pr_reviewer::{db, logging};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "pr-reviewer", version, about = "Pull request reviewer assignment service")]
struct Cli {
    /// Path to a TOML config file (defaults to ./pr-reviewer.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = AppConfig::load_with_dotenv(cli.config.as_deref())?;
    logging::init()?;

    let pool = db::initialize(&config.database).await?;
    let service = ReviewService::new(pool.clone(), &config.review);

    let cancel_token = CancellationToken::new();
    let shutdown = cancel_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::info!("[main] Shutdown signal received");
                shutdown.cancel();
            }
            Err(e) => log::warn!("[main] Cannot listen for shutdown signal: {}", e),
        }
    });

    http_server::serve(&config.server, service, cancel_token).await?;

    pool.close().await;
    Ok(())
}
