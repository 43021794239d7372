//! X account monitor — binary entrypoint.
//! Scans a watchlist through fallback scrapers, dedups against persisted
//! state, summarizes what's new and posts the digest to Telegram.
//!
//! See `README.md` for quickstart and configuration.

use std::time::Duration;

use clap::Parser;

use x_monitor::analyze::cerebras::CerebrasClient;
use x_monitor::fetch::sources::default_sources;
use x_monitor::notify::telegram::TelegramNotifier;
use x_monitor::{MonitorConfig, Scanner, StateStore};

#[derive(Parser, Debug)]
#[command(name = "x-monitor", about = "Watch X accounts and post digests to Telegram")]
struct Cli {
    /// Run a single scan and exit instead of looping.
    #[arg(long)]
    once: bool,

    /// Seconds between scans in loop mode.
    #[arg(long, default_value_t = 3600)]
    interval: u64,

    /// Summarize the full fetch even when nothing new was found.
    #[arg(long)]
    force: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = MonitorConfig::load();
    tracing::info!(
        accounts = config.accounts.len(),
        state = %config.state_path.display(),
        "starting x-monitor"
    );

    let store = StateStore::new(config.state_path.clone());
    let sources = default_sources(&config);
    let scanner = Scanner::new(
        config,
        sources,
        Box::new(CerebrasClient::from_env()),
        Box::new(TelegramNotifier::from_env()),
        store,
    );

    if cli.once {
        let report = scanner.run_scan(cli.force).await?;
        tracing::info!(outcome = ?report.outcome, "single scan done");
        return Ok(());
    }

    loop {
        match scanner.run_scan(cli.force).await {
            Ok(report) => {
                tracing::info!(outcome = ?report.outcome, fetched = report.fetched, "scan cycle done")
            }
            Err(e) => tracing::error!(error = ?e, "scan cycle failed"),
        }
        tracing::info!(seconds = cli.interval, "sleeping until next scan");
        tokio::time::sleep(Duration::from_secs(cli.interval)).await;
    }
}
