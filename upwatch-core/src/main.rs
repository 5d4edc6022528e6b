use std::sync::Arc;

use upwatch_core::{Checker, Config, ConfiguredMentions, HttpSnapshotFetcher, LogNotifier};
use upwatch_store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing for structured logging
    #[cfg(debug_assertions)]
    let log_level = tracing::Level::DEBUG;
    #[cfg(not(debug_assertions))]
    let log_level = tracing::Level::INFO;

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();
    tracing::info!("Starting upwatch checker...");

    let config = Config::from_env();
    tracing::info!(
        "Configuration: url={}, interval={}s, fetch_timeout={}s, data_dir={}",
        config.listing_url,
        config.poll_interval.as_secs(),
        config.fetch_timeout.as_secs(),
        config.data_dir
    );

    let store = Store::open(&config.data_dir).await?;
    let fetcher = Arc::new(HttpSnapshotFetcher::new(&config)?);
    let checker =
        Checker::new(store, fetcher, Arc::new(LogNotifier), Arc::new(ConfiguredMentions)).await?;

    checker.start(config.poll_interval);

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");
    checker.stop().await;
    Ok(())
}
