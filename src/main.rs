use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use dolphia_live::api::HttpApi;
use dolphia_live::config::Config;
use dolphia_live::notify::{LogNotifier, NotificationPermission};
use dolphia_live::stores::{LiveMatchesStore, MatchDetailStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let api = Arc::new(HttpApi::new(&config.api_base_url, config.api_token.clone()));
    info!("Watching live scores at {}", config.api_base_url);

    // The headless watcher always "grants" itself permission; goal
    // notifications surface as log lines.
    let notifier = Arc::new(LogNotifier::new(NotificationPermission::Granted));

    let live = LiveMatchesStore::new(api.clone(), notifier);
    live.start_matches_polling(Duration::from_secs(config.matches_poll_secs));

    let detail = config.match_id.map(|match_id| {
        info!("Following match {} in detail mode", match_id);
        let store = MatchDetailStore::new(api.clone());
        store.start_polling(match_id, Duration::from_secs(config.events_poll_secs));
        store
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    live.cleanup();
    if let Some(detail) = detail {
        detail.cleanup().await;
    }

    Ok(())
}
