use clap::Parser;

/// Dolphia headless live-score watcher
#[derive(Parser, Debug, Clone)]
#[command(name = "dolphia-live", version, about)]
pub struct Config {
    /// Live API base URL
    #[arg(long, env = "API_BASE_URL", default_value = "https://api.dolphia.app")]
    pub api_base_url: String,

    /// Bearer token for the live API (passed through opaquely; empty header when unset)
    #[arg(long, env = "API_TOKEN")]
    pub api_token: Option<String>,

    /// Match list polling interval in seconds
    #[arg(long, env = "MATCHES_POLL_SECS", default_value = "30")]
    pub matches_poll_secs: u64,

    /// Match detail / event feed polling interval in seconds
    #[arg(long, env = "EVENTS_POLL_SECS", default_value = "15")]
    pub events_poll_secs: u64,

    /// Follow a single match in detail mode instead of the full live list
    #[arg(long, env = "MATCH_ID")]
    pub match_id: Option<i64>,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_base_url.trim().is_empty() {
            anyhow::bail!("api_base_url must not be empty");
        }
        if self.matches_poll_secs == 0 {
            anyhow::bail!("matches_poll_secs must be positive");
        }
        if self.events_poll_secs == 0 {
            anyhow::bail!("events_poll_secs must be positive");
        }
        Ok(())
    }
}
