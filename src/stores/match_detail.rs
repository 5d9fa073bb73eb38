//! Match detail store.
//!
//! There is no single-match endpoint: the detail view fetches the full
//! `/Live` list and picks its match out client-side. Events are fetched
//! second because the event feed is addressed by league id, which is only
//! known once the match lookup resolved.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::api::LiveApi;
use crate::models::{LiveMatch, MatchEvent};

/// Default interval between combined match+events polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Default)]
struct DetailState {
    current: Option<LiveMatch>,
    events: Vec<MatchEvent>,
    loading_match: bool,
    loading_events: bool,
}

/// Thread-safe, cloneable store backing a single match's detail view.
#[derive(Clone)]
pub struct MatchDetailStore {
    api: Arc<dyn LiveApi>,
    state: Arc<RwLock<DetailState>>,
    poller: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl MatchDetailStore {
    pub fn new(api: Arc<dyn LiveApi>) -> Self {
        MatchDetailStore {
            api,
            state: Arc::new(RwLock::new(DetailState::default())),
            poller: Arc::new(Mutex::new(None)),
        }
    }

    /// Fetch the live list and locate `match_id` in it. A missing match or a
    /// transport failure both clear the stored match.
    pub async fn fetch_match(&self, match_id: i64) {
        self.state.write().await.loading_match = true;

        let found = match self.api.fetch_live_matches().await {
            Ok(matches) => {
                let found = matches.into_iter().find(|m| m.id == match_id);
                if found.is_none() {
                    warn!("Match {} not found in live feed", match_id);
                }
                found
            }
            Err(e) => {
                warn!("Failed to fetch match {}: {}", match_id, e);
                None
            }
        };

        let mut state = self.state.write().await;
        state.current = found;
        state.loading_match = false;
    }

    /// Fetch the event feed and replace the event list wholesale. Failures
    /// leave the current list untouched.
    pub async fn fetch_events(&self, league_id: i64, match_id: i64) {
        self.state.write().await.loading_events = true;

        match self.api.fetch_match_events(league_id, match_id).await {
            Ok(events) => {
                let mut state = self.state.write().await;
                state.events = events;
                state.loading_events = false;
            }
            Err(e) => {
                warn!("Failed to fetch match events: {}", e);
                self.state.write().await.loading_events = false;
            }
        }
    }

    /// Fetch the match first, then its events — and only if the match
    /// resolved, since the events endpoint needs the match's league id.
    pub async fn fetch_all(&self, match_id: i64) {
        self.fetch_match(match_id).await;

        let league_id = self
            .state
            .read()
            .await
            .current
            .as_ref()
            .map(|m| m.league_id);
        if let Some(league_id) = league_id {
            self.fetch_events(league_id, match_id).await;
        }
    }

    /// Fetch once immediately, then every `interval`. A poller already
    /// running is cancelled first.
    pub fn start_polling(&self, match_id: i64, interval: Duration) {
        self.stop_polling();
        let store = self.clone();
        let handle = super::spawn_poller(interval, move || {
            let store = store.clone();
            tokio::spawn(async move { store.fetch_all(match_id).await });
        });
        *self.poller.lock().unwrap() = Some(handle);
    }

    /// Stop polling. Idempotent; an in-flight fetch is not aborted.
    pub fn stop_polling(&self) {
        if let Some(handle) = self.poller.lock().unwrap().take() {
            handle.abort();
        }
    }

    /// Stop polling and reset to the initial empty state.
    pub async fn cleanup(&self) {
        self.stop_polling();
        let mut state = self.state.write().await;
        state.current = None;
        state.events.clear();
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub async fn current(&self) -> Option<LiveMatch> {
        self.state.read().await.current.clone()
    }

    pub async fn events(&self) -> Vec<MatchEvent> {
        self.state.read().await.events.clone()
    }

    pub async fn is_loading_match(&self) -> bool {
        self.state.read().await.loading_match
    }

    pub async fn is_loading_events(&self) -> bool {
        self.state.read().await.loading_events
    }
}
