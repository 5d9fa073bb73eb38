//! Live match list store.
//!
//! Polls `/Live` on an interval, diffs every match's scoreline against the
//! snapshot kept from the previous poll and raises a local notification when
//! a team's score increased. Notifications are deduplicated by
//! (match, team, resulting scoreline) so a repeated payload never re-fires.
//!
//! Each store instance owns its own state and timers; construct one per view
//! lifetime and call [`LiveMatchesStore::cleanup`] on teardown.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::warn;

use chrono::Utc;

use crate::api::LiveApi;
use crate::models::{GoalAlert, LiveMatch, MatchEvent, NotificationKey, ScoreSnapshot};
use crate::notify::{NotificationPermission, Notifier};

/// Default interval between `/Live` polls.
pub const DEFAULT_MATCHES_INTERVAL: Duration = Duration::from_secs(30);
/// Default interval between event-feed polls.
pub const DEFAULT_EVENTS_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Default)]
struct LiveState {
    matches: Vec<LiveMatch>,
    selected_match: Option<LiveMatch>,
    events: Vec<MatchEvent>,
    loading_matches: bool,
    loading_events: bool,
    /// match id → scoreline seen on the previous successful poll.
    previous_scores: HashMap<i64, ScoreSnapshot>,
    /// Goal notifications already shown. Grows for the store lifetime;
    /// a store is scoped to one view visit, so the set stays small.
    notified_goals: HashSet<NotificationKey>,
    /// Every deduplicated goal, newest last, for the in-app feed.
    recent_goals: Vec<GoalAlert>,
}

/// Active tickers, at most one per stream.
#[derive(Default)]
struct Pollers {
    matches: Option<JoinHandle<()>>,
    events: Option<JoinHandle<()>>,
}

/// Thread-safe, cloneable store for the live match list view.
#[derive(Clone)]
pub struct LiveMatchesStore {
    api: Arc<dyn LiveApi>,
    notifier: Arc<dyn Notifier>,
    state: Arc<RwLock<LiveState>>,
    pollers: Arc<Mutex<Pollers>>,
}

impl LiveMatchesStore {
    pub fn new(api: Arc<dyn LiveApi>, notifier: Arc<dyn Notifier>) -> Self {
        LiveMatchesStore {
            api,
            notifier,
            state: Arc::new(RwLock::new(LiveState::default())),
            pollers: Arc::new(Mutex::new(Pollers::default())),
        }
    }

    // ── Fetching ─────────────────────────────────────────────────────────────

    /// Fetch the live match list. On success, goals are detected against the
    /// previous snapshot *before* it is rebuilt from the new payload. On
    /// failure the existing list and snapshot stay as they were.
    pub async fn fetch_matches(&self) {
        self.state.write().await.loading_matches = true;

        match self.api.fetch_live_matches().await {
            Ok(matches) => {
                self.detect_goals(&matches).await;

                let mut state = self.state.write().await;
                state.previous_scores = matches
                    .iter()
                    .map(|m| (m.id, ScoreSnapshot::of(m)))
                    .collect();
                state.matches = matches;
                state.loading_matches = false;
            }
            Err(e) => {
                warn!("Failed to fetch live matches: {}", e);
                self.state.write().await.loading_matches = false;
            }
        }
    }

    /// Fetch the event feed for one match and replace the event list
    /// wholesale. Failures leave the current list untouched.
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

    // ── Goal detection ───────────────────────────────────────────────────────

    /// Compare incoming matches against the previous snapshot and notify for
    /// the side whose score strictly increased. Only one side is reported per
    /// match per poll; a simultaneous increase on both sides reports team 1
    /// only. Matches seen for the first time never trigger.
    pub async fn detect_goals(&self, new_matches: &[LiveMatch]) {
        let mut scored: Vec<(LiveMatch, String, String)> = Vec::new();
        {
            let state = self.state.read().await;
            for m in new_matches {
                let Some(prev) = state.previous_scores.get(&m.id) else {
                    continue;
                };
                if m.team1_score > prev.team1_score {
                    scored.push((m.clone(), m.team1_name.clone(), m.team1_flag.clone()));
                } else if m.team2_score > prev.team2_score {
                    scored.push((m.clone(), m.team2_name.clone(), m.team2_flag.clone()));
                }
            }
        }

        for (m, team_name, flag) in scored {
            self.send_goal_notification(&m, &team_name, &flag).await;
        }
    }

    /// Show a goal notification unless one was already shown for this
    /// (match, team, scoreline). The dedup key is recorded before the
    /// permission gate, so a goal suppressed by a denied permission is never
    /// retried later.
    pub async fn send_goal_notification(&self, m: &LiveMatch, team_name: &str, flag: &str) {
        let key = NotificationKey::new(m.id, team_name, m.team1_score, m.team2_score);
        {
            let mut state = self.state.write().await;
            if !state.notified_goals.insert(key) {
                return;
            }
            state.recent_goals.push(GoalAlert {
                match_id: m.id,
                team_name: team_name.to_string(),
                team1_score: m.team1_score,
                team2_score: m.team2_score,
                detected_at: Utc::now(),
            });
        }

        if self.notifier.permission() != NotificationPermission::Granted {
            return;
        }

        let title = format!("Goal in {} vs {}", m.team1_name, m.team2_name);
        let body = format!("{} scored! {} - {}", team_name, m.team1_score, m.team2_score);
        if let Err(e) = self.notifier.show(&title, &body, flag) {
            warn!("Failed to show notification: {}", e);
        }
    }

    // ── Polling ──────────────────────────────────────────────────────────────

    /// Fetch once immediately, then every `interval`. A poller already
    /// running for this stream is cancelled first.
    pub fn start_matches_polling(&self, interval: Duration) {
        self.stop_matches_polling();
        let store = self.clone();
        let handle = super::spawn_poller(interval, move || {
            let store = store.clone();
            tokio::spawn(async move { store.fetch_matches().await });
        });
        self.pollers.lock().unwrap().matches = Some(handle);
    }

    /// Stop the match list poller. Idempotent; an in-flight fetch is not
    /// aborted.
    pub fn stop_matches_polling(&self) {
        if let Some(handle) = self.pollers.lock().unwrap().matches.take() {
            handle.abort();
        }
    }

    /// Same pattern as [`Self::start_matches_polling`], for the event feed of
    /// one league/match pair.
    pub fn start_events_polling(&self, league_id: i64, match_id: i64, interval: Duration) {
        self.stop_events_polling();
        let store = self.clone();
        let handle = super::spawn_poller(interval, move || {
            let store = store.clone();
            tokio::spawn(async move { store.fetch_events(league_id, match_id).await });
        });
        self.pollers.lock().unwrap().events = Some(handle);
    }

    pub fn stop_events_polling(&self) {
        if let Some(handle) = self.pollers.lock().unwrap().events.take() {
            handle.abort();
        }
    }

    /// Stop both polling streams. Call when the owning view unmounts.
    pub fn cleanup(&self) {
        self.stop_matches_polling();
        self.stop_events_polling();
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub async fn matches(&self) -> Vec<LiveMatch> {
        self.state.read().await.matches.clone()
    }

    pub async fn events(&self) -> Vec<MatchEvent> {
        self.state.read().await.events.clone()
    }

    pub async fn selected_match(&self) -> Option<LiveMatch> {
        self.state.read().await.selected_match.clone()
    }

    pub async fn set_selected_match(&self, m: Option<LiveMatch>) {
        self.state.write().await.selected_match = m;
    }

    pub async fn is_loading_matches(&self) -> bool {
        self.state.read().await.loading_matches
    }

    pub async fn is_loading_events(&self) -> bool {
        self.state.read().await.loading_events
    }

    pub async fn previous_score(&self, match_id: i64) -> Option<ScoreSnapshot> {
        self.state.read().await.previous_scores.get(&match_id).copied()
    }

    pub async fn recent_goals(&self) -> Vec<GoalAlert> {
        self.state.read().await.recent_goals.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// API mock fed with a script of per-call responses. Once the script is
    /// exhausted it keeps answering with an empty list.
    #[derive(Default)]
    struct ScriptedApi {
        matches: Mutex<VecDeque<Result<Vec<LiveMatch>, ApiError>>>,
        events: Mutex<VecDeque<Result<Vec<MatchEvent>, ApiError>>>,
        matches_calls: AtomicUsize,
        events_calls: AtomicUsize,
    }

    impl ScriptedApi {
        fn push_matches(&self, r: Result<Vec<LiveMatch>, ApiError>) {
            self.matches.lock().unwrap().push_back(r);
        }

        fn push_events(&self, r: Result<Vec<MatchEvent>, ApiError>) {
            self.events.lock().unwrap().push_back(r);
        }
    }

    #[async_trait]
    impl LiveApi for ScriptedApi {
        async fn fetch_live_matches(&self) -> Result<Vec<LiveMatch>, ApiError> {
            self.matches_calls.fetch_add(1, Ordering::SeqCst);
            self.matches
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(vec![]))
        }

        async fn fetch_match_events(
            &self,
            _league_id: i64,
            _match_id: i64,
        ) -> Result<Vec<MatchEvent>, ApiError> {
            self.events_calls.fetch_add(1, Ordering::SeqCst);
            self.events.lock().unwrap().pop_front().unwrap_or(Ok(vec![]))
        }

        async fn set_push_subscription(&self, _subscription: &Value) -> Result<(), ApiError> {
            Ok(())
        }
    }

    struct RecordingNotifier {
        permission: NotificationPermission,
        shown: Mutex<Vec<(String, String, String)>>,
    }

    impl RecordingNotifier {
        fn granted() -> Self {
            RecordingNotifier {
                permission: NotificationPermission::Granted,
                shown: Mutex::new(vec![]),
            }
        }

        fn denied() -> Self {
            RecordingNotifier {
                permission: NotificationPermission::Denied,
                shown: Mutex::new(vec![]),
            }
        }

        fn shown(&self) -> Vec<(String, String, String)> {
            self.shown.lock().unwrap().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn permission(&self) -> NotificationPermission {
            self.permission
        }

        fn show(&self, title: &str, body: &str, icon: &str) -> anyhow::Result<()> {
            self.shown
                .lock()
                .unwrap()
                .push((title.into(), body.into(), icon.into()));
            Ok(())
        }
    }

    fn make_match(id: i64, team1_score: i32, team2_score: i32) -> LiveMatch {
        LiveMatch {
            id,
            team1_id: id * 10,
            team1_name: "Brazil".into(),
            team1_flag: "/flags/br.png".into(),
            team1_score,
            team2_id: id * 10 + 1,
            team2_name: "Argentina".into(),
            team2_flag: "/flags/ar.png".into(),
            team2_score,
            league_id: 5,
            league_name: "World Cup".into(),
            match_start_time: "2026-07-01T18:00:00Z".into(),
            status: crate::models::MatchStatus::Live,
        }
    }

    fn server_error() -> ApiError {
        ApiError::Status {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "boom".into(),
        }
    }

    fn store_with(api: Arc<ScriptedApi>, notifier: Arc<RecordingNotifier>) -> LiveMatchesStore {
        LiveMatchesStore::new(api, notifier)
    }

    #[tokio::test]
    async fn test_previous_scores_replaced_not_merged() {
        let api = Arc::new(ScriptedApi::default());
        api.push_matches(Ok(vec![make_match(1, 0, 0), make_match(2, 1, 1)]));
        api.push_matches(Ok(vec![make_match(2, 1, 1)]));
        let store = store_with(api, Arc::new(RecordingNotifier::granted()));

        store.fetch_matches().await;
        assert!(store.previous_score(1).await.is_some());

        store.fetch_matches().await;
        // Match 1 dropped out of the payload, so its snapshot is gone too.
        assert!(store.previous_score(1).await.is_none());
        assert!(store.previous_score(2).await.is_some());
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_state_stale() {
        let api = Arc::new(ScriptedApi::default());
        api.push_matches(Ok(vec![make_match(1, 2, 0)]));
        api.push_matches(Err(server_error()));
        let store = store_with(api, Arc::new(RecordingNotifier::granted()));

        store.fetch_matches().await;
        store.fetch_matches().await;

        assert_eq!(store.matches().await.len(), 1);
        assert_eq!(
            store.previous_score(1).await,
            Some(ScoreSnapshot {
                team1_score: 2,
                team2_score: 0
            })
        );
        assert!(!store.is_loading_matches().await);
    }

    #[tokio::test]
    async fn test_first_seen_match_never_notifies() {
        let api = Arc::new(ScriptedApi::default());
        api.push_matches(Ok(vec![make_match(1, 3, 1)]));
        let notifier = Arc::new(RecordingNotifier::granted());
        let store = store_with(api, notifier.clone());

        store.fetch_matches().await;
        assert!(notifier.shown().is_empty());
    }

    #[tokio::test]
    async fn test_goal_notified_once_across_repeated_polls() {
        let api = Arc::new(ScriptedApi::default());
        api.push_matches(Ok(vec![make_match(1, 0, 0)]));
        api.push_matches(Ok(vec![make_match(1, 1, 0)]));
        api.push_matches(Ok(vec![make_match(1, 1, 0)]));
        let notifier = Arc::new(RecordingNotifier::granted());
        let store = store_with(api, notifier.clone());

        store.fetch_matches().await;
        store.fetch_matches().await;
        store.fetch_matches().await;

        let shown = notifier.shown();
        assert_eq!(shown.len(), 1);
        let (title, body, icon) = &shown[0];
        assert_eq!(title, "Goal in Brazil vs Argentina");
        assert!(body.contains("Brazil scored!"));
        assert!(body.contains("1 - 0"));
        assert_eq!(icon, "/flags/br.png");

        let goals = store.recent_goals().await;
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].team_name, "Brazil");
        assert_eq!((goals[0].team1_score, goals[0].team2_score), (1, 0));
    }

    #[tokio::test]
    async fn test_team2_goal_reported_for_team2() {
        let api = Arc::new(ScriptedApi::default());
        api.push_matches(Ok(vec![make_match(1, 0, 0)]));
        api.push_matches(Ok(vec![make_match(1, 0, 1)]));
        let notifier = Arc::new(RecordingNotifier::granted());
        let store = store_with(api, notifier.clone());

        store.fetch_matches().await;
        store.fetch_matches().await;

        let shown = notifier.shown();
        assert_eq!(shown.len(), 1);
        assert!(shown[0].1.contains("Argentina scored!"));
        assert!(shown[0].1.contains("0 - 1"));
    }

    #[tokio::test]
    async fn test_both_sides_increase_reports_team1_only() {
        let api = Arc::new(ScriptedApi::default());
        api.push_matches(Ok(vec![make_match(1, 0, 0)]));
        api.push_matches(Ok(vec![make_match(1, 1, 1)]));
        let notifier = Arc::new(RecordingNotifier::granted());
        let store = store_with(api, notifier.clone());

        store.fetch_matches().await;
        store.fetch_matches().await;

        let shown = notifier.shown();
        assert_eq!(shown.len(), 1);
        assert!(shown[0].1.contains("Brazil scored!"));
    }

    #[tokio::test]
    async fn test_send_goal_notification_dedups_by_key() {
        let api = Arc::new(ScriptedApi::default());
        let notifier = Arc::new(RecordingNotifier::granted());
        let store = store_with(api, notifier.clone());

        let m = make_match(1, 1, 0);
        store.send_goal_notification(&m, "Brazil", "/flags/br.png").await;
        store.send_goal_notification(&m, "Brazil", "/flags/br.png").await;

        assert_eq!(notifier.shown().len(), 1);
    }

    #[tokio::test]
    async fn test_denied_permission_suppresses_display_but_records_key() {
        let api = Arc::new(ScriptedApi::default());
        let notifier = Arc::new(RecordingNotifier::denied());
        let store = store_with(api, notifier.clone());

        let m = make_match(1, 1, 0);
        store.send_goal_notification(&m, "Brazil", "/flags/br.png").await;

        assert!(notifier.shown().is_empty());
        assert!(store
            .state
            .read()
            .await
            .notified_goals
            .contains(&NotificationKey::new(1, "Brazil", 1, 0)));
    }

    #[tokio::test]
    async fn test_fetch_events_replaces_wholesale() {
        let api = Arc::new(ScriptedApi::default());
        let ev = |id| MatchEvent {
            id,
            team_id: 10,
            team_name: "Brazil".into(),
            player_name: "Ronaldo".into(),
            assist_name: None,
            kind: "Goal".into(),
            detail: None,
            elapsed: 12,
        };
        api.push_events(Ok(vec![ev(1), ev(2)]));
        api.push_events(Ok(vec![ev(3)]));
        let store = store_with(api, Arc::new(RecordingNotifier::granted()));

        store.fetch_events(5, 1).await;
        assert_eq!(store.events().await.len(), 2);

        store.fetch_events(5, 1).await;
        let events = store.events().await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_fetches_immediately_then_repeats_until_stopped() {
        let api = Arc::new(ScriptedApi::default());
        let store = store_with(api.clone(), Arc::new(RecordingNotifier::granted()));

        store.start_matches_polling(Duration::from_secs(30));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(api.matches_calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(api.matches_calls.load(Ordering::SeqCst) >= 2);

        store.cleanup();
        store.cleanup(); // idempotent
        let after_stop = api.matches_calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(api.matches_calls.load(Ordering::SeqCst), after_stop);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarting_polling_keeps_a_single_ticker() {
        let api = Arc::new(ScriptedApi::default());
        let store = store_with(api.clone(), Arc::new(RecordingNotifier::granted()));

        store.start_matches_polling(Duration::from_secs(30));
        store.start_matches_polling(Duration::from_secs(30));
        tokio::time::sleep(Duration::from_millis(10)).await;

        // Only the second ticker's immediate fetch survives the restart.
        assert_eq!(api.matches_calls.load(Ordering::SeqCst), 1);
        store.cleanup();
    }
}
