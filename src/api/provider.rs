use async_trait::async_trait;
use serde_json::Value;

use crate::api::client::ApiError;
use crate::models::{LiveMatch, MatchEvent};

/// Trait over the remote live-score API.
///
/// The stores and the push manager depend on this seam instead of a concrete
/// HTTP client so tests can swap in scripted implementations.
#[async_trait]
pub trait LiveApi: Send + Sync {
    /// `GET /Live` — snapshot of all current matches.
    async fn fetch_live_matches(&self) -> Result<Vec<LiveMatch>, ApiError>;

    /// `GET /Leagues/{league_id}/Matches/{match_id}/Events` — full event
    /// timeline for one match.
    async fn fetch_match_events(
        &self,
        league_id: i64,
        match_id: i64,
    ) -> Result<Vec<MatchEvent>, ApiError>;

    /// `POST /User/SetPushSubscription` — register a newly created push
    /// subscription (its platform JSON form) with the server.
    async fn set_push_subscription(&self, subscription: &Value) -> Result<(), ApiError>;
}
