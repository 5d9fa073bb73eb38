use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A match as returned by the `/Live` endpoint.
///
/// Scores and status change over the match lifecycle; identity, teams and
/// the scheduled start time are fixed once the match exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMatch {
    pub id: i64,
    pub team1_id: i64,
    pub team1_name: String,
    pub team1_flag: String,
    pub team1_score: i32,
    pub team2_id: i64,
    pub team2_name: String,
    pub team2_flag: String,
    pub team2_score: i32,
    pub league_id: i64,
    pub league_name: String,
    /// Scheduled kick-off, passed through as the server sends it.
    pub match_start_time: String,
    #[serde(default)]
    pub status: MatchStatus,
}

/// Lifecycle status of a match. Unrecognised server values map to `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Live,
    Upcoming,
    Ended,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A single timeline entry from the match event feed. Immutable once
/// received; the client always holds the latest full snapshot, never an
/// incrementally merged log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub id: i64,
    pub team_id: i64,
    pub team_name: String,
    pub player_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assist_name: Option<String>,
    /// Event tag, e.g. "Goal", "Card", "subst".
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Elapsed minute when the event occurred.
    pub elapsed: i32,
}

/// Per-match score pair kept from the previous poll, diffed against the next
/// payload to detect goals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreSnapshot {
    pub team1_score: i32,
    pub team2_score: i32,
}

impl ScoreSnapshot {
    pub fn of(m: &LiveMatch) -> Self {
        ScoreSnapshot {
            team1_score: m.team1_score,
            team2_score: m.team2_score,
        }
    }
}

/// Dedup token for a goal notification already shown: one per
/// (match, scoring team, resulting scoreline).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NotificationKey {
    pub match_id: i64,
    pub team_name: String,
    pub team1_score: i32,
    pub team2_score: i32,
}

impl NotificationKey {
    pub fn new(match_id: i64, team_name: &str, team1_score: i32, team2_score: i32) -> Self {
        NotificationKey {
            match_id,
            team_name: team_name.to_string(),
            team1_score,
            team2_score,
        }
    }
}

/// A goal detected by diffing two polls, kept so the view layer can render
/// an in-app feed of recent goals alongside the OS-level notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalAlert {
    pub match_id: i64,
    pub team_name: String,
    pub team1_score: i32,
    pub team2_score: i32,
    pub detected_at: DateTime<Utc>,
}
