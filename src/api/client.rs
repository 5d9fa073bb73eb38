use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use super::provider::LiveApi;
use crate::models::{LiveMatch, MatchEvent};

/// Failure surfaced by the HTTP client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("API error {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Network failure, or the response body was not the expected JSON.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// reqwest-backed client for the Dolphia live API.
///
/// Sends `Content-Type: application/json` on every request and a bearer
/// `Authorization` header (empty value when no token is configured — the
/// token is opaque pass-through, not validated here). No request timeout is
/// set: a hung request simply leaves the caller's loading flag up.
#[derive(Clone)]
pub struct HttpApi {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        HttpApi {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn authorization(&self) -> String {
        match self.token.as_deref() {
            Some(t) if !t.is_empty() => format!("Bearer {t}"),
            _ => String::new(),
        }
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("Content-Type", "application/json")
            .header("Authorization", self.authorization())
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {}", url);

        let resp = self.request(self.http.get(&url)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(resp.json().await?)
    }
}

#[async_trait]
impl LiveApi for HttpApi {
    async fn fetch_live_matches(&self) -> Result<Vec<LiveMatch>, ApiError> {
        self.get_json("/Live").await
    }

    async fn fetch_match_events(
        &self,
        league_id: i64,
        match_id: i64,
    ) -> Result<Vec<MatchEvent>, ApiError> {
        self.get_json(&format!("/Leagues/{league_id}/Matches/{match_id}/Events"))
            .await
    }

    async fn set_push_subscription(&self, subscription: &Value) -> Result<(), ApiError> {
        let url = format!("{}/User/SetPushSubscription", self.base_url);
        debug!("POST {}", url);

        let body = serde_json::json!({ "subscription": subscription });
        let resp = self
            .request(self.http.post(&url))
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }
        Ok(())
    }
}
