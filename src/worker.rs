//! Service-worker notification handling.
//!
//! Two event handlers with no state of their own: `push` renders an incoming
//! payload as an OS notification, `notificationclick` routes the user back
//! into the app. The hosting environment supplies the action surface
//! ([`WorkerEnv`]) and must await each handler before suspending the worker
//! context, so notification display is never cut short.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// Defaults applied field-by-field when the push payload omits them or is
/// not valid JSON.
pub const DEFAULT_TITLE: &str = "Dolphia";
pub const DEFAULT_BODY: &str = "New update";
pub const DEFAULT_ICON: &str = "/icons/icon-192x192.png";
pub const DEFAULT_BADGE: &str = "/icons/icon-72x72.png";
pub const DEFAULT_URL: &str = "/";

/// Server push payload; every field is optional and defaulted independently.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushPayload {
    pub title: Option<String>,
    pub body: Option<String>,
    pub url: Option<String>,
    pub icon: Option<String>,
    pub badge: Option<String>,
}

/// Fully-resolved notification: what gets displayed, plus the URL stored as
/// click-target data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOptions {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub url: String,
}

/// A notification the user clicked on.
pub trait ClickedNotification: Send + Sync {
    /// Dismiss the notification.
    fn close(&self);

    /// The click-target URL attached when the notification was shown.
    fn target_url(&self) -> Option<String>;
}

/// An open application window, as enumerated by the worker.
#[async_trait]
pub trait WindowClient: Send + Sync {
    /// Current URL of the window. May fail for windows the worker cannot
    /// inspect.
    fn url(&self) -> Result<String>;

    async fn focus(&self) -> Result<()>;
}

/// Action surface the hosting environment provides to the handlers.
#[async_trait]
pub trait WorkerEnv: Send + Sync {
    async fn show_notification(&self, notification: &NotificationOptions) -> Result<()>;

    /// All open application windows, including ones not controlled by this
    /// worker.
    async fn window_clients(&self) -> Result<Vec<Box<dyn WindowClient>>>;

    async fn open_window(&self, url: &str) -> Result<()>;
}

/// Resolve the raw push payload into display parameters.
///
/// Valid JSON is defaulted per field; anything else falls back to the raw
/// text as the body; no payload at all yields the generic default.
pub fn resolve_push_payload(data: Option<&[u8]>) -> NotificationOptions {
    let payload = match data {
        Some(bytes) => match serde_json::from_slice::<PushPayload>(bytes) {
            Ok(payload) => payload,
            Err(_) => PushPayload {
                body: Some(String::from_utf8_lossy(bytes).into_owned()),
                ..PushPayload::default()
            },
        },
        None => PushPayload::default(),
    };

    NotificationOptions {
        title: payload.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        body: payload.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
        icon: payload.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        badge: payload.badge.unwrap_or_else(|| DEFAULT_BADGE.to_string()),
        url: payload.url.unwrap_or_else(|| DEFAULT_URL.to_string()),
    }
}

/// Handle a push event: resolve the payload and display the notification.
/// The caller must await this before the worker context may be suspended.
pub async fn handle_push(env: &dyn WorkerEnv, data: Option<&[u8]>) -> Result<()> {
    let notification = resolve_push_payload(data);
    debug!("Push received: {}", notification.title);
    env.show_notification(&notification).await
}

/// Handle a notification click: close it, then focus the first open window
/// whose URL equals or prefix-matches the stored target, or open a new
/// window at the target. Errors while inspecting one window are swallowed so
/// a bad window does not abort the scan.
pub async fn handle_notification_click(
    env: &dyn WorkerEnv,
    notification: &dyn ClickedNotification,
) -> Result<()> {
    notification.close();

    let target = notification
        .target_url()
        .unwrap_or_else(|| DEFAULT_URL.to_string());

    for window in env.window_clients().await? {
        let Ok(url) = window.url() else {
            continue;
        };
        if url == target || url.starts_with(&target) {
            if window.focus().await.is_ok() {
                return Ok(());
            }
        }
    }

    env.open_window(&target).await
}
