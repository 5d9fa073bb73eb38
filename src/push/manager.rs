//! Push subscription lifecycle.
//!
//! Negotiates permission, reuses any existing browser subscription and
//! registers a newly created one with the server exactly once. Every failure
//! is caught here and reported as a negative boolean; nothing propagates to
//! the caller.

use anyhow::{Context, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::platform::PushPlatform;
use crate::api::LiveApi;
use crate::notify::NotificationPermission;

/// Decode a base64url-encoded VAPID public key into the raw bytes the push
/// subscription API expects. Accepts input with or without `=` padding.
pub fn decode_vapid_key(key: &str) -> Result<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(key.trim_end_matches('='))
        .context("invalid base64url application server key")
}

#[derive(Debug, Clone, Copy)]
struct PushState {
    is_supported: bool,
    is_subscribed: bool,
    permission: NotificationPermission,
}

/// Push registration manager over a platform capability surface.
pub struct PushManager {
    platform: Arc<dyn PushPlatform>,
    api: Arc<dyn LiveApi>,
    vapid_public_key: String,
    state: RwLock<PushState>,
}

impl PushManager {
    pub fn new(
        platform: Arc<dyn PushPlatform>,
        api: Arc<dyn LiveApi>,
        vapid_public_key: &str,
    ) -> Self {
        PushManager {
            platform,
            api,
            vapid_public_key: vapid_public_key.to_string(),
            state: RwLock::new(PushState {
                is_supported: false,
                is_subscribed: false,
                permission: NotificationPermission::Default,
            }),
        }
    }

    /// Probe the three required capabilities and record the current
    /// permission state. Mutates nothing else.
    pub async fn check_support(&self) {
        let supported = self.platform.has_service_worker()
            && self.platform.has_push_manager()
            && self.platform.has_notifications();

        let mut state = self.state.write().await;
        state.is_supported = supported;
        if self.platform.has_notifications() {
            state.permission = self.platform.permission();
        }
    }

    /// Prompt for notification permission and record the outcome. Returns
    /// whether permission is now granted; a failed prompt is a `false`, not
    /// an error.
    pub async fn request_permission(&self) -> bool {
        if !self.platform.has_notifications() {
            warn!("Notifications not supported");
            return false;
        }

        match self.platform.request_permission().await {
            Ok(permission) => {
                self.state.write().await.permission = permission;
                permission == NotificationPermission::Granted
            }
            Err(e) => {
                error!("Permission request failed: {}", e);
                false
            }
        }
    }

    /// Subscribe to push notifications.
    ///
    /// Reuses the existing browser subscription when there is one; only a
    /// newly created subscription is sent to the registration endpoint, so
    /// calling this repeatedly registers at most once per subscription.
    pub async fn subscribe(&self) -> bool {
        if !self.platform.has_service_worker() || !self.platform.has_push_manager() {
            warn!("Push notifications not supported");
            return false;
        }

        match self.try_subscribe().await {
            Ok(subscribed) => subscribed,
            Err(e) => {
                error!("Push subscription failed: {}", e);
                false
            }
        }
    }

    async fn try_subscribe(&self) -> Result<bool> {
        self.platform.service_worker_ready().await?;

        if !self.request_permission().await {
            return Ok(false);
        }

        let (subscription, is_new) = match self.platform.get_subscription().await? {
            Some(existing) => {
                info!("Existing push subscription found");
                (existing, false)
            }
            None => {
                let key = decode_vapid_key(&self.vapid_public_key)?;
                let created = self.platform.subscribe(&key).await?;
                info!("New push subscription created");
                (created, true)
            }
        };

        if is_new {
            self.api
                .set_push_subscription(&serde_json::to_value(&subscription)?)
                .await
                .context("failed to register subscription with server")?;
            info!("Subscription sent to server");
        }

        self.state.write().await.is_subscribed = true;
        Ok(true)
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub async fn is_supported(&self) -> bool {
        self.state.read().await.is_supported
    }

    pub async fn is_subscribed(&self) -> bool {
        self.state.read().await.is_subscribed
    }

    pub async fn permission(&self) -> NotificationPermission {
        self.state.read().await.permission
    }
}
