use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::notify::NotificationPermission;

/// Key material attached to a push subscription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// A browser-issued push subscription: the delivery endpoint plus its keys.
/// Serializing this is the platform JSON form sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

/// Capability surface of the hosting environment (browser, test harness).
///
/// The manager probes the three capabilities before touching anything, so an
/// implementation may answer `false` and leave the async operations
/// unreachable.
#[async_trait]
pub trait PushPlatform: Send + Sync {
    fn has_service_worker(&self) -> bool;
    fn has_push_manager(&self) -> bool;
    fn has_notifications(&self) -> bool;

    /// Current notification permission, without prompting.
    fn permission(&self) -> NotificationPermission;

    /// Prompt the user for notification permission.
    async fn request_permission(&self) -> Result<NotificationPermission>;

    /// Resolve once the active service-worker registration is ready.
    async fn service_worker_ready(&self) -> Result<()>;

    /// The live subscription for this profile, if one exists.
    async fn get_subscription(&self) -> Result<Option<PushSubscription>>;

    /// Open a new subscription using the raw application server key bytes.
    async fn subscribe(&self, application_server_key: &[u8]) -> Result<PushSubscription>;
}
