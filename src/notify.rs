use anyhow::Result;
use tracing::info;

/// Browser-style notification permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationPermission {
    /// Not yet asked.
    Default,
    Granted,
    Denied,
}

/// Surface through which the stores display local notifications.
///
/// The stores only attempt `show` while permission is `Granted`, and a
/// display failure is logged at the call site, never propagated.
pub trait Notifier: Send + Sync {
    fn permission(&self) -> NotificationPermission;

    fn show(&self, title: &str, body: &str, icon: &str) -> Result<()>;
}

/// Notifier that writes notifications to the log. Used by the headless
/// watcher binary, where there is no OS notification surface to drive.
pub struct LogNotifier {
    permission: NotificationPermission,
}

impl LogNotifier {
    pub fn new(permission: NotificationPermission) -> Self {
        LogNotifier { permission }
    }
}

impl Notifier for LogNotifier {
    fn permission(&self) -> NotificationPermission {
        self.permission
    }

    fn show(&self, title: &str, body: &str, icon: &str) -> Result<()> {
        info!("🔔 {} — {} (icon: {})", title, body, icon);
        Ok(())
    }
}
