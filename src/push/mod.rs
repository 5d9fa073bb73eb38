pub mod manager;
pub mod platform;

pub use manager::{decode_vapid_key, PushManager};
pub use platform::{PushPlatform, PushSubscription, SubscriptionKeys};
