pub mod live_matches;
pub mod match_detail;

pub use live_matches::LiveMatchesStore;
pub use match_detail::MatchDetailStore;

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawn a periodic ticker that runs `tick` immediately and then every
/// `interval`.
///
/// Each tick fires and forgets its own fetch task, so a slow response still
/// outstanding when the next tick arrives races with it (last write wins on
/// store state), and aborting the returned handle stops future ticks without
/// cancelling an in-flight request.
fn spawn_poller<F>(interval: Duration, tick: F) -> JoinHandle<()>
where
    F: Fn() + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            tick();
        }
    })
}
