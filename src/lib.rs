//! Dolphia live-score synchronization core.
//!
//! The interesting part of the app: polling stores that keep live match
//! state fresh, score-delta goal detection with deduplicated notifications,
//! the push subscription lifecycle and the service-worker notification
//! handlers. View rendering and packaging live elsewhere; everything here is
//! host-agnostic and driven through the [`api::LiveApi`],
//! [`notify::Notifier`], [`push::PushPlatform`] and [`worker::WorkerEnv`]
//! seams.

pub mod api;
pub mod config;
pub mod models;
pub mod notify;
pub mod push;
pub mod stores;
pub mod worker;
