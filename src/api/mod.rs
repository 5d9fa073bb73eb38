pub mod client;
pub mod provider;

pub use client::{ApiError, HttpApi};
pub use provider::LiveApi;
