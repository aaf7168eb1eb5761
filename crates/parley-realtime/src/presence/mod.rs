//! Process-local presence tracking.

pub mod tracker;

pub use tracker::{OnlineUser, PresenceTracker};
