//! # parley-entity
//!
//! Domain entity models shared by the Parley crates: users, refresh-token
//! records, chat messages, and audit log entries.

pub mod audit;
pub mod message;
pub mod token;
pub mod user;
