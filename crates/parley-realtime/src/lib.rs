//! # parley-realtime
//!
//! Real-time layer for Parley: per-connection handles and pool, the
//! process-local presence tracker, the WebSocket handshake authenticator,
//! and the gateway that fans out presence and message events to every
//! connected client.

pub mod connection;
pub mod gateway;
pub mod message;
pub mod presence;

pub use gateway::RealtimeGateway;
