//! # parley-api
//!
//! HTTP and WebSocket API surface for Parley: the axum router, shared
//! application state, request/response DTOs, extractors, and handlers.

pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;
