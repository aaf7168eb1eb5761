//! # parley-core
//!
//! Core crate for the Parley chat service. Contains configuration schemas,
//! shared types, the audit-sink boundary, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Parley crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
