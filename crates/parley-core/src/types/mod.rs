//! Shared types used across Parley crates.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
