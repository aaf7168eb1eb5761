//! Refresh-token record entity.

pub mod model;

pub use model::{CreateRefreshToken, RefreshTokenRecord};
