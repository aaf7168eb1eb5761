//! JWT token codec: typed claims, encoder, decoder.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{Claims, TokenType};
pub use decoder::JwtDecoder;
pub use encoder::{IssuedRefreshToken, IssuedToken, JwtEncoder};
