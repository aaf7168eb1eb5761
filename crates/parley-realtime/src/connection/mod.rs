//! Connection handles, pool, and handshake authentication.

pub mod authenticator;
pub mod handle;
pub mod pool;

pub use authenticator::{AuthenticatedClient, WsAuthenticator};
pub use handle::{ConnectionHandle, ConnectionId};
pub use pool::ConnectionPool;
