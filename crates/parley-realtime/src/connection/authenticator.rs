//! WebSocket handshake authentication.
//!
//! The handshake presents a previously issued access token; the connection
//! is rejected outright on any verification failure, before presence is
//! touched. Tokens carry identity and role only — display metadata comes
//! from the credential store at connect time.

use std::sync::Arc;

use uuid::Uuid;

use parley_auth::jwt::JwtDecoder;
use parley_core::error::AppError;
use parley_entity::user::UserRole;

/// Identity extracted from a verified handshake token.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    /// User ID.
    pub user_id: Uuid,
    /// User role at token issuance.
    pub role: UserRole,
}

/// Authenticates WebSocket connections using access tokens.
#[derive(Clone)]
pub struct WsAuthenticator {
    /// JWT decoder shared with the session manager's codec.
    decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(decoder: Arc<JwtDecoder>) -> Self {
        Self { decoder }
    }

    /// Authenticates a handshake token (typically from a query parameter).
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedClient, AppError> {
        let claims = self.decoder.decode_access(token)?;

        Ok(AuthenticatedClient {
            user_id: claims.user_id(),
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_auth::jwt::JwtEncoder;
    use parley_core::config::auth::AuthConfig;

    fn setup() -> (JwtEncoder, WsAuthenticator) {
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            ..AuthConfig::default()
        };
        (
            JwtEncoder::new(&config),
            WsAuthenticator::new(Arc::new(JwtDecoder::new(&config))),
        )
    }

    #[test]
    fn test_valid_access_token_accepted() {
        let (encoder, authenticator) = setup();
        let user_id = Uuid::new_v4();
        let issued = encoder.sign_access(user_id, UserRole::User).unwrap();

        let client = authenticator.authenticate(&issued.token).unwrap();
        assert_eq!(client.user_id, user_id);
        assert_eq!(client.role, UserRole::User);
    }

    #[test]
    fn test_refresh_token_rejected_for_handshake() {
        let (encoder, authenticator) = setup();
        let issued = encoder.sign_refresh(Uuid::new_v4(), UserRole::User).unwrap();

        assert!(authenticator.authenticate(&issued.token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let (_, authenticator) = setup();
        assert!(authenticator.authenticate("garbage").is_err());
    }
}
