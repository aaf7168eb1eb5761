//! JWT token validation.
//!
//! Expiry is enforced purely here, at verification time — there is no
//! server-side session timer. Access tokens are never revocable; their
//! short TTL is the only defense against theft.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

use parley_core::config::auth::AuthConfig;
use parley_core::error::AppError;

use super::claims::{Claims, TokenType};

/// Validates JWT tokens.
#[derive(Clone)]
pub struct JwtDecoder {
    /// HMAC secret key for verification.
    decoding_key: DecodingKey,
    /// Validation configuration.
    validation: Validation,
}

impl std::fmt::Debug for JwtDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtDecoder")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtDecoder {
    /// Creates a new decoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 5; // 5 seconds leeway for clock skew

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates an access token string.
    pub fn decode_access(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;

        if claims.token_type != TokenType::Access {
            return Err(AppError::authentication(
                "Invalid token type: expected access token",
            ));
        }

        Ok(claims)
    }

    /// Decodes and validates a refresh token string.
    pub fn decode_refresh(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.decode_token(token)?;

        if claims.token_type != TokenType::Refresh {
            return Err(AppError::authentication(
                "Invalid token type: expected refresh token",
            ));
        }

        Ok(claims)
    }

    /// Internal decode without type checking.
    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                        AppError::authentication("Token has expired")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidToken => {
                        AppError::authentication("Invalid token format")
                    }
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AppError::authentication("Invalid token signature")
                    }
                    _ => AppError::authentication(format!("Token validation failed: {e}")),
                }
            })?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::encoder::JwtEncoder;
    use parley_entity::user::UserRole;
    use uuid::Uuid;

    fn codec() -> (JwtEncoder, JwtDecoder) {
        let config = AuthConfig {
            jwt_secret: "test-secret".to_string(),
            ..AuthConfig::default()
        };
        (JwtEncoder::new(&config), JwtDecoder::new(&config))
    }

    #[test]
    fn test_access_token_roundtrip() {
        let (encoder, decoder) = codec();
        let user_id = Uuid::new_v4();

        let issued = encoder.sign_access(user_id, UserRole::Admin).unwrap();
        let claims = decoder.decode_access(&issued.token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, UserRole::Admin);
        assert_eq!(claims.token_type, TokenType::Access);
        assert!(claims.jti.is_none());
    }

    #[test]
    fn test_refresh_token_carries_unique_id() {
        let (encoder, decoder) = codec();
        let user_id = Uuid::new_v4();

        let first = encoder.sign_refresh(user_id, UserRole::User).unwrap();
        let second = encoder.sign_refresh(user_id, UserRole::User).unwrap();
        assert_ne!(first.token_id, second.token_id);

        let claims = decoder.decode_refresh(&first.token).unwrap();
        assert_eq!(claims.jti, Some(first.token_id));
    }

    #[test]
    fn test_token_type_confusion_rejected() {
        let (encoder, decoder) = codec();
        let user_id = Uuid::new_v4();

        let access = encoder.sign_access(user_id, UserRole::User).unwrap();
        let refresh = encoder.sign_refresh(user_id, UserRole::User).unwrap();

        assert!(decoder.decode_refresh(&access.token).is_err());
        assert!(decoder.decode_access(&refresh.token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let (encoder, _) = codec();
        let other = JwtDecoder::new(&AuthConfig {
            jwt_secret: "different-secret".to_string(),
            ..AuthConfig::default()
        });

        let issued = encoder.sign_access(Uuid::new_v4(), UserRole::User).unwrap();
        assert!(other.decode_access(&issued.token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let (_, decoder) = codec();
        assert!(decoder.decode_access("not-a-token").is_err());
    }
}
