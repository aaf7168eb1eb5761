//! `AuthUser` extractor — pulls the access token from the Authorization
//! header and validates it.
//!
//! Access tokens are self-contained and never revocable, so validation is
//! pure signature + expiry checking; no store lookup happens here.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use parley_core::error::AppError;
use parley_entity::user::UserRole;

use crate::state::AppState;

/// Extracted authenticated caller context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The role claimed at token issuance.
    pub role: UserRole,
}

impl AuthUser {
    /// Fails with an authorization error unless the caller is an admin.
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(AppError::authorization("Administrator role required"))
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let claims = state.jwt_decoder.decode_access(token)?;

        Ok(AuthUser {
            user_id: claims.user_id(),
            role: claims.role,
        })
    }
}
