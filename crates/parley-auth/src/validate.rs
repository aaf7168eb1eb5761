//! Username and avatar validation.
//!
//! Usernames are unique case-insensitively: comparisons run on the
//! normalized (trimmed, lowercased) form while the original casing is
//! stored for display.

use parley_core::error::AppError;

/// Maximum username length.
pub const USERNAME_MAX_LENGTH: usize = 64;

/// Maximum avatar reference length.
pub const AVATAR_MAX_LENGTH: usize = 500;

/// Normalize a username for comparison and lookup.
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase()
}

/// Validate a username against length and charset rules.
pub fn validate_username(username: &str, min_length: usize) -> Result<(), AppError> {
    let trimmed = username.trim();
    let len = trimmed.chars().count();

    if len < min_length {
        return Err(AppError::validation(format!(
            "Username must be at least {min_length} characters long"
        )));
    }

    if len > USERNAME_MAX_LENGTH {
        return Err(AppError::validation(format!(
            "Username must be at most {USERNAME_MAX_LENGTH} characters long"
        )));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(AppError::validation(
            "Username may only contain letters, digits, '_', '-', and '.'",
        ));
    }

    Ok(())
}

/// Validate an avatar reference: a relative path or an absolute URL.
pub fn validate_avatar_url(avatar_url: &str) -> Result<(), AppError> {
    if avatar_url.len() > AVATAR_MAX_LENGTH {
        return Err(AppError::validation(format!(
            "Avatar reference must be at most {AVATAR_MAX_LENGTH} characters long"
        )));
    }

    let allowed = avatar_url.starts_with("http://")
        || avatar_url.starts_with("https://")
        || avatar_url.starts_with('/');

    if !allowed {
        return Err(AppError::validation(
            "Avatar reference must start with http://, https://, or /",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_username("  Alice "), "alice");
        assert_eq!(normalize_username("BOB"), "bob");
    }

    #[test]
    fn test_username_length() {
        assert!(validate_username("al", 3).is_err());
        assert!(validate_username("alice", 3).is_ok());
        assert!(validate_username(&"a".repeat(65), 3).is_err());
    }

    #[test]
    fn test_username_charset() {
        assert!(validate_username("alice_01", 3).is_ok());
        assert!(validate_username("alice-b.c", 3).is_ok());
        assert!(validate_username("alice bob", 3).is_err());
        assert!(validate_username("alice@example", 3).is_err());
    }

    #[test]
    fn test_avatar_schemes() {
        assert!(validate_avatar_url("https://cdn.example.com/a.png").is_ok());
        assert!(validate_avatar_url("http://cdn.example.com/a.png").is_ok());
        assert!(validate_avatar_url("/avatars/a.png").is_ok());
        assert!(validate_avatar_url("ftp://cdn.example.com/a.png").is_err());
        assert!(validate_avatar_url("avatars/a.png").is_err());
    }

    #[test]
    fn test_avatar_length() {
        let long = format!("/{}", "a".repeat(AVATAR_MAX_LENGTH));
        assert!(validate_avatar_url(&long).is_err());
    }
}
