//! Password policy enforcement for new passwords.

use parley_core::config::auth::AuthConfig;
use parley_core::error::AppError;

/// Upper bound on password length; longer inputs are rejected before
/// reaching the hasher.
const MAX_PASSWORD_LENGTH: usize = 512;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length.
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Validates a password against all configured policies.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if password.len() > MAX_PASSWORD_LENGTH {
            return Err(AppError::validation(format!(
                "Password must be at most {MAX_PASSWORD_LENGTH} characters long"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> PasswordValidator {
        PasswordValidator::new(&AuthConfig::default())
    }

    #[test]
    fn test_minimum_length() {
        assert!(validator().validate("short").is_err());
        assert!(validator().validate("password123").is_ok());
    }

    #[test]
    fn test_maximum_length() {
        let long = "a".repeat(MAX_PASSWORD_LENGTH + 1);
        assert!(validator().validate(&long).is_err());
    }
}
