//! Password policy enforcement for new passwords.

use warden_core::config::AuthConfig;
use warden_core::error::AppError;

/// Maximum accepted password length, in bytes.
const MAX_LENGTH: usize = 128;

/// Validates new passwords against the configured policy.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length, in characters.
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Configured minimum length.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Returns `Ok(())` if the password meets the policy, or an error
    /// describing the first violation found.
    pub fn validate(&self, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        if password.len() > MAX_LENGTH {
            return Err(AppError::validation(format!(
                "Password must be at most {MAX_LENGTH} bytes long"
            )));
        }

        if password.trim().is_empty() {
            return Err(AppError::validation("Password must not be blank"));
        }

        Ok(())
    }
}
