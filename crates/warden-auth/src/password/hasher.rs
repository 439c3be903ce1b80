//! Argon2id password hashing and verification.

use std::sync::{Arc, OnceLock};

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use warden_core::error::AppError;

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher {
    /// Hash of a throwaway secret, verified against when there is no real
    /// hash so that the miss costs the same as a mismatch.
    dummy: Arc<OnceLock<String>>,
}

impl PasswordHasher {
    /// Creates a new password hasher instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored Argon2id hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Verifies against `hash` when present, otherwise burns an equivalent
    /// verification and reports a mismatch.
    pub fn verify_optional(&self, password: &str, hash: Option<&str>) -> Result<bool, AppError> {
        match hash {
            Some(hash) if !hash.is_empty() => self.verify_password(password, hash),
            _ => {
                let dummy = self.dummy_hash()?;
                self.verify_password(password, &dummy)?;
                Ok(false)
            }
        }
    }

    fn dummy_hash(&self) -> Result<String, AppError> {
        if let Some(hash) = self.dummy.get() {
            return Ok(hash.clone());
        }
        let hash = self.hash_password("warden-timing-equalizer")?;
        Ok(self.dummy.get_or_init(|| hash).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("correct horse", &hash).unwrap());
        assert!(!hasher.verify_password("wrong horse", &hash).unwrap());
    }

    #[test]
    fn test_missing_hash_never_matches() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify_optional("anything", None).unwrap());
        assert!(!hasher.verify_optional("", Some("")).unwrap());
        assert!(!hasher.verify_optional("warden-timing-equalizer", None).unwrap());
    }
}
