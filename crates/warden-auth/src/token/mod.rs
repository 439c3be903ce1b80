//! Token issuance, rotation and revocation.

pub mod service;


use sha2::{Digest, Sha256};

pub use service::{LoginResult, Registration, TokenPair, TokenService};

/// Hex SHA-256 of a token string. Only digests are persisted.
pub fn token_digest(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
