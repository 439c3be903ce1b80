//! JWT claims, signing and verification.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{Claims, TokenType};
pub use decoder::{JwtDecoder, TokenVerification};
pub use encoder::{IssuedToken, JwtEncoder};
