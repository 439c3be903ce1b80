//! SSO bridge.

pub mod bridge;
pub mod claims;


pub use bridge::{SsoBridge, SsoInfo, SsoVerification};
pub use claims::{Audience, ExternalClaims, SsoIdentity};
