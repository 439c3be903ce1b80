//! Refresh token records.

pub mod refresh;

pub use refresh::{NewRefreshToken, RefreshTokenRecord, RefreshTokenState};
