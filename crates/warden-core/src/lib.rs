//! # warden-core
//!
//! Core crate for Warden. Contains configuration schemas, the clock
//! abstraction, pagination types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Warden crates.

pub mod config;
pub mod error;
pub mod result;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
