//! # warden-api
//!
//! HTTP surface for Warden built on Axum. Routes are mounted under
//! `/api/{api_version}`; every handler receives [`AppState`] and reports
//! failures as [`ApiError`], which renders the standard error envelope.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::{ApiError, ApiResult};
pub use state::AppState;
