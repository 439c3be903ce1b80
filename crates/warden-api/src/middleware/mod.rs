//! HTTP middleware and route guards.

pub mod cors;
pub mod envelope;
pub mod guard;
pub mod logging;
pub mod rate_limit;

pub use cors::build_cors_layer;
pub use guard::{require_any, require_roles, require_scopes, require_self_or_admin};
pub use rate_limit::{RateLimiter, RateLimits};
