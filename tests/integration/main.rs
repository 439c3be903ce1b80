//! HTTP integration tests. Every test runs against an in-memory store.

mod helpers;

mod audit_test;
mod auth_test;
mod permission_test;
mod post_test;
mod rate_limit_test;
mod sso_test;
mod user_test;
