//! HTTP request handlers, one module per resource.

pub mod audit;
pub mod auth;
pub mod health;
pub mod post;
pub mod user;
