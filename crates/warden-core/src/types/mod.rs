//! Core type definitions used across the Warden workspace.

pub mod clock;
pub mod pagination;

pub use clock::{Clock, ManualClock, SystemClock};
pub use pagination::{PageRequest, PageResponse};
