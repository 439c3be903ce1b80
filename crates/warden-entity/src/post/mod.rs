//! Post entities.

pub mod model;

pub use model::{CreatePost, Post, PostFilter, PostSort, SortOrder, UpdatePost};
