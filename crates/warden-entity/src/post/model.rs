//! Post entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A user-authored post. Deletion is a flag, not a row removal.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Unique post identifier.
    pub id: Uuid,
    /// Title.
    pub title: String,
    /// Body.
    pub content: String,
    /// Visible to other users when set.
    pub published: bool,
    /// Owner.
    pub author_id: Uuid,
    /// Soft-delete flag.
    #[serde(skip_serializing)]
    pub is_deleted: bool,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
    /// When the post was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Whether `user_id` owns this post.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.author_id == user_id
    }
}

/// Data required to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePost {
    /// Title.
    pub title: String,
    /// Body.
    pub content: String,
    /// Initial visibility.
    pub published: bool,
    /// Owner.
    pub author_id: Uuid,
}

/// Partial update of a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePost {
    /// New title.
    pub title: Option<String>,
    /// New body.
    pub content: Option<String>,
    /// New visibility.
    pub published: Option<bool>,
}

/// Sort column for post listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostSort {
    /// Creation time.
    #[default]
    CreatedAt,
    /// Last update time.
    UpdatedAt,
    /// Title, lexicographic.
    Title,
}

impl PostSort {
    /// SQL column name.
    pub fn column(&self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
            Self::Title => "title",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL keyword.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Filters for listing posts. Deleted posts are never listed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFilter {
    /// Only published or only drafts.
    pub published: Option<bool>,
    /// Case-insensitive substring of title or content.
    pub search: Option<String>,
    /// When set, restricts results to published posts plus this user's own.
    pub visible_to: Option<Uuid>,
    /// Sort column.
    pub sort_by: PostSort,
    /// Sort direction.
    pub sort_order: SortOrder,
}

impl PostFilter {
    /// Whether `post` passes this filter.
    pub fn matches(&self, post: &Post) -> bool {
        if post.is_deleted {
            return false;
        }
        if self.published.is_some_and(|p| p != post.published) {
            return false;
        }
        if let Some(viewer) = self.visible_to {
            if !post.published && post.author_id != viewer {
                return false;
            }
        }
        match self.search.as_deref().map(str::to_lowercase) {
            Some(needle) => {
                post.title.to_lowercase().contains(&needle)
                    || post.content.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}
