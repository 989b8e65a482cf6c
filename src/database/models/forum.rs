use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Forum post joined with its author's display name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionPost {
    pub id: Uuid,
    pub user_id: Uuid,
    pub author_name: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub is_approved: bool,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiscussionPost {
    /// Unapproved posts are visible to their author only
    pub fn is_visible_to(&self, user_id: Uuid) -> bool {
        self.is_approved || self.user_id == user_id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionComment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub author_name: String,
    pub content: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}
