use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub tags: String,
    pub excerpt: String,
    pub content: String,
    pub status: String,
    pub author_name: String,
    pub author_email: String,
    pub featured_image: String,
    pub views: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const STATUS_DRAFT: &str = "draft";
pub const STATUS_PUBLISHED: &str = "published";

pub fn is_valid_status(status: &str) -> bool {
    matches!(status, STATUS_DRAFT | STATUS_PUBLISHED)
}
