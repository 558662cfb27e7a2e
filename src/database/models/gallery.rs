use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GalleryItem {
    pub id: i64,
    pub title: String,
    pub image_url: String,
    pub category: String,
    pub display_order: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_HIDDEN: &str = "hidden";

pub fn is_valid_status(status: &str) -> bool {
    matches!(status, STATUS_ACTIVE | STATUS_HIDDEN)
}
