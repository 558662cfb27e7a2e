use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Media {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub media_type: String,
    pub size: i64,
    pub uploaded_at: DateTime<Utc>,
}
