use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub location: String,
    pub job_type: String,
    pub summary: String,
    pub description: String,
    pub requirements: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const STATUS_ACTIVE: &str = "active";
pub const STATUS_INACTIVE: &str = "inactive";

pub fn is_valid_status(status: &str) -> bool {
    matches!(status, STATUS_ACTIVE | STATUS_INACTIVE)
}
