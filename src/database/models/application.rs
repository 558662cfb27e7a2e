use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Application {
    pub id: i64,
    pub job_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cover_letter: String,
    pub resume_path: String,
    pub resume_name: String,
    pub resume_size: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub const STATUSES: [&str; 4] = ["pending", "reviewing", "shortlisted", "rejected"];

pub fn is_valid_status(status: &str) -> bool {
    STATUSES.contains(&status)
}
