use axum::extract::State;
use serde::Deserialize;

use crate::database::models::{job, Job};
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::handlers::require_fields;
use crate::middleware::auth::{AdminIdentity, MaybeAdmin};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

const JOB_COLUMNS: &str =
    "id, title, location, job_type, summary, description, requirements, status, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct JobInput {
    pub title: String,
    pub location: String,
    pub job_type: String,
    #[serde(default)]
    pub summary: String,
    pub description: String,
    #[serde(default)]
    pub requirements: String,
    pub status: Option<String>,
}

impl JobInput {
    fn status(&self) -> Result<&str, ApiError> {
        match self.status.as_deref() {
            None => Ok(job::STATUS_ACTIVE),
            Some(s) if job::is_valid_status(s) => Ok(s),
            Some(s) => Err(ApiError::bad_request(format!("invalid job status '{}'", s))),
        }
    }
}

/// GET /api/jobs - the public sees active postings only
pub async fn list(
    State(state): State<AppState>,
    requester: MaybeAdmin,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Job>> {
    let jobs = if requester.is_admin() {
        match query.status.as_deref() {
            Some(status) if job::is_valid_status(status) => {
                let sql = format!(
                    "SELECT {} FROM jobs WHERE status = $1 ORDER BY created_at DESC",
                    JOB_COLUMNS
                );
                sqlx::query_as::<_, Job>(&sql)
                    .bind(status)
                    .fetch_all(&state.pool)
                    .await?
            }
            Some(status) => {
                return Err(ApiError::bad_request(format!("invalid job status '{}'", status)))
            }
            None => {
                let sql = format!("SELECT {} FROM jobs ORDER BY created_at DESC", JOB_COLUMNS);
                sqlx::query_as::<_, Job>(&sql).fetch_all(&state.pool).await?
            }
        }
    } else {
        let sql = format!(
            "SELECT {} FROM jobs WHERE status = $1 ORDER BY created_at DESC",
            JOB_COLUMNS
        );
        sqlx::query_as::<_, Job>(&sql)
            .bind(job::STATUS_ACTIVE)
            .fetch_all(&state.pool)
            .await?
    };

    Ok(ApiResponse::success(jobs))
}

/// GET /api/jobs/:id - inactive postings are invisible to the public
pub async fn get(
    State(state): State<AppState>,
    requester: MaybeAdmin,
    Path(id): Path<i64>,
) -> ApiResult<Job> {
    let sql = format!("SELECT {} FROM jobs WHERE id = $1", JOB_COLUMNS);
    let found = sqlx::query_as::<_, Job>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("job not found"))?;

    if !requester.is_admin() && found.status != job::STATUS_ACTIVE {
        return Err(ApiError::not_found("job not found"));
    }

    Ok(ApiResponse::success(found))
}

/// POST /api/jobs (admin)
pub async fn create(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Json(input): Json<JobInput>,
) -> ApiResult<Job> {
    require_fields(&[
        ("title", &input.title),
        ("location", &input.location),
        ("job_type", &input.job_type),
        ("description", &input.description),
    ])?;
    let status = input.status()?.to_string();

    let sql = format!(
        "INSERT INTO jobs (title, location, job_type, summary, description, requirements, status) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
        JOB_COLUMNS
    );
    let created = sqlx::query_as::<_, Job>(&sql)
        .bind(&input.title)
        .bind(&input.location)
        .bind(&input.job_type)
        .bind(&input.summary)
        .bind(&input.description)
        .bind(&input.requirements)
        .bind(&status)
        .fetch_one(&state.pool)
        .await?;

    tracing::info!("admin {} created job {} ({})", admin.username, created.id, created.title);
    Ok(ApiResponse::created(created))
}

/// PUT /api/jobs/:id (admin)
pub async fn update(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Path(id): Path<i64>,
    Json(input): Json<JobInput>,
) -> ApiResult<Job> {
    require_fields(&[
        ("title", &input.title),
        ("location", &input.location),
        ("job_type", &input.job_type),
        ("description", &input.description),
    ])?;
    let status = input.status()?.to_string();

    let sql = format!(
        "UPDATE jobs SET title = $1, location = $2, job_type = $3, summary = $4, \
         description = $5, requirements = $6, status = $7, updated_at = now() \
         WHERE id = $8 RETURNING {}",
        JOB_COLUMNS
    );
    let updated = sqlx::query_as::<_, Job>(&sql)
        .bind(&input.title)
        .bind(&input.location)
        .bind(&input.job_type)
        .bind(&input.summary)
        .bind(&input.description)
        .bind(&input.requirements)
        .bind(&status)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("job not found"))?;

    tracing::info!("admin {} updated job {}", admin.username, id);
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/jobs/:id (admin)
pub async fn delete(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("job not found"));
    }

    tracing::info!("admin {} deleted job {}", admin.username, id);
    Ok(ApiResponse::message("job deleted"))
}
