use axum::extract::State;
use serde::Deserialize;
use std::path::PathBuf;

use crate::database::models::{application, job, Application, Job};
use crate::error::ApiError;
use crate::extract::{Json, Multipart, Path, Query};
use crate::handlers::require_fields;
use crate::mailer;
use crate::middleware::auth::AdminIdentity;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::upload::{self, UploadKind};

const APPLICATION_COLUMNS: &str = "id, job_id, name, email, phone, cover_letter, \
     resume_path, resume_name, resume_size, status, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub job_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StatusInput {
    pub status: String,
}

/// POST /api/jobs/:id/apply - public multipart submission with a resume.
/// The resume is sniffed and size-checked before anything is persisted; if
/// the insert fails afterwards the stored file is removed again so rejection
/// and failure both leave no trace.
pub async fn apply(
    State(state): State<AppState>,
    Path(job_id): Path<i64>,
    Multipart(mut multipart): Multipart,
) -> ApiResult<Application> {
    let sql = "SELECT id, title, location, job_type, summary, description, requirements, \
         status, created_at, updated_at FROM jobs WHERE id = $1";
    let posting = sqlx::query_as::<_, Job>(sql)
        .bind(job_id)
        .fetch_optional(&state.pool)
        .await?
        .filter(|j| j.status == job::STATUS_ACTIVE)
        .ok_or_else(|| ApiError::not_found("job not found"))?;

    let mut name = String::new();
    let mut email = String::new();
    let mut phone = String::new();
    let mut cover_letter = String::new();
    let mut resume: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => name = read_text(field).await?,
            "email" => email = read_text(field).await?,
            "phone" => phone = read_text(field).await?,
            "cover_letter" => cover_letter = read_text(field).await?,
            "resume" => {
                let original = field.file_name().unwrap_or("resume").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("could not read resume: {}", e)))?;
                resume = Some((original, bytes.to_vec()));
            }
            _ => {}
        }
    }

    require_fields(&[("name", &name), ("email", &email)])?;
    let (resume_name, bytes) = resume.ok_or_else(|| ApiError::missing_field("resume"))?;

    let mime = upload::validate(UploadKind::Resume, &bytes, state.config.uploads.max_bytes)?;
    let stored = upload::store(&state.config.uploads.resume_dir(), mime, &bytes).await?;

    let sql = format!(
        "INSERT INTO applications (job_id, name, email, phone, cover_letter, \
         resume_path, resume_name, resume_size) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {}",
        APPLICATION_COLUMNS
    );
    let inserted = sqlx::query_as::<_, Application>(&sql)
        .bind(job_id)
        .bind(&name)
        .bind(&email)
        .bind(&phone)
        .bind(&cover_letter)
        .bind(stored.path.to_string_lossy().as_ref())
        .bind(&resume_name)
        .bind(bytes.len() as i64)
        .fetch_one(&state.pool)
        .await;

    let created = match inserted {
        Ok(row) => row,
        Err(e) => {
            // do not leave an orphaned resume on disk
            upload::remove_quietly(&stored.path).await;
            return Err(e.into());
        }
    };

    mailer::notify_application(&state.config.smtp, &posting.title, &created.name, &created.email);

    tracing::info!("application {} received for job {}", created.id, job_id);
    Ok(ApiResponse::created(created))
}

/// GET /api/applications (admin), optionally scoped to one job
pub async fn list(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Application>> {
    let rows = match query.job_id {
        Some(job_id) => {
            let sql = format!(
                "SELECT {} FROM applications WHERE job_id = $1 ORDER BY created_at DESC",
                APPLICATION_COLUMNS
            );
            sqlx::query_as::<_, Application>(&sql)
                .bind(job_id)
                .fetch_all(&state.pool)
                .await?
        }
        None => {
            let sql = format!(
                "SELECT {} FROM applications ORDER BY created_at DESC",
                APPLICATION_COLUMNS
            );
            sqlx::query_as::<_, Application>(&sql).fetch_all(&state.pool).await?
        }
    };

    Ok(ApiResponse::success(rows))
}

/// GET /api/applications/:id (admin)
pub async fn get(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    Path(id): Path<i64>,
) -> ApiResult<Application> {
    let sql = format!("SELECT {} FROM applications WHERE id = $1", APPLICATION_COLUMNS);
    let found = sqlx::query_as::<_, Application>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("application not found"))?;

    Ok(ApiResponse::success(found))
}

/// PUT /api/applications/:id (admin) - pipeline status transitions
pub async fn update(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Path(id): Path<i64>,
    Json(input): Json<StatusInput>,
) -> ApiResult<Application> {
    if !application::is_valid_status(&input.status) {
        return Err(ApiError::bad_request(format!(
            "invalid application status '{}'",
            input.status
        )));
    }

    let sql = format!(
        "UPDATE applications SET status = $1, updated_at = now() WHERE id = $2 RETURNING {}",
        APPLICATION_COLUMNS
    );
    let updated = sqlx::query_as::<_, Application>(&sql)
        .bind(&input.status)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("application not found"))?;

    tracing::info!("admin {} set application {} to {}", admin.username, id, updated.status);
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/applications/:id (admin) - also removes the stored resume,
/// tolerating the case where the file is already gone
pub async fn delete(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let sql = format!(
        "DELETE FROM applications WHERE id = $1 RETURNING {}",
        APPLICATION_COLUMNS
    );
    let deleted = sqlx::query_as::<_, Application>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("application not found"))?;

    upload::remove_quietly(&PathBuf::from(&deleted.resume_path)).await;

    tracing::info!("admin {} deleted application {}", admin.username, id);
    Ok(ApiResponse::message("application deleted"))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart field: {}", e)))
}
