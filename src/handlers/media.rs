use axum::extract::State;
use std::path::PathBuf;

use crate::database::models::Media;
use crate::error::ApiError;
use crate::extract::{Multipart, Path};
use crate::middleware::auth::AdminIdentity;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;
use crate::upload::{self, UploadKind};

const MEDIA_COLUMNS: &str = "id, name, url, media_type, size, uploaded_at";

/// GET /api/media (admin) - the media library, newest first
pub async fn list(State(state): State<AppState>, _admin: AdminIdentity) -> ApiResult<Vec<Media>> {
    let sql = format!("SELECT {} FROM media ORDER BY uploaded_at DESC", MEDIA_COLUMNS);
    let rows = sqlx::query_as::<_, Media>(&sql).fetch_all(&state.pool).await?;
    Ok(ApiResponse::success(rows))
}

/// POST /api/media (admin) - multipart image upload. Accepted files get a
/// random name under the media directory; a failed metadata insert removes
/// the file again.
pub async fn create(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Multipart(mut multipart): Multipart,
) -> ApiResult<Media> {
    let mut display_name: Option<String> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {}", e)))?
    {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "name" => {
                display_name = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::bad_request(format!("invalid multipart field: {}", e)))?,
                )
            }
            "file" => {
                let original = field.file_name().unwrap_or("upload").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("could not read file: {}", e)))?;
                file = Some((original, bytes.to_vec()));
            }
            _ => {}
        }
    }

    let (original_name, bytes) = file.ok_or_else(|| ApiError::missing_field("file"))?;
    let mime = upload::validate(UploadKind::Image, &bytes, state.config.uploads.max_bytes)?;
    let stored = upload::store(&state.config.uploads.media_dir(), mime, &bytes).await?;

    let name = display_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or(original_name);
    let url = format!("/uploads/media/{}", stored.file_name);

    let sql = format!(
        "INSERT INTO media (name, url, media_type, size) \
         VALUES ($1, $2, $3, $4) RETURNING {}",
        MEDIA_COLUMNS
    );
    let inserted = sqlx::query_as::<_, Media>(&sql)
        .bind(&name)
        .bind(&url)
        .bind(mime)
        .bind(bytes.len() as i64)
        .fetch_one(&state.pool)
        .await;

    let created = match inserted {
        Ok(row) => row,
        Err(e) => {
            upload::remove_quietly(&stored.path).await;
            return Err(e.into());
        }
    };

    tracing::info!("admin {} uploaded media {} ({})", admin.username, created.id, created.name);
    Ok(ApiResponse::created(created))
}

/// DELETE /api/media/:id (admin) - removes the stored file as well,
/// tolerating the case where it is already absent
pub async fn delete(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let sql = format!("DELETE FROM media WHERE id = $1 RETURNING {}", MEDIA_COLUMNS);
    let deleted = sqlx::query_as::<_, Media>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("media not found"))?;

    // url is served from the upload root; translate back to the disk path
    if let Some(file_name) = deleted.url.rsplit('/').next() {
        let path: PathBuf = state.config.uploads.media_dir().join(file_name);
        upload::remove_quietly(&path).await;
    }

    tracing::info!("admin {} deleted media {}", admin.username, id);
    Ok(ApiResponse::message("media deleted"))
}
