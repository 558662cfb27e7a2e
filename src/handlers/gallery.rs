use axum::extract::State;
use serde::Deserialize;

use crate::database::models::{gallery, GalleryItem};
use crate::error::ApiError;
use crate::extract::{Json, Path};
use crate::handlers::require_fields;
use crate::middleware::auth::{AdminIdentity, MaybeAdmin};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

const GALLERY_COLUMNS: &str = "id, title, image_url, category, display_order, status, created_at";

#[derive(Debug, Deserialize)]
pub struct GalleryInput {
    pub title: String,
    pub image_url: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub display_order: i32,
    pub status: Option<String>,
}

impl GalleryInput {
    fn status(&self) -> Result<&str, ApiError> {
        match self.status.as_deref() {
            None => Ok(gallery::STATUS_ACTIVE),
            Some(s) if gallery::is_valid_status(s) => Ok(s),
            Some(s) => Err(ApiError::bad_request(format!("invalid gallery status '{}'", s))),
        }
    }
}

/// GET /api/gallery - public sees active items in display order; admins see
/// everything including hidden items
pub async fn list(State(state): State<AppState>, requester: MaybeAdmin) -> ApiResult<Vec<GalleryItem>> {
    let items = if requester.is_admin() {
        let sql = format!(
            "SELECT {} FROM gallery ORDER BY display_order ASC, created_at DESC",
            GALLERY_COLUMNS
        );
        sqlx::query_as::<_, GalleryItem>(&sql).fetch_all(&state.pool).await?
    } else {
        let sql = format!(
            "SELECT {} FROM gallery WHERE status = $1 ORDER BY display_order ASC, created_at DESC",
            GALLERY_COLUMNS
        );
        sqlx::query_as::<_, GalleryItem>(&sql)
            .bind(gallery::STATUS_ACTIVE)
            .fetch_all(&state.pool)
            .await?
    };

    Ok(ApiResponse::success(items))
}

/// POST /api/gallery (admin)
pub async fn create(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Json(input): Json<GalleryInput>,
) -> ApiResult<GalleryItem> {
    require_fields(&[("title", &input.title), ("image_url", &input.image_url)])?;
    let status = input.status()?.to_string();

    let sql = format!(
        "INSERT INTO gallery (title, image_url, category, display_order, status) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        GALLERY_COLUMNS
    );
    let created = sqlx::query_as::<_, GalleryItem>(&sql)
        .bind(&input.title)
        .bind(&input.image_url)
        .bind(&input.category)
        .bind(input.display_order)
        .bind(&status)
        .fetch_one(&state.pool)
        .await?;

    tracing::info!("admin {} created gallery item {}", admin.username, created.id);
    Ok(ApiResponse::created(created))
}

/// PUT /api/gallery/:id (admin)
pub async fn update(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Path(id): Path<i64>,
    Json(input): Json<GalleryInput>,
) -> ApiResult<GalleryItem> {
    require_fields(&[("title", &input.title), ("image_url", &input.image_url)])?;
    let status = input.status()?.to_string();

    let sql = format!(
        "UPDATE gallery SET title = $1, image_url = $2, category = $3, \
         display_order = $4, status = $5 WHERE id = $6 RETURNING {}",
        GALLERY_COLUMNS
    );
    let updated = sqlx::query_as::<_, GalleryItem>(&sql)
        .bind(&input.title)
        .bind(&input.image_url)
        .bind(&input.category)
        .bind(input.display_order)
        .bind(&status)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("gallery item not found"))?;

    tracing::info!("admin {} updated gallery item {}", admin.username, id);
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/gallery/:id (admin)
pub async fn delete(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let result = sqlx::query("DELETE FROM gallery WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("gallery item not found"));
    }

    tracing::info!("admin {} deleted gallery item {}", admin.username, id);
    Ok(ApiResponse::message("gallery item deleted"))
}
