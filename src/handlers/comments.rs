use axum::extract::State;
use serde::Deserialize;

use crate::database::models::{comment, Comment};
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::handlers::require_fields;
use crate::middleware::auth::{AdminIdentity, MaybeAdmin};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

const COMMENT_COLUMNS: &str = "id, post_id, author_name, author_email, body, status, created_at";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentInput {
    pub author_name: String,
    pub author_email: String,
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct ModerateInput {
    pub status: String,
}

/// GET /api/posts/:id/comments - the public sees approved comments only,
/// admins see everything including pending and rejected
pub async fn list_for_post(
    State(state): State<AppState>,
    requester: MaybeAdmin,
    Path(post_id): Path<i64>,
) -> ApiResult<Vec<Comment>> {
    ensure_post_exists(&state, post_id).await?;

    let comments = if requester.is_admin() {
        let sql = format!(
            "SELECT {} FROM comments WHERE post_id = $1 ORDER BY created_at DESC",
            COMMENT_COLUMNS
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .fetch_all(&state.pool)
            .await?
    } else {
        let sql = format!(
            "SELECT {} FROM comments WHERE post_id = $1 AND status = $2 ORDER BY created_at DESC",
            COMMENT_COLUMNS
        );
        sqlx::query_as::<_, Comment>(&sql)
            .bind(post_id)
            .bind(comment::STATUS_APPROVED)
            .fetch_all(&state.pool)
            .await?
    };

    Ok(ApiResponse::success(comments))
}

/// POST /api/posts/:id/comments - public; new comments always start pending
pub async fn create_for_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Json(input): Json<CommentInput>,
) -> ApiResult<Comment> {
    require_fields(&[
        ("author_name", &input.author_name),
        ("author_email", &input.author_email),
        ("body", &input.body),
    ])?;
    ensure_post_exists(&state, post_id).await?;

    let sql = format!(
        "INSERT INTO comments (post_id, author_name, author_email, body, status) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {}",
        COMMENT_COLUMNS
    );
    let created = sqlx::query_as::<_, Comment>(&sql)
        .bind(post_id)
        .bind(&input.author_name)
        .bind(&input.author_email)
        .bind(&input.body)
        .bind(comment::STATUS_PENDING)
        .fetch_one(&state.pool)
        .await?;

    Ok(ApiResponse::created(created))
}

/// GET /api/comments (admin) - moderation queue, filterable by status
pub async fn list(
    State(state): State<AppState>,
    _admin: AdminIdentity,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Comment>> {
    let comments = match query.status.as_deref() {
        Some(status) if comment::is_valid_status(status) => {
            let sql = format!(
                "SELECT {} FROM comments WHERE status = $1 ORDER BY created_at DESC",
                COMMENT_COLUMNS
            );
            sqlx::query_as::<_, Comment>(&sql)
                .bind(status)
                .fetch_all(&state.pool)
                .await?
        }
        Some(status) => {
            return Err(ApiError::bad_request(format!("invalid comment status '{}'", status)))
        }
        None => {
            let sql = format!("SELECT {} FROM comments ORDER BY created_at DESC", COMMENT_COLUMNS);
            sqlx::query_as::<_, Comment>(&sql).fetch_all(&state.pool).await?
        }
    };

    Ok(ApiResponse::success(comments))
}

/// PUT /api/comments/:id (admin) - moderate: pending -> approved/rejected
pub async fn update(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Path(id): Path<i64>,
    Json(input): Json<ModerateInput>,
) -> ApiResult<Comment> {
    if !comment::is_valid_status(&input.status) {
        return Err(ApiError::bad_request(format!(
            "invalid comment status '{}'",
            input.status
        )));
    }

    let sql = format!(
        "UPDATE comments SET status = $1 WHERE id = $2 RETURNING {}",
        COMMENT_COLUMNS
    );
    let updated = sqlx::query_as::<_, Comment>(&sql)
        .bind(&input.status)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("comment not found"))?;

    tracing::info!("admin {} set comment {} to {}", admin.username, id, updated.status);
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/comments/:id (admin)
pub async fn delete(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let result = sqlx::query("DELETE FROM comments WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("comment not found"));
    }

    tracing::info!("admin {} deleted comment {}", admin.username, id);
    Ok(ApiResponse::message("comment deleted"))
}

async fn ensure_post_exists(state: &AppState, post_id: i64) -> Result<(), ApiError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM posts WHERE id = $1")
        .bind(post_id)
        .fetch_optional(&state.pool)
        .await?;
    match exists {
        Some(_) => Ok(()),
        None => Err(ApiError::not_found("post not found")),
    }
}
