use axum::extract::State;
use serde::Deserialize;

use crate::database::models::{post, Post};
use crate::error::ApiError;
use crate::extract::{Json, Path, Query};
use crate::handlers::require_fields;
use crate::middleware::auth::{AdminIdentity, MaybeAdmin};
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::slug::slugify;
use crate::state::AppState;

const POST_COLUMNS: &str = "id, title, slug, tags, excerpt, content, status, \
     author_name, author_email, featured_image, views, created_at, updated_at";

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostInput {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub excerpt: String,
    pub status: Option<String>,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub featured_image: String,
}

impl PostInput {
    fn status(&self) -> Result<&str, ApiError> {
        match self.status.as_deref() {
            None => Ok(post::STATUS_DRAFT),
            Some(s) if post::is_valid_status(s) => Ok(s),
            Some(s) => Err(ApiError::bad_request(format!("invalid post status '{}'", s))),
        }
    }
}

/// GET /api/posts - newest first; the public sees published posts only,
/// admins see everything and may filter by status
pub async fn list(
    State(state): State<AppState>,
    requester: MaybeAdmin,
    Query(query): Query<ListQuery>,
) -> ApiResult<Vec<Post>> {
    let posts = if requester.is_admin() {
        match query.status.as_deref() {
            Some(status) if post::is_valid_status(status) => {
                let sql = format!(
                    "SELECT {} FROM posts WHERE status = $1 ORDER BY created_at DESC",
                    POST_COLUMNS
                );
                sqlx::query_as::<_, Post>(&sql)
                    .bind(status)
                    .fetch_all(&state.pool)
                    .await?
            }
            Some(status) => {
                return Err(ApiError::bad_request(format!("invalid post status '{}'", status)))
            }
            None => {
                let sql = format!("SELECT {} FROM posts ORDER BY created_at DESC", POST_COLUMNS);
                sqlx::query_as::<_, Post>(&sql).fetch_all(&state.pool).await?
            }
        }
    } else {
        let sql = format!(
            "SELECT {} FROM posts WHERE status = $1 ORDER BY created_at DESC",
            POST_COLUMNS
        );
        sqlx::query_as::<_, Post>(&sql)
            .bind(post::STATUS_PUBLISHED)
            .fetch_all(&state.pool)
            .await?
    };

    Ok(ApiResponse::success(posts))
}

/// GET /api/posts/:id
pub async fn get(
    State(state): State<AppState>,
    requester: MaybeAdmin,
    Path(id): Path<i64>,
) -> ApiResult<Post> {
    let sql = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
    let found = sqlx::query_as::<_, Post>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?;
    serve_post(&state, requester, found).await
}

/// GET /api/posts/slug/:slug
pub async fn get_by_slug(
    State(state): State<AppState>,
    requester: MaybeAdmin,
    Path(slug): Path<String>,
) -> ApiResult<Post> {
    let sql = format!("SELECT {} FROM posts WHERE slug = $1", POST_COLUMNS);
    let found = sqlx::query_as::<_, Post>(&sql)
        .bind(&slug)
        .fetch_optional(&state.pool)
        .await?;
    serve_post(&state, requester, found).await
}

/// Shared visibility + view-count logic for single-post reads. A public read
/// of a published post bumps the counter with a single UPDATE; concurrent
/// reads may under-count, which is acceptable for a view counter.
async fn serve_post(
    state: &AppState,
    requester: MaybeAdmin,
    found: Option<Post>,
) -> ApiResult<Post> {
    let mut post = found.ok_or_else(|| ApiError::not_found("post not found"))?;

    if !requester.is_admin() {
        if post.status != post::STATUS_PUBLISHED {
            return Err(ApiError::not_found("post not found"));
        }
        sqlx::query("UPDATE posts SET views = views + 1 WHERE id = $1")
            .bind(post.id)
            .execute(&state.pool)
            .await?;
        post.views += 1;
    }

    Ok(ApiResponse::success(post))
}

/// POST /api/posts (admin) - slug is derived from the title
pub async fn create(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Json(input): Json<PostInput>,
) -> ApiResult<Post> {
    require_fields(&[("title", &input.title), ("content", &input.content)])?;
    let status = input.status()?.to_string();
    let slug = slugify(&input.title);

    let sql = format!(
        "INSERT INTO posts (title, slug, tags, excerpt, content, status, \
         author_name, author_email, featured_image) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {}",
        POST_COLUMNS
    );
    let created = sqlx::query_as::<_, Post>(&sql)
        .bind(&input.title)
        .bind(&slug)
        .bind(&input.tags)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(&status)
        .bind(&input.author_name)
        .bind(&input.author_email)
        .bind(&input.featured_image)
        .fetch_one(&state.pool)
        .await?;

    tracing::info!("admin {} created post {} ({})", admin.username, created.id, created.slug);
    Ok(ApiResponse::created(created))
}

/// PUT /api/posts/:id (admin) - updates all mutable fields and touches
/// updated_at; the slug is re-derived only when the title changes
pub async fn update(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Path(id): Path<i64>,
    Json(input): Json<PostInput>,
) -> ApiResult<Post> {
    require_fields(&[("title", &input.title), ("content", &input.content)])?;
    let status = input.status()?.to_string();

    let sql = format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS);
    let existing = sqlx::query_as::<_, Post>(&sql)
        .bind(id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("post not found"))?;

    let slug = if input.title == existing.title {
        existing.slug.clone()
    } else {
        slugify(&input.title)
    };

    let sql = format!(
        "UPDATE posts SET title = $1, slug = $2, tags = $3, excerpt = $4, content = $5, \
         status = $6, author_name = $7, author_email = $8, featured_image = $9, \
         updated_at = now() WHERE id = $10 RETURNING {}",
        POST_COLUMNS
    );
    let updated = sqlx::query_as::<_, Post>(&sql)
        .bind(&input.title)
        .bind(&slug)
        .bind(&input.tags)
        .bind(&input.excerpt)
        .bind(&input.content)
        .bind(&status)
        .bind(&input.author_name)
        .bind(&input.author_email)
        .bind(&input.featured_image)
        .bind(id)
        .fetch_one(&state.pool)
        .await?;

    tracing::info!("admin {} updated post {}", admin.username, id);
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/posts/:id (admin)
pub async fn delete(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let result = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("post not found"));
    }

    tracing::info!("admin {} deleted post {}", admin.username, id);
    Ok(ApiResponse::message("post deleted"))
}
