use axum::extract::{DefaultBodyLimit, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::CorsConfig;
use crate::database;
use crate::error::ApiError;
use crate::handlers::{applications, auth, comments, gallery, jobs, media, posts};
use crate::state::AppState;

/// Build the full application router. Control flow per request:
/// CORS gate -> session guard (admin routes) -> handler -> pool -> envelope.
pub fn app(state: AppState) -> Router {
    // multipart bodies carry the file plus form fields; leave headroom above
    // the per-file cap, which is enforced separately in upload::validate
    let body_limit = state.config.uploads.max_bytes + 64 * 1024;
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        // Auth
        .route("/api/auth/login", post(auth::login).fallback(method_not_allowed))
        .route("/api/auth/logout", post(auth::logout).fallback(method_not_allowed))
        .route("/api/auth/check", get(auth::check).fallback(method_not_allowed))
        .route(
            "/api/auth/change-password",
            post(auth::change_password).fallback(method_not_allowed),
        )
        // Posts
        .route(
            "/api/posts",
            get(posts::list).post(posts::create).fallback(method_not_allowed),
        )
        .route(
            "/api/posts/:id",
            get(posts::get)
                .put(posts::update)
                .delete(posts::delete)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/posts/slug/:slug",
            get(posts::get_by_slug).fallback(method_not_allowed),
        )
        // Comments
        .route(
            "/api/posts/:id/comments",
            get(comments::list_for_post)
                .post(comments::create_for_post)
                .fallback(method_not_allowed),
        )
        .route("/api/comments", get(comments::list).fallback(method_not_allowed))
        .route(
            "/api/comments/:id",
            put(comments::update)
                .delete(comments::delete)
                .fallback(method_not_allowed),
        )
        // Jobs and applications
        .route(
            "/api/jobs",
            get(jobs::list).post(jobs::create).fallback(method_not_allowed),
        )
        .route(
            "/api/jobs/:id",
            get(jobs::get)
                .put(jobs::update)
                .delete(jobs::delete)
                .fallback(method_not_allowed),
        )
        .route(
            "/api/jobs/:id/apply",
            post(applications::apply).fallback(method_not_allowed),
        )
        .route(
            "/api/applications",
            get(applications::list).fallback(method_not_allowed),
        )
        .route(
            "/api/applications/:id",
            get(applications::get)
                .put(applications::update)
                .delete(applications::delete)
                .fallback(method_not_allowed),
        )
        // Media and gallery
        .route(
            "/api/media",
            get(media::list).post(media::create).fallback(method_not_allowed),
        )
        .route("/api/media/:id", delete(media::delete).fallback(method_not_allowed))
        .route(
            "/api/gallery",
            get(gallery::list).post(gallery::create).fallback(method_not_allowed),
        )
        .route(
            "/api/gallery/:id",
            put(gallery::update)
                .delete(gallery::delete)
                .fallback(method_not_allowed),
        )
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS gate: allow-listed origins with credentials; unparsable entries are
/// dropped. Preflight requests are answered by the layer with 200, no body.
fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Atrium API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "auth": "/api/auth/login|logout|check|change-password",
                "posts": "/api/posts[/:id], /api/posts/slug/:slug",
                "comments": "/api/posts/:id/comments, /api/comments[/:id]",
                "jobs": "/api/jobs[/:id], /api/jobs/:id/apply",
                "applications": "/api/applications[/:id]",
                "media": "/api/media[/:id]",
                "gallery": "/api/gallery[/:id]",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match database::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "database": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "database unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}

async fn not_found() -> ApiError {
    ApiError::not_found("no such endpoint")
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
