//! Lifecycle tests against a real PostgreSQL database, exercising the paths
//! the surface tests cannot reach. They run only when DATABASE_URL is set;
//! otherwise each test returns early so the default suite stays
//! database-free.

use anyhow::{Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use atrium_api::auth;
use atrium_api::config::AppConfig;
use atrium_api::database;
use atrium_api::routes;
use atrium_api::state::AppState;

async fn db_app() -> Result<Option<(Router, AppState)>> {
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping");
        return Ok(None);
    }

    let config = AppConfig::from_env();
    let pool = database::connect(&config.database).await?;
    database::migrate(&pool).await?;

    let state = AppState::new(pool, config);
    Ok(Some((routes::app(state.clone()), state)))
}

async fn body_json(response: axum::response::Response) -> Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Seed a throwaway admin row and log in through the router, returning the
/// session cookie pair and the username for cleanup.
async fn login_admin(app: &Router, state: &AppState) -> Result<(String, String)> {
    let username = format!("editor-{}", Uuid::new_v4().simple());
    let hash = auth::hash_password("correct horse battery")
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?;

    sqlx::query("INSERT INTO admins (username, password_hash, email) VALUES ($1, $2, $3)")
        .bind(&username)
        .bind(&hash)
        .bind(format!("{}@example.com", username))
        .execute(&state.pool)
        .await?;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "username": username, "password": "correct horse battery" })
                        .to_string(),
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .context("login sets a session cookie")?
        .to_str()?
        .to_string();
    let cookie = set_cookie
        .split(';')
        .next()
        .context("cookie pair")?
        .to_string();

    Ok((cookie, username))
}

async fn remove_admin(state: &AppState, username: &str) -> Result<()> {
    sqlx::query("DELETE FROM admins WHERE username = $1")
        .bind(username)
        .execute(&state.pool)
        .await?;
    Ok(())
}

async fn create_published_post(
    app: &Router,
    cookie: &str,
    title: &str,
) -> Result<(i64, String)> {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/posts")
                .header(header::COOKIE, cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({ "title": title, "content": "body text", "status": "published" })
                        .to_string(),
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await?;
    assert_eq!(body["success"], true);
    let id = body["data"]["id"].as_i64().context("post id")?;
    let slug = body["data"]["slug"]
        .as_str()
        .context("post slug")?
        .to_string();
    Ok((id, slug))
}

#[tokio::test]
async fn login_then_create_post_derives_slug() -> Result<()> {
    let Some((app, state)) = db_app().await? else { return Ok(()) };

    // idempotent across runs: the derived slug is unique in the table
    sqlx::query("DELETE FROM posts WHERE slug = 'my-post'")
        .execute(&state.pool)
        .await?;
    let (cookie, username) = login_admin(&app, &state).await?;

    let (id, slug) = create_published_post(&app, &cookie, "My Post!!").await?;
    assert_eq!(slug, "my-post");

    // publicly resolvable by the derived slug, no cookie
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/posts/slug/my-post").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["data"]["id"], id);
    assert_eq!(body["data"]["title"], "My Post!!");

    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(&state.pool)
        .await?;
    remove_admin(&state, &username).await?;
    Ok(())
}

#[tokio::test]
async fn comment_moderation_lifecycle() -> Result<()> {
    let Some((app, state)) = db_app().await? else { return Ok(()) };
    let (cookie, username) = login_admin(&app, &state).await?;

    let title = format!("Comment Lifecycle {}", Uuid::new_v4().simple());
    let (post_id, _slug) = create_published_post(&app, &cookie, &title).await?;
    let comments_uri = format!("/api/posts/{}/comments", post_id);

    // anonymous submission starts pending
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(comments_uri.as_str())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({
                        "author_name": "Ada",
                        "author_email": "ada@example.com",
                        "body": "first"
                    })
                    .to_string(),
                ))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await?;
    assert_eq!(body["data"]["status"], "pending");
    let comment_id = body["data"]["id"].as_i64().context("comment id")?;

    // pending comments are invisible to the public
    let response = app
        .clone()
        .oneshot(Request::builder().uri(comments_uri.as_str()).body(Body::empty())?)
        .await?;
    let body = body_json(response).await?;
    assert_eq!(body["data"].as_array().context("comment list")?.len(), 0);

    // the moderation view sees it
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(comments_uri.as_str())
                .header(header::COOKIE, cookie.as_str())
                .body(Body::empty())?,
        )
        .await?;
    let body = body_json(response).await?;
    let listed = body["data"].as_array().context("comment list")?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["status"], "pending");

    // approval makes it public
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::PUT)
                .uri(format!("/api/comments/{}", comment_id))
                .header(header::COOKIE, cookie.as_str())
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "status": "approved" }).to_string()))?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(Request::builder().uri(comments_uri.as_str()).body(Body::empty())?)
        .await?;
    let body = body_json(response).await?;
    let listed = body["data"].as_array().context("comment list")?;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], comment_id);
    assert_eq!(listed[0]["status"], "approved");

    // comments cascade with the post
    sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(post_id)
        .execute(&state.pool)
        .await?;
    remove_admin(&state, &username).await?;
    Ok(())
}

#[tokio::test]
async fn deleting_a_missing_resource_is_404() -> Result<()> {
    let Some((app, state)) = db_app().await? else { return Ok(()) };
    let (cookie, username) = login_admin(&app, &state).await?;

    for uri in [
        "/api/posts/999999999",
        "/api/comments/999999999",
        "/api/jobs/999999999",
        "/api/gallery/999999999",
    ] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::DELETE)
                    .uri(uri)
                    .header(header::COOKIE, cookie.as_str())
                    .body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
        let body = body_json(response).await?;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    remove_admin(&state, &username).await?;
    Ok(())
}
