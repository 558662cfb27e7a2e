use axum::extract::State;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::database::models::Admin;
use crate::error::ApiError;
use crate::extract::Json;
use crate::middleware::auth::AdminIdentity;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::state::AppState;

const ADMIN_COLUMNS: &str = "id, username, password_hash, email, created_at";

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// POST /api/auth/login - establish an admin session
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, ApiResponse<Value>), ApiError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::validation_error("username and password are required", None));
    }

    let sql = format!("SELECT {} FROM admins WHERE username = $1", ADMIN_COLUMNS);
    let admin = sqlx::query_as::<_, Admin>(&sql)
        .bind(&req.username)
        .fetch_optional(&state.pool)
        .await?;

    // Unknown user and wrong password get the same rejection.
    let admin = match admin {
        Some(admin) if auth::verify_password(&req.password, &admin.password_hash) => admin,
        _ => return Err(ApiError::unauthorized("invalid credentials")),
    };

    let ttl = Duration::hours(state.config.session.ttl_hours as i64);
    let token = state.sessions.create(admin.id, &admin.username, ttl).await;

    let cookie = Cookie::build((state.config.session.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();

    tracing::info!("admin {} logged in", admin.username);

    Ok((
        jar.add(cookie),
        ApiResponse::success(json!({
            "id": admin.id,
            "username": admin.username,
            "email": admin.email,
        })),
    ))
}

/// POST /api/auth/logout - destroy the current session
pub async fn logout(
    State(state): State<AppState>,
    admin: AdminIdentity,
    jar: CookieJar,
) -> Result<(CookieJar, ApiResponse<()>), ApiError> {
    if let Some(cookie) = jar.get(&state.config.session.cookie_name) {
        state.sessions.revoke(cookie.value()).await;
    }

    let removal = Cookie::build(state.config.session.cookie_name.clone())
        .path("/")
        .build();

    tracing::info!("admin {} logged out", admin.username);
    Ok((jar.remove(removal), ApiResponse::message("logged out")))
}

/// GET /api/auth/check - report the authenticated identity
pub async fn check(admin: AdminIdentity) -> ApiResult<AdminIdentity> {
    Ok(ApiResponse::success(admin))
}

/// POST /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    admin: AdminIdentity,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<()> {
    if req.new_password.len() < 8 {
        return Err(ApiError::validation_error(
            "new password must be at least 8 characters",
            None,
        ));
    }

    let sql = format!("SELECT {} FROM admins WHERE id = $1", ADMIN_COLUMNS);
    let row = sqlx::query_as::<_, Admin>(&sql)
        .bind(admin.admin_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| ApiError::unauthorized("invalid credentials"))?;

    if !auth::verify_password(&req.current_password, &row.password_hash) {
        return Err(ApiError::unauthorized("invalid credentials"));
    }

    let hash = auth::hash_password(&req.new_password).map_err(|e| {
        tracing::error!("password hashing failed: {}", e);
        ApiError::internal_server_error("an error occurred while processing your request")
    })?;

    sqlx::query("UPDATE admins SET password_hash = $1 WHERE id = $2")
        .bind(&hash)
        .bind(admin.admin_id)
        .execute(&state.pool)
        .await?;

    tracing::info!("admin {} changed password", admin.username);
    Ok(ApiResponse::message("password updated"))
}
