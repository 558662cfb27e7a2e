use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use serde::Serialize;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated admin context resolved from the session cookie.
#[derive(Clone, Debug, Serialize)]
pub struct AdminIdentity {
    pub admin_id: i64,
    pub username: String,
}

/// Session guard: admin-only handlers take this extractor; a request without
/// a valid session is rejected with 401 before the handler body runs.
#[async_trait]
impl FromRequestParts<AppState> for AdminIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        match resolve_identity(parts, state).await {
            Some(identity) => Ok(identity),
            None => {
                tracing::debug!("rejected unauthenticated request to {}", parts.uri.path());
                Err(ApiError::unauthorized("authentication required"))
            }
        }
    }
}

/// Optional variant for public endpoints whose visibility widens for admins
/// (draft posts, pending comments, inactive jobs).
#[derive(Clone, Debug)]
pub struct MaybeAdmin(pub Option<AdminIdentity>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeAdmin {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeAdmin(resolve_identity(parts, state).await))
    }
}

impl MaybeAdmin {
    pub fn is_admin(&self) -> bool {
        self.0.is_some()
    }
}

async fn resolve_identity(parts: &Parts, state: &AppState) -> Option<AdminIdentity> {
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie = jar
        .get(&state.config.session.cookie_name)
        .filter(|c| !c.value().is_empty())?;
    let session = state.sessions.resolve(cookie.value()).await?;
    Some(AdminIdentity {
        admin_id: session.admin_id,
        username: session.username,
    })
}
