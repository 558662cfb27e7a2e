use chrono::{DateTime, Duration, Utc};
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A server-side session established by a successful admin login.
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub admin_id: i64,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// In-memory session store keyed by random token. The token travels in an
/// HttpOnly cookie; the identity it maps to never leaves the server.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, AdminSession>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session and return its token.
    pub async fn create(&self, admin_id: i64, username: &str, ttl: Duration) -> String {
        let token = generate_token();
        let now = Utc::now();
        let session = AdminSession {
            admin_id,
            username: username.to_string(),
            issued_at: now,
            expires_at: now + ttl,
        };
        self.sessions.write().await.insert(token.clone(), session);
        token
    }

    /// Resolve a token to its session. Expired sessions are treated as absent
    /// and purged lazily.
    pub async fn resolve(&self, token: &str) -> Option<AdminSession> {
        let expired = {
            let sessions = self.sessions.read().await;
            match sessions.get(token) {
                Some(session) if session.expires_at > Utc::now() => return Some(session.clone()),
                Some(_) => true,
                None => false,
            }
        };

        if expired {
            self.sessions.write().await.remove(token);
        }
        None
    }

    /// Destroy a session. Returns whether it existed.
    pub async fn revoke(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }
}

/// 128-bit random token, hex-encoded.
fn generate_token() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_resolve_revoke() {
        let store = SessionStore::new();
        let token = store.create(1, "admin", Duration::hours(1)).await;

        let session = store.resolve(&token).await.expect("session should resolve");
        assert_eq!(session.admin_id, 1);
        assert_eq!(session.username, "admin");

        assert!(store.revoke(&token).await);
        assert!(store.resolve(&token).await.is_none());
        assert!(!store.revoke(&token).await);
    }

    #[tokio::test]
    async fn expired_sessions_do_not_resolve() {
        let store = SessionStore::new();
        let token = store.create(1, "admin", Duration::seconds(-1)).await;
        assert!(store.resolve(&token).await.is_none());
        // lazily purged on the failed resolve
        assert!(!store.revoke(&token).await);
    }

    #[tokio::test]
    async fn unknown_token_does_not_resolve() {
        let store = SessionStore::new();
        assert!(store.resolve("deadbeef").await.is_none());
    }

    #[test]
    fn tokens_are_long_random_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
