use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::session::SessionStore;
use crate::config::AppConfig;

/// Shared state handed to every handler. The pool and session store are the
/// only mutable resources in the process; handlers themselves are stateless.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub sessions: SessionStore,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, config: AppConfig) -> Self {
        Self {
            pool,
            sessions: SessionStore::new(),
            config: Arc::new(config),
        }
    }
}
