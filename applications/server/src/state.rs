/// Shared application state
use crate::services::{AuthService, MediaStorage};
use cadence_cache::Cache;
use cadence_storage::Database;
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth_service: Arc<AuthService>,
    pub media: Arc<MediaStorage>,
    pub cache: Arc<dyn Cache>,
    /// Lifetime of cached responses
    pub cache_ttl: Duration,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(
        db: Arc<Database>,
        auth_service: Arc<AuthService>,
        media: Arc<MediaStorage>,
        cache: Arc<dyn Cache>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            db,
            auth_service,
            media,
            cache,
            cache_ttl,
            secure_cookies: false,
        }
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}
