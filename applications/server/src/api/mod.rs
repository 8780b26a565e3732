/// API route modules
pub mod admin;
pub mod albums;
pub mod artists;
pub mod auth;
pub mod genres;
pub mod index;
pub mod links;
pub mod music;
pub mod news;
pub mod playlists;
pub mod users;

use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use cadence_core::{PageParams, UserId};
use cadence_storage::admins;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// JSON request body whose rejections render as `{"error": ...}` with 400
#[derive(Debug)]
pub struct JsonBody<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

/// `?page=&limit=` of list endpoints. Kept as raw strings so bad values
/// produce the usual JSON error instead of a query rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn params(&self) -> Result<PageParams> {
        Ok(PageParams::from_query(
            self.page.as_deref(),
            self.limit.as_deref(),
        )?)
    }
}

/// Trimmed value, `None` when blank
pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn cache_get<T: DeserializeOwned>(state: &AppState, key: &str) -> Option<T> {
    cadence_cache::get_json(state.cache.as_ref(), key).await
}

async fn cache_set<T: Serialize + ?Sized>(state: &AppState, key: &str, value: &T) {
    cadence_cache::set_json(state.cache.as_ref(), key, value, state.cache_ttl).await;
}

async fn invalidate(state: &AppState, patterns: &[String]) {
    cadence_cache::invalidate(state.cache.as_ref(), patterns).await;
}

async fn invalidate_kind(state: &AppState, kind: cadence_cache::EntityKind) {
    cadence_cache::invalidate_kind(state.cache.as_ref(), kind).await;
}

/// Owners may always act; anyone else needs an admin grant
async fn ensure_owner_or_admin(
    state: &AppState,
    is_owner: bool,
    user_id: &UserId,
    message: &str,
) -> Result<()> {
    if is_owner || admins::is_admin(state.db.pool(), user_id).await? {
        return Ok(());
    }
    tracing::warn!(user_id = %user_id, "{}", message);
    Err(ServerError::forbidden(message))
}
