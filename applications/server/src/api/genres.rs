/// Genres API routes
///
/// Listing is public; the write routes are mounted under `/admin/genres`.
use super::{cache_get, cache_set, invalidate_kind, links::links, non_empty, JsonBody};
use crate::{
    error::{Result, ServerError},
    middleware::AdminUser,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cadence_cache::EntityKind;
use cadence_core::{Genre, GenreId};
use cadence_storage::genres;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct GenreRequest {
    pub name: Option<String>,
}

fn genre_json(genre: &Genre) -> Value {
    json!({ "id": genre.id, "name": genre.name })
}

fn all_genres_key() -> String {
    format!("{}_list:all", EntityKind::Genre.plural())
}

/// Genre lists and every track response carry genre names
async fn invalidate_genres(app_state: &AppState) {
    invalidate_kind(app_state, EntityKind::Genre).await;
    invalidate_kind(app_state, EntityKind::Music).await;
}

/// GET /api/v1/genres
pub async fn list_genres(State(app_state): State<AppState>) -> Result<Json<Value>> {
    let cache_key = all_genres_key();
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let all = genres::get_all(app_state.db.pool()).await?;
    let body = Value::Array(all.iter().map(genre_json).collect());

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// POST /api/v1/admin/genres
pub async fn create_genre(
    State(app_state): State<AppState>,
    admin: AdminUser,
    JsonBody(req): JsonBody<GenreRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let name = non_empty(req.name).ok_or_else(|| ServerError::bad_request("Genre name is required"))?;

    let pool = app_state.db.pool();
    if genres::find_by_name(pool, &name).await?.is_some() {
        tracing::warn!(admin = %admin.user_id(), "Attempted to add an existing genre: {}", name);
        return Err(ServerError::bad_request("Genre already exists"));
    }

    let genre = genres::create(pool, &name).await?;
    invalidate_genres(&app_state).await;

    tracing::info!(admin = %admin.user_id(), genre_id = %genre.id, "Genre added: {}", name);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Genre added successfully",
            "id": genre.id,
            "_links": links(&format!("/admin/genres/{}", genre.id), &[("collection", "/genres".to_string())]),
        })),
    ))
}

/// PUT /api/v1/admin/genres/:id
pub async fn update_genre(
    State(app_state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<GenreRequest>,
) -> Result<Json<Value>> {
    let genre_id = GenreId::new(id);
    let pool = app_state.db.pool();

    genres::get_by_id(pool, &genre_id)
        .await?
        .ok_or_else(|| ServerError::not_found("Genre not found"))?;

    let name = non_empty(req.name).ok_or_else(|| ServerError::bad_request("Genre name is required"))?;

    if let Some(existing) = genres::find_by_name(pool, &name).await? {
        if existing.id != genre_id {
            return Err(ServerError::bad_request("Genre already exists"));
        }
    }

    genres::rename(pool, &genre_id, &name)
        .await?
        .ok_or_else(|| ServerError::not_found("Genre not found"))?;
    invalidate_genres(&app_state).await;

    tracing::info!(admin = %admin.user_id(), genre_id = %genre_id, "Genre renamed to {}", name);

    Ok(Json(json!({
        "message": "Genre updated successfully",
        "_links": links(&format!("/admin/genres/{genre_id}"), &[("collection", "/genres".to_string())]),
    })))
}

/// DELETE /api/v1/admin/genres/:id
pub async fn delete_genre(
    State(app_state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let genre_id = GenreId::new(id);
    let pool = app_state.db.pool();

    genres::get_by_id(pool, &genre_id)
        .await?
        .ok_or_else(|| ServerError::not_found("Genre not found"))?;

    if genres::track_count(pool, &genre_id).await? > 0 {
        return Err(ServerError::bad_request("Genre is in use"));
    }

    genres::delete(pool, &genre_id).await?;
    invalidate_genres(&app_state).await;

    tracing::info!(admin = %admin.user_id(), genre_id = %genre_id, "Genre deleted");

    Ok(Json(json!({
        "message": "Genre deleted successfully",
        "_links": links("/genres", &[]),
    })))
}
