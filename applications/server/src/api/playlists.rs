/// Playlists API routes
use super::{
    cache_get, cache_set, invalidate, invalidate_kind,
    links::{links, page_links},
    non_empty, JsonBody, PageQuery,
};
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use cadence_cache::{keys, EntityKind};
use cadence_core::{
    paginate, validation::format_duration, CreatePlaylist, Playlist, PlaylistId, TrackDetails,
    TrackId, UpdatePlaylist,
};
use cadence_storage::{playlists, tracks};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashSet;

#[derive(Debug, Deserialize)]
pub struct PlaylistRequest {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddMusicRequest {
    #[serde(default)]
    pub music_ids: Vec<String>,
}

fn playlist_links(id: &PlaylistId) -> Value {
    links(
        &format!("/playlists/{id}"),
        &[
            ("music", format!("/playlists/{id}/music")),
            ("collection", "/playlists".to_string()),
        ],
    )
}

fn playlist_summary(playlist: &Playlist) -> Value {
    json!({
        "id": playlist.id,
        "name": playlist.name,
        "description": playlist.description,
        "owner": playlist.user_id,
        "_links": playlist_links(&playlist.id),
    })
}

fn entry_json(details: &TrackDetails) -> Value {
    let track = &details.track;
    json!({
        "id": track.id,
        "title": track.title,
        "duration": format_duration(track.duration_seconds),
        "artist": details.artist_name,
        "album": details.album_title,
        "fileUrl": track.file_url,
        "_links": links(&format!("/music/{}", track.id), &[]),
    })
}

async fn find_playlist(app_state: &AppState, id: &PlaylistId) -> Result<Playlist> {
    playlists::get_by_id(app_state.db.pool(), id)
        .await?
        .ok_or_else(|| ServerError::not_found("Playlist not found"))
}

fn ensure_owner(playlist: &Playlist, auth: &AuthenticatedUser, message: &str) -> Result<()> {
    if playlist.is_owned_by(auth.user_id()) {
        return Ok(());
    }
    tracing::warn!(user_id = %auth.user_id(), playlist_id = %playlist.id, "{}", message);
    Err(ServerError::forbidden(message))
}

/// Drop the playlist itself, its per-user views and every playlist page
async fn invalidate_playlist(app_state: &AppState, id: &PlaylistId) {
    invalidate(app_state, &keys::entity_patterns(EntityKind::Playlist, id)).await;
    invalidate(
        app_state,
        &[format!("{}_list:*", EntityKind::Playlist.plural())],
    )
    .await;
}

/// POST /api/v1/playlists
pub async fn create_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    JsonBody(req): JsonBody<PlaylistRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let name = non_empty(req.name).ok_or_else(|| ServerError::bad_request("Missing name"))?;

    let playlist = playlists::create(
        app_state.db.pool(),
        CreatePlaylist {
            name,
            description: non_empty(req.description),
            user_id: auth.user_id().clone(),
        },
    )
    .await?;

    invalidate_kind(&app_state, EntityKind::Playlist).await;
    tracing::info!(playlist_id = %playlist.id, user_id = %auth.user_id(), "Playlist created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Playlist created successfully",
            "playlistId": playlist.id,
            "_links": playlist_links(&playlist.id),
        })),
    ))
}

/// GET /api/v1/playlists
pub async fn list_playlists(
    State(app_state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let params = query.params()?;

    let cache_key = keys::list(EntityKind::Playlist, params.page, params.limit);
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let page = paginate(playlists::get_all(app_state.db.pool()).await?, params);
    let body = json!({
        "playlists": page.items.iter().map(playlist_summary).collect::<Vec<_>>(),
        "total_count": page.total,
        "page": page.page,
        "limit": page.limit,
        "_links": page_links("/playlists", &page, &[]),
    });

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// GET /api/v1/playlists/:id
pub async fn get_playlist(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let playlist_id = PlaylistId::new(id);

    let cache_key = keys::entity(EntityKind::Playlist, &playlist_id);
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let playlist = find_playlist(&app_state, &playlist_id).await?;
    let entries = playlists::get_tracks(app_state.db.pool(), &playlist.id).await?;

    let body = json!({
        "playlist": {
            "id": playlist.id,
            "name": playlist.name,
            "description": playlist.description,
            "music": entries.iter().map(entry_json).collect::<Vec<_>>(),
            "_links": playlist_links(&playlist.id),
        }
    });

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// PUT /api/v1/playlists/:id
pub async fn update_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<PlaylistRequest>,
) -> Result<Json<Value>> {
    let playlist = find_playlist(&app_state, &PlaylistId::new(id)).await?;
    ensure_owner(&playlist, &auth, "Unauthorized to update this playlist")?;

    let update = UpdatePlaylist {
        name: non_empty(req.name),
        description: non_empty(req.description),
    };
    playlists::update(app_state.db.pool(), &playlist.id, update)
        .await?
        .ok_or_else(|| ServerError::not_found("Playlist not found"))?;

    invalidate_playlist(&app_state, &playlist.id).await;
    tracing::info!(playlist_id = %playlist.id, "Playlist updated");

    Ok(Json(json!({
        "message": "Playlist updated successfully",
        "_links": playlist_links(&playlist.id),
    })))
}

/// DELETE /api/v1/playlists/:id
pub async fn delete_playlist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let playlist = find_playlist(&app_state, &PlaylistId::new(id)).await?;
    ensure_owner(&playlist, &auth, "Unauthorized to delete this playlist")?;

    if !playlists::delete(app_state.db.pool(), &playlist.id).await? {
        return Err(ServerError::not_found("Playlist not found"));
    }

    invalidate_playlist(&app_state, &playlist.id).await;
    tracing::info!(playlist_id = %playlist.id, "Playlist deleted");

    Ok(Json(json!({
        "message": "Playlist deleted successfully",
        "_links": links("/playlists", &[]),
    })))
}

/// POST /api/v1/playlists/:id/music
///
/// Either every requested track is appended, in request order, or none is.
pub async fn add_music(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<AddMusicRequest>,
) -> Result<Json<Value>> {
    let playlist = find_playlist(&app_state, &PlaylistId::new(id)).await?;
    ensure_owner(&playlist, &auth, "Unauthorized to modify this playlist")?;

    let requested: Vec<TrackId> = req
        .music_ids
        .into_iter()
        .filter_map(|id| non_empty(Some(id)))
        .map(TrackId::new)
        .collect();
    if requested.is_empty() {
        return Err(ServerError::bad_request("No music provided"));
    }

    let pool = app_state.db.pool();
    let mut seen = HashSet::new();
    for track_id in &requested {
        if tracks::get_by_id(pool, track_id).await?.is_none() {
            return Err(ServerError::not_found(format!(
                "Music with id {track_id} not found"
            )));
        }
        if !seen.insert(track_id) || playlists::contains_track(pool, &playlist.id, track_id).await? {
            return Err(ServerError::bad_request("Music already in playlist"));
        }
    }

    playlists::add_tracks(pool, &playlist.id, &requested).await?;
    invalidate_playlist(&app_state, &playlist.id).await;

    tracing::info!(playlist_id = %playlist.id, added = requested.len(), "Music added to playlist");

    Ok(Json(json!({
        "message": "Music added to playlist successfully",
        "_links": playlist_links(&playlist.id),
    })))
}

/// DELETE /api/v1/playlists/:id/music/:music_id
pub async fn remove_music(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path((id, music_id)): Path<(String, String)>,
) -> Result<Json<Value>> {
    let playlist = find_playlist(&app_state, &PlaylistId::new(id)).await?;
    ensure_owner(&playlist, &auth, "Unauthorized to modify this playlist")?;

    let track_id = TrackId::new(music_id);
    if !playlists::remove_track(app_state.db.pool(), &playlist.id, &track_id).await? {
        return Err(ServerError::bad_request("Music not found in the playlist."));
    }

    invalidate_playlist(&app_state, &playlist.id).await;
    tracing::info!(playlist_id = %playlist.id, music_id = %track_id, "Music removed from playlist");

    Ok(Json(json!({
        "message": "Music removed from playlist successfully",
        "_links": playlist_links(&playlist.id),
    })))
}
