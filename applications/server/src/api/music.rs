/// Music (track) API routes
use super::{
    cache_get, cache_set, ensure_owner_or_admin, invalidate_kind,
    links::{links, page_links},
    non_empty,
};
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    services::{ImageKind, MultipartForm},
    state::AppState,
};
use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use cadence_cache::{keys, EntityKind};
use cadence_core::{
    paginate,
    validation::{format_duration, parse_duration, parse_release_date},
    AlbumId, CreateTrack, PageParams, Track, TrackDetails, TrackFilter, TrackId,
};
use cadence_storage::{albums, artists, genres, tracks};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

#[derive(Debug, Default, Deserialize)]
pub struct MusicListQuery {
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

fn music_links(track: &Track) -> Value {
    let id = &track.id;
    let mut related = vec![
        ("stream", format!("/music/{id}/stream")),
        ("cover_image", format!("/music/{id}/cover-image")),
        ("artist", format!("/artists/{}", track.artist_id)),
    ];
    if let Some(album_id) = &track.album_id {
        related.push(("album", format!("/albums/{album_id}")));
    }
    links(&format!("/music/{id}"), &related)
}

/// Public representation of a track. The cover falls back to the album's.
pub(crate) fn music_json(details: &TrackDetails, album_cover: Option<&str>) -> Value {
    let track = &details.track;
    let upload_date: String = track.created_at.chars().take(10).collect();

    json!({
        "id": track.id,
        "title": track.title,
        "artist": details.artist_name,
        "album": details.album_title,
        "genre": details.genre_name,
        "duration": format_duration(track.duration_seconds),
        "releaseDate": track.release_date,
        "releaseType": track.release_type,
        "description": track.description,
        "fileUrl": track.file_url,
        "coverImageUrl": track.cover_image_url.as_deref().or(album_cover),
        "uploadDate": upload_date,
        "_links": music_links(track),
    })
}

/// Album id to cover url, for rendering many tracks at once
pub(crate) async fn album_covers(app_state: &AppState) -> Result<HashMap<AlbumId, String>> {
    Ok(albums::get_all(app_state.db.pool())
        .await?
        .into_iter()
        .filter_map(|album| album.cover_image_url.map(|url| (album.id, url)))
        .collect())
}

pub(crate) fn render_tracks(items: &[TrackDetails], covers: &HashMap<AlbumId, String>) -> Vec<Value> {
    items
        .iter()
        .map(|details| {
            let cover = details
                .track
                .album_id
                .as_ref()
                .and_then(|id| covers.get(id))
                .map(String::as_str);
            music_json(details, cover)
        })
        .collect()
}

pub(crate) async fn find_track(app_state: &AppState, id: &TrackId) -> Result<Track> {
    tracks::get_by_id(app_state.db.pool(), id)
        .await?
        .ok_or_else(|| ServerError::not_found("Music not found"))
}

/// POST /api/v1/music/upload
///
/// Multipart fields: `title`, `genre`, `artist`, `duration` (MM:SS), `file`,
/// optional `album`, `release_date` and `description`.
pub async fn upload_music(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>)> {
    let mut form = MultipartForm::parse(&headers, body).await?;

    let (Some(title), Some(genre_name), Some(file)) = (
        form.text("title").map(str::to_string),
        form.text("genre").map(str::to_string),
        form.file.take(),
    ) else {
        tracing::error!(user_id = %auth.user_id(), "Upload failed: missing required fields");
        return Err(ServerError::bad_request("Missing required fields"));
    };

    let pool = app_state.db.pool();
    let artist_name = form.text("artist").unwrap_or_default();

    // Prefer the caller's own artist when several share a name
    let artist = match artists::get_by_owner(pool, auth.user_id())
        .await?
        .into_iter()
        .find(|a| a.name == artist_name)
    {
        Some(artist) => artist,
        None => {
            let other = artists::find_by_name(pool, artist_name).await?;
            return Err(match other {
                Some(_) => {
                    tracing::error!(user_id = %auth.user_id(), "Unauthorized upload for artist {}", artist_name);
                    ServerError::forbidden("Unauthorized: You are not the owner of this artist")
                }
                None => ServerError::not_found("Artist not found"),
            });
        }
    };

    let duration_seconds = parse_duration(form.text("duration").unwrap_or_default())?;

    let release_date = form
        .text("release_date")
        .map(|raw| parse_release_date(raw).map(|d| d.format("%Y-%m-%d").to_string()))
        .transpose()?;

    let album = match form.text("album") {
        Some(album_title) => Some(
            albums::find_by_title(pool, &artist.id, album_title)
                .await?
                .ok_or_else(|| ServerError::not_found("Album not found"))?,
        ),
        None => None,
    };

    let genre = genres::find_by_name(pool, &genre_name)
        .await?
        .ok_or_else(|| ServerError::not_found("Genre not found"))?;

    let filename = file.filename.as_deref().unwrap_or_default();
    let file_url = app_state.media.store_audio(filename, &file.data).await?;

    let created = tracks::create(
        pool,
        CreateTrack {
            title: title.clone(),
            artist_id: artist.id.clone(),
            album_id: album.map(|a| a.id),
            genre_id: genre.id,
            file_url: file_url.clone(),
            duration_seconds,
            release_date,
            description: form.text("description").map(str::to_string),
        },
    )
    .await;

    let track = match created {
        Ok(track) => track,
        Err(e) => {
            app_state.media.remove(&file_url).await;
            return Err(e.into());
        }
    };

    invalidate_kind(&app_state, EntityKind::Music).await;
    tracing::info!(user_id = %auth.user_id(), music_id = %track.id, "Music {} uploaded", title);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Music uploaded successfully",
            "musicId": track.id,
            "_links": music_links(&track),
        })),
    ))
}

/// GET /api/v1/music/:id
pub async fn get_music(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let track_id = TrackId::new(id);

    let cache_key = keys::entity(EntityKind::Music, &track_id);
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let pool = app_state.db.pool();
    let details = tracks::get_details(pool, &track_id)
        .await?
        .ok_or_else(|| ServerError::not_found("Music not found"))?;

    let album_cover = match &details.track.album_id {
        Some(album_id) => albums::get_by_id(pool, album_id)
            .await?
            .and_then(|a| a.cover_image_url),
        None => None,
    };

    let body = music_json(&details, album_cover.as_deref());

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// GET /api/v1/music/:id/stream
pub async fn stream_music(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let track = tracks::get_by_id(app_state.db.pool(), &TrackId::new(id))
        .await?
        .ok_or_else(|| ServerError::not_found("Music file not found"))?;

    let path = app_state.media.resolve(&track.file_url).await?;
    let file = File::open(&path).await?;
    let file_size = file.metadata().await?.len();

    tracing::info!(music_id = %track.id, "Streaming music");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .header(header::CONTENT_LENGTH, file_size)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ServerError::Internal(format!("Failed to build response: {e}")))
}

/// GET /api/v1/music?genre=&artist=&album=&page=&limit=
pub async fn list_music(
    State(app_state): State<AppState>,
    Query(query): Query<MusicListQuery>,
) -> Result<Json<Value>> {
    let params = PageParams::from_query(query.page.as_deref(), query.limit.as_deref())?;
    let filter = TrackFilter {
        genre: non_empty(query.genre),
        artist: non_empty(query.artist),
        album: non_empty(query.album),
    };

    let cache_key = if filter.is_empty() {
        keys::list(EntityKind::Music, params.page, params.limit)
    } else {
        keys::filtered_list(EntityKind::Music, params.page, params.limit, &filter.cache_suffix())
    };
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let matching = tracks::filter(app_state.db.pool(), &filter).await?;
    let page = paginate(matching, params);
    let covers = album_covers(&app_state).await?;

    let body = json!({
        "music": render_tracks(&page.items, &covers),
        "total": page.total,
        "page": page.page,
        "limit": page.limit,
        "_links": page_links(
            "/music",
            &page,
            &[
                ("genre", filter.genre.as_deref()),
                ("artist", filter.artist.as_deref()),
                ("album", filter.album.as_deref()),
            ],
        ),
    });

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// POST /api/v1/music/search
///
/// The raw request body is the query text.
pub async fn search_music(State(app_state): State<AppState>, query: String) -> Result<Json<Value>> {
    let query = query.trim();
    if query.is_empty() {
        tracing::warn!("Search request without a query");
        return Err(ServerError::bad_request("No search query provided"));
    }

    let found = tracks::search(app_state.db.pool(), query).await?;
    if found.is_empty() {
        return Err(ServerError::not_found("No music found"));
    }

    let covers = album_covers(&app_state).await?;
    tracing::info!(matches = found.len(), "Search completed");

    Ok(Json(Value::Array(render_tracks(&found, &covers))))
}

/// POST /api/v1/music/:id/cover-image
pub async fn update_cover_image(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let track = find_track(&app_state, &TrackId::new(id)).await?;
    let owns = artists::get_by_id(app_state.db.pool(), &track.artist_id)
        .await?
        .is_some_and(|artist| artist.is_owned_by(auth.user_id()));
    ensure_owner_or_admin(&app_state, owns, auth.user_id(), "Unauthorized to update this music").await?;

    let mut form = MultipartForm::parse(&headers, body).await?;
    let file = form.require_file()?;

    let url = app_state
        .media
        .store_image(ImageKind::MusicCover, file.filename.as_deref(), file.data)
        .await?;

    tracks::set_cover_image(app_state.db.pool(), &track.id, &url).await?;
    if let Some(old) = &track.cover_image_url {
        app_state.media.remove(old).await;
    }

    invalidate_kind(&app_state, EntityKind::Music).await;
    invalidate_kind(&app_state, EntityKind::Playlist).await;

    Ok(Json(json!({
        "message": "Cover image updated successfully",
        "coverImageUrl": url,
        "_links": music_links(&track),
    })))
}

/// Delete a track and its files. Used by the admin routes.
pub(crate) async fn remove_track(app_state: &AppState, track: &Track) -> Result<()> {
    if !tracks::delete(app_state.db.pool(), &track.id).await? {
        return Err(ServerError::not_found("Music not found"));
    }

    app_state.media.remove(&track.file_url).await;
    if let Some(url) = &track.cover_image_url {
        app_state.media.remove(url).await;
    }

    invalidate_kind(app_state, EntityKind::Music).await;
    invalidate_kind(app_state, EntityKind::Playlist).await;

    tracing::info!(music_id = %track.id, "Music deleted");
    Ok(())
}
