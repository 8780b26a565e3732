/// Albums API routes
///
/// Albums are immutable once created apart from their cover image; admins
/// delete them through `/admin/albums/:id`.
use super::{
    cache_get, cache_set, ensure_owner_or_admin, invalidate_kind,
    links::{links, page_links},
    non_empty, JsonBody, PageQuery,
};
use crate::{
    error::{Result, ServerError},
    middleware::AuthenticatedUser,
    services::{ImageKind, MultipartForm},
    state::AppState,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use cadence_cache::{keys, EntityKind};
use cadence_core::{paginate, validation::parse_release_date, Album, AlbumId, ArtistId, CreateAlbum};
use cadence_storage::{albums, artists};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

const RELEASE_DATE_ERROR: &str = "Invalid release date format, use YYYY-MM-DD";

#[derive(Debug, Deserialize)]
pub struct CreateAlbumQuery {
    pub artist_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateAlbumRequest {
    pub title: Option<String>,
    pub release_date: Option<String>,
    pub description: Option<String>,
}

fn album_links(id: &AlbumId) -> Value {
    links(
        &format!("/albums/{id}"),
        &[
            ("cover_image", format!("/albums/{id}/cover-image")),
            ("collection", "/albums".to_string()),
        ],
    )
}

fn album_json(album: &Album, artist_name: Option<&str>) -> Value {
    json!({
        "id": album.id,
        "title": album.title,
        "artist": {
            "id": album.artist_id,
            "name": artist_name,
        },
        "releaseDate": album.release_date,
        "cover_image_url": album.cover_image_url,
        "description": album.description,
        "_links": album_links(&album.id),
    })
}

pub(crate) async fn find_album(app_state: &AppState, id: &AlbumId) -> Result<Album> {
    albums::get_by_id(app_state.db.pool(), id)
        .await?
        .ok_or_else(|| ServerError::not_found("Album not found"))
}

/// POST /api/v1/albums?artist_id=
pub async fn create_album(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<CreateAlbumQuery>,
    JsonBody(req): JsonBody<CreateAlbumRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let pool = app_state.db.pool();

    let artist = match non_empty(query.artist_id) {
        Some(id) => artists::get_by_id(pool, &ArtistId::new(id)).await?,
        None => None,
    }
    .ok_or_else(|| ServerError::not_found("Artist not found"))?;

    if !artist.is_owned_by(auth.user_id()) {
        tracing::warn!(user_id = %auth.user_id(), artist_id = %artist.id, "Album creation refused");
        return Err(ServerError::forbidden("Unauthorized"));
    }

    let title = non_empty(req.title).ok_or_else(|| ServerError::bad_request("Missing album title"))?;

    let release_date = match non_empty(req.release_date) {
        Some(raw) => Some(
            parse_release_date(&raw)
                .map_err(|_| ServerError::bad_request(RELEASE_DATE_ERROR))?
                .format("%Y-%m-%d")
                .to_string(),
        ),
        None => None,
    };

    let album = albums::create(
        pool,
        CreateAlbum {
            title,
            artist_id: artist.id.clone(),
            release_date,
            description: non_empty(req.description),
        },
    )
    .await?;

    invalidate_kind(&app_state, EntityKind::Album).await;
    tracing::info!(album_id = %album.id, artist_id = %artist.id, "Album created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Album created successfully",
            "albumId": album.id,
            "_links": album_links(&album.id),
        })),
    ))
}

/// GET /api/v1/albums
pub async fn list_albums(
    State(app_state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let params = query.params()?;

    let cache_key = keys::list(EntityKind::Album, params.page, params.limit);
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let pool = app_state.db.pool();
    let names: HashMap<ArtistId, String> = artists::get_all(pool)
        .await?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();

    let page = paginate(albums::get_all(pool).await?, params);
    let items: Vec<Value> = page
        .items
        .iter()
        .map(|album| album_json(album, names.get(&album.artist_id).map(String::as_str)))
        .collect();

    let body = json!({
        "albums": items,
        "total": page.total,
        "page": page.page,
        "limit": page.limit,
        "_links": page_links("/albums", &page, &[]),
    });

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// GET /api/v1/albums/:id
pub async fn get_album(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let album_id = AlbumId::new(id);

    let cache_key = keys::entity(EntityKind::Album, &album_id);
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let album = find_album(&app_state, &album_id).await?;
    let artist = artists::get_by_id(app_state.db.pool(), &album.artist_id).await?;

    let body = json!({
        "album": album_json(&album, artist.as_ref().map(|a| a.name.as_str())),
    });

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// POST /api/v1/albums/:id/cover-image
pub async fn update_cover_image(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let album = find_album(&app_state, &AlbumId::new(id)).await?;
    let owns = artists::get_by_id(app_state.db.pool(), &album.artist_id)
        .await?
        .is_some_and(|artist| artist.is_owned_by(auth.user_id()));
    ensure_owner_or_admin(&app_state, owns, auth.user_id(), "Unauthorized to update this album").await?;

    let mut form = MultipartForm::parse(&headers, body).await?;
    let file = form.require_file()?;

    let url = app_state
        .media
        .store_image(ImageKind::AlbumCover, file.filename.as_deref(), file.data)
        .await?;

    albums::set_cover_image(app_state.db.pool(), &album.id, &url).await?;
    if let Some(old) = &album.cover_image_url {
        app_state.media.remove(old).await;
    }

    invalidate_kind(&app_state, EntityKind::Album).await;
    // Track responses fall back to the album cover
    invalidate_kind(&app_state, EntityKind::Music).await;

    Ok(Json(json!({
        "message": "Cover image updated successfully",
        "cover_image_url": url,
        "_links": album_links(&album.id),
    })))
}

/// Delete an album with its tracks. Used by the admin routes.
pub(crate) async fn remove_album(app_state: &AppState, album: &Album) -> Result<()> {
    if !albums::delete(app_state.db.pool(), &album.id).await? {
        return Err(ServerError::not_found("Album not found"));
    }

    if let Some(url) = &album.cover_image_url {
        app_state.media.remove(url).await;
    }

    for kind in [EntityKind::Album, EntityKind::Music, EntityKind::Playlist] {
        invalidate_kind(app_state, kind).await;
    }

    tracing::info!(album_id = %album.id, "Album deleted");
    Ok(())
}
