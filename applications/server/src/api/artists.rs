/// Artists API routes
use super::{
    cache_get, cache_set, ensure_owner_or_admin, invalidate, invalidate_kind,
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
use cadence_core::{paginate, Artist, ArtistId, CreateArtist, UpdateArtist};
use cadence_storage::artists;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct ArtistRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
}

fn artist_links(id: &ArtistId) -> Value {
    links(
        &format!("/artists/{id}"),
        &[
            ("profile_picture", format!("/artists/{id}/profile-picture")),
            ("collection", "/artists".to_string()),
        ],
    )
}

fn artist_json(artist: &Artist) -> Value {
    json!({
        "id": artist.id,
        "name": artist.name,
        "bio": artist.bio,
        "profile_picture_url": artist.profile_picture_url,
        "_links": artist_links(&artist.id),
    })
}

pub(crate) async fn find_artist(app_state: &AppState, id: &ArtistId) -> Result<Artist> {
    artists::get_by_id(app_state.db.pool(), id)
        .await?
        .ok_or_else(|| ServerError::not_found("Artist not found"))
}

/// Drop cached artist responses plus the owner's artist listing
async fn invalidate_artist(app_state: &AppState, artist: &Artist) {
    invalidate_kind(app_state, EntityKind::Artist).await;
    if let Some(owner) = &artist.user_id {
        invalidate(app_state, &[keys::user_artists_pattern(owner)]).await;
    }
}

/// POST /api/v1/artists
pub async fn create_artist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    JsonBody(req): JsonBody<ArtistRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let name = non_empty(req.name).ok_or_else(|| ServerError::bad_request("Missing name"))?;

    let artist = artists::create(
        app_state.db.pool(),
        CreateArtist {
            name,
            bio: non_empty(req.bio),
            user_id: auth.user_id().clone(),
        },
    )
    .await?;

    invalidate_artist(&app_state, &artist).await;
    tracing::info!(artist_id = %artist.id, user_id = %auth.user_id(), "Artist created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Artist created successfully",
            "artistId": artist.id,
            "_links": artist_links(&artist.id),
        })),
    ))
}

/// GET /api/v1/artists
pub async fn list_artists(
    State(app_state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let params = query.params()?;

    let cache_key = keys::list(EntityKind::Artist, params.page, params.limit);
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let page = paginate(artists::get_all(app_state.db.pool()).await?, params);
    let body = json!({
        "artists": page.items.iter().map(artist_json).collect::<Vec<_>>(),
        "total": page.total,
        "page": page.page,
        "limit": page.limit,
        "_links": page_links("/artists", &page, &[]),
    });

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// GET /api/v1/artists/:id
pub async fn get_artist(
    State(app_state): State<AppState>,
    _auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let artist_id = ArtistId::new(id);

    let cache_key = keys::entity(EntityKind::Artist, &artist_id);
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let artist = find_artist(&app_state, &artist_id).await?;
    let body = json!({ "artist": artist_json(&artist) });

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// PUT /api/v1/artists/:id
pub async fn update_artist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ArtistRequest>,
) -> Result<Json<Value>> {
    let artist = find_artist(&app_state, &ArtistId::new(id)).await?;
    ensure_owner_or_admin(
        &app_state,
        artist.is_owned_by(auth.user_id()),
        auth.user_id(),
        "Unauthorized to update this artist",
    )
    .await?;

    let update = UpdateArtist {
        name: non_empty(req.name),
        bio: non_empty(req.bio),
    };
    artists::update(app_state.db.pool(), &artist.id, update)
        .await?
        .ok_or_else(|| ServerError::not_found("Artist not found"))?;

    invalidate_artist(&app_state, &artist).await;
    // Album, track and playlist responses embed the artist name
    for kind in [EntityKind::Album, EntityKind::Music, EntityKind::Playlist] {
        invalidate_kind(&app_state, kind).await;
    }

    tracing::info!(artist_id = %artist.id, "Artist updated");

    Ok(Json(json!({
        "message": "Artist updated successfully",
        "_links": artist_links(&artist.id),
    })))
}

/// DELETE /api/v1/artists/:id
pub async fn delete_artist(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let artist = find_artist(&app_state, &ArtistId::new(id)).await?;
    ensure_owner_or_admin(
        &app_state,
        artist.is_owned_by(auth.user_id()),
        auth.user_id(),
        "Unauthorized to delete this artist",
    )
    .await?;

    remove_artist(&app_state, &artist).await?;

    Ok(Json(json!({
        "message": "Artist deleted successfully",
        "_links": links("/artists", &[]),
    })))
}

/// Delete an artist with its albums and tracks, then drop every cache entry
/// that could still show them. Shared with the admin routes.
pub(crate) async fn remove_artist(app_state: &AppState, artist: &Artist) -> Result<()> {
    if !artists::delete(app_state.db.pool(), &artist.id).await? {
        return Err(ServerError::not_found("Artist not found"));
    }

    if let Some(url) = &artist.profile_picture_url {
        app_state.media.remove(url).await;
    }

    invalidate_artist(app_state, artist).await;
    for kind in [EntityKind::Album, EntityKind::Music, EntityKind::Playlist] {
        invalidate_kind(app_state, kind).await;
    }

    tracing::info!(artist_id = %artist.id, "Artist deleted");
    Ok(())
}

/// POST /api/v1/artists/:id/profile-picture
pub async fn update_profile_picture(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let artist = find_artist(&app_state, &ArtistId::new(id)).await?;
    ensure_owner_or_admin(
        &app_state,
        artist.is_owned_by(auth.user_id()),
        auth.user_id(),
        "Unauthorized to update this artist",
    )
    .await?;

    let mut form = MultipartForm::parse(&headers, body).await?;
    let file = form.require_file()?;

    let url = app_state
        .media
        .store_image(ImageKind::ArtistPicture, file.filename.as_deref(), file.data)
        .await?;

    artists::set_profile_picture(app_state.db.pool(), &artist.id, &url).await?;
    if let Some(old) = &artist.profile_picture_url {
        app_state.media.remove(old).await;
    }

    invalidate_artist(&app_state, &artist).await;

    Ok(Json(json!({
        "message": "Profile picture updated successfully",
        "profile_picture_url": url,
        "_links": artist_links(&artist.id),
    })))
}
