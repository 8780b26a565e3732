/// User profile API routes
use super::{
    cache_get, cache_set, invalidate, invalidate_kind,
    links::{links, page_links},
    non_empty, JsonBody, PageQuery,
};
use crate::{
    error::{Result, ServerError},
    middleware::{AuthenticatedUser, SESSION_COOKIE},
    services::{ImageKind, MultipartForm},
    state::AppState,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use cadence_cache::{keys, EntityKind};
use cadence_core::{paginate, validation::validate_username, Artist, News, User, UserId};
use cadence_storage::{artists, news, users};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub username: Option<String>,
}

fn user_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "username": user.username,
        "email": user.email,
        "profile_picture_url": user.profile_picture_url,
    })
}

fn news_summary(item: &News) -> Value {
    json!({
        "id": item.id,
        "title": item.title,
        "category": item.category,
        "status": item.status,
        "reviewed": item.reviewed,
        "publicationDate": item.published_at,
        "_links": links(&format!("/news/{}", item.id), &[]),
    })
}

fn artist_summary(artist: &Artist) -> Value {
    json!({
        "id": artist.id,
        "name": artist.name,
        "bio": artist.bio,
        "profile_picture_url": artist.profile_picture_url,
        "_links": links(&format!("/artists/{}", artist.id), &[]),
    })
}

async fn current_user(app_state: &AppState, user_id: &UserId) -> Result<User> {
    users::get_by_id(app_state.db.pool(), user_id)
        .await?
        .ok_or_else(|| ServerError::not_found("User not found"))
}

/// GET /api/v1/users/me
pub async fn get_profile(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Value>> {
    let cache_key = keys::entity(EntityKind::User, auth.user_id());
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let user = current_user(&app_state, auth.user_id()).await?;
    let body = json!({
        "user": user_json(&user),
        "_links": links(
            "/users/me",
            &[
                ("artists", "/users/me/artists".to_string()),
                ("news", "/users/me/news".to_string()),
            ],
        ),
    });

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// PUT /api/v1/users/me
/// Update the username
pub async fn update_profile(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    JsonBody(req): JsonBody<UpdateProfileRequest>,
) -> Result<Json<Value>> {
    let username = non_empty(req.username)
        .ok_or_else(|| ServerError::bad_request("Valid username is required"))?;
    validate_username(&username)?;

    let pool = app_state.db.pool();
    if let Some(existing) = users::find_by_username(pool, &username).await? {
        if &existing.id != auth.user_id() {
            return Err(ServerError::bad_request("Username already exists"));
        }
    }

    users::update_username(pool, auth.user_id(), &username).await?;
    invalidate(&app_state, &keys::entity_patterns(EntityKind::User, auth.user_id())).await;

    tracing::info!(user_id = %auth.user_id(), "Profile updated");

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "_links": links("/users/me", &[]),
    })))
}

/// DELETE /api/v1/users/:id
/// Users may only delete their own account
pub async fn delete_user(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>)> {
    let user_id = UserId::new(id);
    if &user_id != auth.user_id() {
        tracing::warn!(caller = %auth.user_id(), target = %user_id, "Refused to delete another account");
        return Err(ServerError::forbidden(
            "Unauthorized. You can only delete your own account",
        ));
    }

    let user = current_user(&app_state, &user_id).await?;
    remove_user(&app_state, &user).await?;

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((
        jar,
        Json(json!({
            "message": "User deleted successfully",
            "_links": links("/auth/register", &[]),
        })),
    ))
}

/// Delete an account and everything cached about it. Shared with the admin
/// routes.
pub(crate) async fn remove_user(app_state: &AppState, user: &User) -> Result<()> {
    if !users::delete(app_state.db.pool(), &user.id).await? {
        return Err(ServerError::not_found("User not found"));
    }

    if let Some(url) = &user.profile_picture_url {
        app_state.media.remove(url).await;
    }

    invalidate(app_state, &keys::entity_patterns(EntityKind::User, &user.id)).await;
    invalidate(
        app_state,
        &[
            keys::user_artists_pattern(&user.id),
            keys::user_news_pattern(&user.id),
        ],
    )
    .await;
    for kind in [EntityKind::Playlist, EntityKind::Artist, EntityKind::News] {
        invalidate_kind(app_state, kind).await;
    }

    tracing::info!(user_id = %user.id, "Account deleted");
    Ok(())
}

/// GET /api/v1/users/me/artists
pub async fn my_artists(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Value>> {
    let cache_key = keys::user_artists(auth.user_id());
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let owned = artists::get_by_owner(app_state.db.pool(), auth.user_id()).await?;
    let body = json!({
        "artists": owned.iter().map(artist_summary).collect::<Vec<_>>(),
        "_links": links("/users/me/artists", &[("create", "/artists".to_string())]),
    });

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// GET /api/v1/users/me/news
pub async fn my_news(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let params = query.params()?;

    let cache_key = keys::user_news(auth.user_id(), params.page, params.limit);
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let authored = news::get_by_author(app_state.db.pool(), auth.user_id()).await?;
    let page = paginate(authored, params);

    let body = json!({
        "news": page.items.iter().map(news_summary).collect::<Vec<_>>(),
        "total": page.total,
        "page": page.page,
        "limit": page.limit,
        "_links": page_links("/users/me/news", &page, &[]),
    });

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// POST /api/v1/users/me/profile-picture
pub async fn update_profile_picture(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let user = current_user(&app_state, auth.user_id()).await?;

    let mut form = MultipartForm::parse(&headers, body).await?;
    let file = form.require_file()?;

    let url = app_state
        .media
        .store_image(ImageKind::ProfilePicture, file.filename.as_deref(), file.data)
        .await?;

    users::set_profile_picture(app_state.db.pool(), &user.id, &url).await?;
    if let Some(old) = &user.profile_picture_url {
        app_state.media.remove(old).await;
    }

    invalidate(&app_state, &keys::entity_patterns(EntityKind::User, &user.id)).await;
    tracing::info!(user_id = %user.id, "Profile picture updated");

    Ok(Json(json!({
        "message": "Profile picture updated successfully",
        "profile_picture_url": url,
        "_links": links("/users/me", &[]),
    })))
}
