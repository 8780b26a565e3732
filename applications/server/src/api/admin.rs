/// Admin API routes
///
/// Every handler takes an `AdminUser`, so callers without an `admins` row get
/// a 403 before anything is read or changed. Genre management lives in
/// `genres`.
use super::{
    albums::{find_album, remove_album},
    artists::{find_artist, remove_artist},
    links::{links, page_links},
    music::{find_track, remove_track},
    news::{find_news, invalidate_news, remove_news},
    users::remove_user,
    JsonBody, PageQuery,
};
use crate::{
    error::{Result, ServerError},
    middleware::AdminUser,
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use cadence_core::{
    paginate, AlbumId, ArtistId, NewsId, NewsStatus, ReleaseType, TrackId, UserId,
};
use cadence_storage::{admins, news, users};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub action: Option<String>,
}

/// Outcome of reviewing a pending article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action.trim() {
            "approve" => Some(ReviewAction::Approve),
            "reject" => Some(ReviewAction::Reject),
            _ => None,
        }
    }

    /// Status the article is left in
    pub fn status(&self) -> NewsStatus {
        match self {
            ReviewAction::Approve => NewsStatus::Live,
            ReviewAction::Reject => NewsStatus::Private,
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            ReviewAction::Approve => "approved",
            ReviewAction::Reject => "rejected",
        }
    }
}

/// GET /api/v1/admin/users
pub async fn list_users(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let params = query.params()?;
    let page = paginate(users::get_all(app_state.db.pool()).await?, params);

    let items: Vec<Value> = page
        .items
        .iter()
        .map(|user| json!({ "id": user.id, "username": user.username, "email": user.email }))
        .collect();

    Ok(Json(json!({
        "users": items,
        "total_count": page.total,
        "page": page.page,
        "limit": page.limit,
        "_links": page_links("/admin/users", &page, &[]),
    })))
}

/// DELETE /api/v1/admin/users/:id
pub async fn delete_user(
    State(app_state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let user = users::get_by_id(app_state.db.pool(), &UserId::new(id))
        .await?
        .ok_or_else(|| ServerError::not_found("User not found"))?;

    remove_user(&app_state, &user).await?;
    tracing::info!(admin = %admin.user_id(), user_id = %user.id, "User deleted by admin");

    Ok(Json(json!({
        "message": "User deleted successfully",
        "_links": links("/admin/users", &[]),
    })))
}

/// DELETE /api/v1/admin/artists/:id
pub async fn delete_artist(
    State(app_state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let artist = find_artist(&app_state, &ArtistId::new(id)).await?;
    remove_artist(&app_state, &artist).await?;
    tracing::info!(admin = %admin.user_id(), artist_id = %artist.id, "Artist deleted by admin");

    Ok(Json(json!({
        "message": "Artist deleted successfully",
        "_links": links("/artists", &[]),
    })))
}

/// DELETE /api/v1/admin/albums/:id
pub async fn delete_album(
    State(app_state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let album = find_album(&app_state, &AlbumId::new(id)).await?;
    remove_album(&app_state, &album).await?;
    tracing::info!(admin = %admin.user_id(), album_id = %album.id, "Album deleted by admin");

    Ok(Json(json!({
        "message": "Album deleted successfully",
        "_links": links("/albums", &[]),
    })))
}

/// DELETE /api/v1/admin/music/:id
///
/// Only singles can be removed one by one; album tracks go with their album.
pub async fn delete_music(
    State(app_state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let track = find_track(&app_state, &TrackId::new(id)).await?;
    if track.release_type == ReleaseType::Album {
        return Err(ServerError::forbidden("Cannot delete an album"));
    }

    remove_track(&app_state, &track).await?;
    tracing::info!(admin = %admin.user_id(), music_id = %track.id, "Single deleted by admin");

    Ok(Json(json!({
        "message": "Single deleted successfully",
        "_links": links("/music", &[]),
    })))
}

/// DELETE /api/v1/admin/news/:id
pub async fn delete_news(
    State(app_state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let item = find_news(&app_state, &NewsId::new(id), "News article not found").await?;
    remove_news(&app_state, &item).await?;
    tracing::info!(admin = %admin.user_id(), news_id = %item.id, "News deleted by admin");

    Ok(Json(json!({
        "message": "News article deleted successfully",
        "_links": links("/news", &[]),
    })))
}

/// GET /api/v1/admin/list
pub async fn list_admins(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let params = query.params()?;
    let page = paginate(admins::get_all(app_state.db.pool()).await?, params);

    let items: Vec<Value> = page
        .items
        .iter()
        .map(|a| json!({ "id": a.user_id, "username": a.username, "email": a.email }))
        .collect();

    Ok(Json(json!({
        "admins": items,
        "total_count": page.total,
        "page": page.page,
        "limit": page.limit,
        "_links": page_links("/admin/list", &page, &[]),
    })))
}

/// GET /api/v1/admin/news/review
pub async fn pending_news(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let params = query.params()?;
    let page = paginate(news::get_unreviewed(app_state.db.pool()).await?, params);

    let items: Vec<Value> = page
        .items
        .iter()
        .map(|item| {
            json!({
                "id": item.id,
                "title": item.title,
                "author_id": item.user_id,
                "created_at": item.created_at,
                "_links": links(
                    &format!("/news/{}", item.id),
                    &[("review", format!("/admin/news/{}/review", item.id))],
                ),
            })
        })
        .collect();

    Ok(Json(json!({
        "pending_news": items,
        "total": page.total,
        "page": page.page,
        "limit": page.limit,
        "_links": page_links("/admin/news/review", &page, &[]),
    })))
}

/// POST /api/v1/admin/news/:id/review
pub async fn review_news(
    State(app_state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<ReviewRequest>,
) -> Result<Json<Value>> {
    let action = req
        .action
        .as_deref()
        .and_then(ReviewAction::parse)
        .ok_or_else(|| ServerError::bad_request("Invalid action. Use 'approve' or 'reject'"))?;

    let item = find_news(&app_state, &NewsId::new(id), "News post not found").await?;

    if !news::set_review(app_state.db.pool(), &item.id, action.status()).await? {
        return Err(ServerError::not_found("News post not found"));
    }

    invalidate_news(&app_state, &item).await;
    tracing::info!(admin = %admin.user_id(), news_id = %item.id, "News post {}", action.past_tense());

    Ok(Json(json!({
        "message": format!("News post {} successfully", action.past_tense()),
        "_links": links(&format!("/news/{}", item.id), &[]),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_actions_parse() {
        assert_eq!(ReviewAction::parse("approve"), Some(ReviewAction::Approve));
        assert_eq!(ReviewAction::parse("reject"), Some(ReviewAction::Reject));
        assert_eq!(ReviewAction::parse("publish"), None);
        assert_eq!(ReviewAction::parse("Approve"), None);
    }

    #[test]
    fn rejecting_hides_the_article() {
        assert_eq!(ReviewAction::Reject.status(), NewsStatus::Private);
        assert_eq!(ReviewAction::Approve.status(), NewsStatus::Live);
        assert_eq!(ReviewAction::Reject.past_tense(), "rejected");
    }
}
