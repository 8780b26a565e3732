/// News feed API routes
use super::{
    cache_get, cache_set, ensure_owner_or_admin, invalidate,
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
use cadence_core::{
    paginate, validation::validate_news_content, CreateNews, News, NewsCategory, NewsId,
    NewsImage, NewsStatus, UpdateNews,
};
use cadence_storage::{news, users};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct NewsRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

fn news_links(id: &NewsId) -> Value {
    links(
        &format!("/news/{id}"),
        &[
            ("images", format!("/news/{id}/image")),
            ("collection", "/news".to_string()),
        ],
    )
}

fn news_json(item: &News, images: &[NewsImage]) -> Value {
    json!({
        "id": item.id,
        "title": item.title,
        "content": item.content,
        "author": item.author,
        "category": item.category,
        "images": images.iter().map(|img| img.image_url.as_str()).collect::<Vec<_>>(),
        "publicationDate": item.published_at,
        "_links": news_links(&item.id),
    })
}

fn news_summary(item: &News) -> Value {
    json!({
        "id": item.id,
        "title": item.title,
        "content": item.content,
        "author": item.author,
        "category": item.category,
        "publicationDate": item.published_at,
        "_links": links(&format!("/news/{}", item.id), &[]),
    })
}

/// A missing category is allowed; an unknown one is not
fn parse_category(raw: Option<String>) -> Result<Option<NewsCategory>> {
    match non_empty(raw) {
        Some(label) => NewsCategory::parse(&label)
            .map(Some)
            .ok_or_else(|| ServerError::bad_request("Invalid category")),
        None => Ok(None),
    }
}

pub(crate) async fn find_news(app_state: &AppState, id: &NewsId, message: &str) -> Result<News> {
    news::get_by_id(app_state.db.pool(), id)
        .await?
        .ok_or_else(|| ServerError::not_found(message))
}

/// Drop the article, every news listing and its author's own listing
pub(crate) async fn invalidate_news(app_state: &AppState, item: &News) {
    let mut patterns = keys::entity_patterns(EntityKind::News, &item.id);
    patterns.push(format!("{}_list:*", EntityKind::News.plural()));
    if let Some(author) = &item.user_id {
        patterns.push(keys::user_news_pattern(author));
    }
    invalidate(app_state, &patterns).await;
}

/// POST /api/v1/news
pub async fn create_news(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    JsonBody(req): JsonBody<NewsRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let category = parse_category(req.category)?;

    let (Some(title), Some(content)) = (non_empty(req.title), non_empty(req.content)) else {
        return Err(ServerError::bad_request("Missing title or content"));
    };
    validate_news_content(&content)?;

    let pool = app_state.db.pool();
    let author = users::get_by_id(pool, auth.user_id())
        .await?
        .ok_or_else(|| ServerError::not_found("User not found"))?;

    let item = news::create(
        pool,
        CreateNews {
            title,
            content,
            author: author.username,
            category,
            user_id: auth.user_id().clone(),
        },
    )
    .await?;

    invalidate_news(&app_state, &item).await;
    tracing::info!(news_id = %item.id, user_id = %auth.user_id(), "News created");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "News created successfully",
            "newsId": item.id,
            "_links": news_links(&item.id),
        })),
    ))
}

/// GET /api/v1/news
pub async fn list_news(
    State(app_state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Value>> {
    let params = query.params()?;

    let cache_key = keys::list(EntityKind::News, params.page, params.limit);
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let page = paginate(news::get_live(app_state.db.pool()).await?, params);
    let body = json!({
        "news": page.items.iter().map(news_summary).collect::<Vec<_>>(),
        "total": page.total,
        "page": page.page,
        "limit": page.limit,
        "_links": page_links("/news", &page, &[]),
    });

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// GET /api/v1/news/:id
///
/// Private (rejected) articles are hidden from the public.
pub async fn get_news(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let news_id = NewsId::new(id);

    let cache_key = keys::entity(EntityKind::News, &news_id);
    if let Some(cached) = cache_get::<Value>(&app_state, &cache_key).await {
        return Ok(Json(cached));
    }

    let item = find_news(&app_state, &news_id, "News not found").await?;
    if item.status == NewsStatus::Private {
        return Err(ServerError::not_found("News not found"));
    }

    let images = news::get_images(app_state.db.pool(), &item.id).await?;
    let body = json!({ "news": news_json(&item, &images) });

    cache_set(&app_state, &cache_key, &body).await;
    Ok(Json(body))
}

/// PUT /api/v1/news/:id
pub async fn update_news(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    JsonBody(req): JsonBody<NewsRequest>,
) -> Result<Json<Value>> {
    let item = find_news(&app_state, &NewsId::new(id), "News not found").await?;
    ensure_owner_or_admin(
        &app_state,
        item.is_authored_by(auth.user_id()),
        auth.user_id(),
        "Unauthorized to update this news",
    )
    .await?;

    let category = parse_category(req.category)?;
    let content = non_empty(req.content);
    if let Some(content) = &content {
        validate_news_content(content)?;
    }

    let update = UpdateNews {
        title: non_empty(req.title),
        content,
        category,
    };
    news::update(app_state.db.pool(), &item.id, update)
        .await?
        .ok_or_else(|| ServerError::not_found("News not found"))?;

    invalidate_news(&app_state, &item).await;
    tracing::info!(news_id = %item.id, "News updated");

    Ok(Json(json!({
        "message": "News updated successfully",
        "_links": news_links(&item.id),
    })))
}

/// DELETE /api/v1/news/:id
pub async fn delete_news(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let item = find_news(&app_state, &NewsId::new(id), "News not found").await?;
    ensure_owner_or_admin(
        &app_state,
        item.is_authored_by(auth.user_id()),
        auth.user_id(),
        "Unauthorized to delete this news",
    )
    .await?;

    remove_news(&app_state, &item).await?;

    Ok(Json(json!({
        "message": "News deleted successfully",
        "_links": links("/news", &[]),
    })))
}

/// Delete an article with its images. Shared with the admin routes.
pub(crate) async fn remove_news(app_state: &AppState, item: &News) -> Result<()> {
    let pool = app_state.db.pool();
    let images = news::get_images(pool, &item.id).await?;

    if !news::delete(pool, &item.id).await? {
        return Err(ServerError::not_found("News not found"));
    }

    for image in &images {
        app_state.media.remove(&image.image_url).await;
    }

    invalidate_news(app_state, item).await;
    tracing::info!(news_id = %item.id, "News deleted");
    Ok(())
}

/// POST /api/v1/news/:id/image
pub async fn upload_image(
    State(app_state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>)> {
    let item = find_news(&app_state, &NewsId::new(id), "News not found").await?;
    ensure_owner_or_admin(
        &app_state,
        item.is_authored_by(auth.user_id()),
        auth.user_id(),
        "Unauthorized to update this news",
    )
    .await?;

    let mut form = MultipartForm::parse(&headers, body).await?;
    let file = form.require_file()?;

    let url = app_state
        .media
        .store_image(ImageKind::NewsImage, file.filename.as_deref(), file.data)
        .await?;

    let image = match news::add_image(app_state.db.pool(), &item.id, &url).await {
        Ok(image) => image,
        Err(e) => {
            app_state.media.remove(&url).await;
            return Err(e.into());
        }
    };

    invalidate_news(&app_state, &item).await;
    tracing::info!(news_id = %item.id, image_id = %image.id, "News image added");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Image uploaded successfully",
            "imageId": image.id,
            "image_url": image.image_url,
            "_links": news_links(&item.id),
        })),
    ))
}
