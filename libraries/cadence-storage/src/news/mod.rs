use cadence_core::{error::Result, types::*, CadenceError};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, title, content, author, category, user_id, status, reviewed,
    published_at, created_at, updated_at";

/// Every article regardless of status, newest first
pub async fn get_all(pool: &SqlitePool) -> Result<Vec<News>> {
    let news = sqlx::query_as::<_, News>(&format!(
        "SELECT {COLUMNS} FROM news ORDER BY published_at DESC, rowid DESC"
    ))
    .fetch_all(pool)
    .await?;

    Ok(news)
}

/// Publicly visible articles, newest first
pub async fn get_live(pool: &SqlitePool) -> Result<Vec<News>> {
    let news = sqlx::query_as::<_, News>(&format!(
        "SELECT {COLUMNS} FROM news WHERE status = ? ORDER BY published_at DESC, rowid DESC"
    ))
    .bind(NewsStatus::Live)
    .fetch_all(pool)
    .await?;

    Ok(news)
}

pub async fn get_by_author(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<News>> {
    let news = sqlx::query_as::<_, News>(&format!(
        "SELECT {COLUMNS} FROM news WHERE user_id = ? ORDER BY published_at DESC, rowid DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(news)
}

/// Articles waiting for an admin decision, oldest first
pub async fn get_unreviewed(pool: &SqlitePool) -> Result<Vec<News>> {
    let news = sqlx::query_as::<_, News>(&format!(
        "SELECT {COLUMNS} FROM news WHERE reviewed = 0 ORDER BY published_at, rowid"
    ))
    .fetch_all(pool)
    .await?;

    Ok(news)
}

pub async fn get_by_id(pool: &SqlitePool, id: &NewsId) -> Result<Option<News>> {
    let news = sqlx::query_as::<_, News>(&format!("SELECT {COLUMNS} FROM news WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(news)
}

pub async fn create(pool: &SqlitePool, news: CreateNews) -> Result<News> {
    let id = NewsId::generate();

    sqlx::query(
        "INSERT INTO news (id, title, content, author, category, user_id)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&news.title)
    .bind(&news.content)
    .bind(&news.author)
    .bind(news.category.map(|c| c.label()))
    .bind(&news.user_id)
    .execute(pool)
    .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| CadenceError::storage("Failed to retrieve created news"))
}

pub async fn update(pool: &SqlitePool, id: &NewsId, update: UpdateNews) -> Result<Option<News>> {
    let result = sqlx::query(
        "UPDATE news
         SET title = COALESCE(?, title),
             content = COALESCE(?, content),
             category = COALESCE(?, category),
             updated_at = datetime('now')
         WHERE id = ?",
    )
    .bind(&update.title)
    .bind(&update.content)
    .bind(update.category.map(|c| c.label()))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_by_id(pool, id).await
}

/// Record an admin review decision
pub async fn set_review(pool: &SqlitePool, id: &NewsId, status: NewsStatus) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE news SET status = ?, reviewed = 1, updated_at = datetime('now') WHERE id = ?",
    )
    .bind(status)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Images are removed with the article
pub async fn delete(pool: &SqlitePool, id: &NewsId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM news WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn add_image(pool: &SqlitePool, news_id: &NewsId, image_url: &str) -> Result<NewsImage> {
    let id = NewsImageId::generate();

    sqlx::query("INSERT INTO news_images (id, news_id, image_url) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(news_id)
        .bind(image_url)
        .execute(pool)
        .await?;

    sqlx::query_as::<_, NewsImage>(
        "SELECT id, news_id, image_url, created_at FROM news_images WHERE id = ?",
    )
    .bind(&id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| CadenceError::storage("Failed to retrieve created news image"))
}

pub async fn get_images(pool: &SqlitePool, news_id: &NewsId) -> Result<Vec<NewsImage>> {
    let images = sqlx::query_as::<_, NewsImage>(
        "SELECT id, news_id, image_url, created_at FROM news_images
         WHERE news_id = ? ORDER BY created_at, rowid",
    )
    .bind(news_id)
    .fetch_all(pool)
    .await?;

    Ok(images)
}
