use cadence_core::{error::Result, types::*, CadenceError};
use sqlx::SqlitePool;

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Genre>> {
    let genres =
        sqlx::query_as::<_, Genre>("SELECT id, name, created_at FROM genres ORDER BY name")
            .fetch_all(pool)
            .await?;

    Ok(genres)
}

pub async fn get_by_id(pool: &SqlitePool, id: &GenreId) -> Result<Option<Genre>> {
    let genre = sqlx::query_as::<_, Genre>("SELECT id, name, created_at FROM genres WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(genre)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Genre>> {
    let genre =
        sqlx::query_as::<_, Genre>("SELECT id, name, created_at FROM genres WHERE name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await?;

    Ok(genre)
}

/// Insert a genre. An existing name surfaces as `CadenceError::Duplicate`.
pub async fn create(pool: &SqlitePool, name: &str) -> Result<Genre> {
    let id = GenreId::generate();

    sqlx::query("INSERT INTO genres (id, name) VALUES (?, ?)")
        .bind(&id)
        .bind(name)
        .execute(pool)
        .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| CadenceError::storage("Failed to retrieve created genre"))
}

pub async fn rename(pool: &SqlitePool, id: &GenreId, name: &str) -> Result<Option<Genre>> {
    let result = sqlx::query("UPDATE genres SET name = ? WHERE id = ?")
        .bind(name)
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_by_id(pool, id).await
}

/// Number of tracks tagged with this genre
pub async fn track_count(pool: &SqlitePool, id: &GenreId) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tracks WHERE genre_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;

    Ok(count)
}

/// Fails with a foreign-key error while tracks still reference the genre
pub async fn delete(pool: &SqlitePool, id: &GenreId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM genres WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
