use cadence_core::{error::Result, types::*, CadenceError};
use sqlx::SqlitePool;

const COLUMNS: &str =
    "id, title, artist_id, release_date, cover_image_url, description, created_at, updated_at";

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Album>> {
    let albums = sqlx::query_as::<_, Album>(&format!(
        "SELECT {COLUMNS} FROM albums ORDER BY created_at, rowid"
    ))
    .fetch_all(pool)
    .await?;

    Ok(albums)
}

pub async fn get_by_id(pool: &SqlitePool, id: &AlbumId) -> Result<Option<Album>> {
    let album = sqlx::query_as::<_, Album>(&format!("SELECT {COLUMNS} FROM albums WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(album)
}

pub async fn get_by_artist(pool: &SqlitePool, artist_id: &ArtistId) -> Result<Vec<Album>> {
    let albums = sqlx::query_as::<_, Album>(&format!(
        "SELECT {COLUMNS} FROM albums WHERE artist_id = ? ORDER BY created_at, rowid"
    ))
    .bind(artist_id)
    .fetch_all(pool)
    .await?;

    Ok(albums)
}

/// Look up an album by title within one artist's discography
pub async fn find_by_title(
    pool: &SqlitePool,
    artist_id: &ArtistId,
    title: &str,
) -> Result<Option<Album>> {
    let album = sqlx::query_as::<_, Album>(&format!(
        "SELECT {COLUMNS} FROM albums WHERE artist_id = ? AND title = ?
         ORDER BY created_at, rowid LIMIT 1"
    ))
    .bind(artist_id)
    .bind(title)
    .fetch_optional(pool)
    .await?;

    Ok(album)
}

pub async fn create(pool: &SqlitePool, album: CreateAlbum) -> Result<Album> {
    let id = AlbumId::generate();

    sqlx::query(
        "INSERT INTO albums (id, title, artist_id, release_date, description)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&album.title)
    .bind(&album.artist_id)
    .bind(&album.release_date)
    .bind(&album.description)
    .execute(pool)
    .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| CadenceError::storage("Failed to retrieve created album"))
}

pub async fn set_cover_image(pool: &SqlitePool, id: &AlbumId, url: &str) -> Result<()> {
    sqlx::query("UPDATE albums SET cover_image_url = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(url)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

/// Deleting an album cascades to its tracks
pub async fn delete(pool: &SqlitePool, id: &AlbumId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM albums WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
