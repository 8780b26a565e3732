use cadence_core::{error::Result, types::*, CadenceError};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, bio, profile_picture_url, user_id, created_at, updated_at";

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Artist>> {
    let artists = sqlx::query_as::<_, Artist>(&format!(
        "SELECT {COLUMNS} FROM artists ORDER BY created_at, rowid"
    ))
    .fetch_all(pool)
    .await?;

    Ok(artists)
}

pub async fn get_by_id(pool: &SqlitePool, id: &ArtistId) -> Result<Option<Artist>> {
    let artist = sqlx::query_as::<_, Artist>(&format!("SELECT {COLUMNS} FROM artists WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(artist)
}

/// Names are not unique; the oldest match wins
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Artist>> {
    let artist = sqlx::query_as::<_, Artist>(&format!(
        "SELECT {COLUMNS} FROM artists WHERE name = ? ORDER BY created_at, rowid LIMIT 1"
    ))
    .bind(name)
    .fetch_optional(pool)
    .await?;

    Ok(artist)
}

pub async fn get_by_owner(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<Artist>> {
    let artists = sqlx::query_as::<_, Artist>(&format!(
        "SELECT {COLUMNS} FROM artists WHERE user_id = ? ORDER BY created_at, rowid"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(artists)
}

pub async fn create(pool: &SqlitePool, artist: CreateArtist) -> Result<Artist> {
    let id = ArtistId::generate();

    sqlx::query("INSERT INTO artists (id, name, bio, user_id) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&artist.name)
        .bind(&artist.bio)
        .bind(&artist.user_id)
        .execute(pool)
        .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| CadenceError::storage("Failed to retrieve created artist"))
}

/// Apply a partial update; returns the updated row, or `None` if it does not exist
pub async fn update(pool: &SqlitePool, id: &ArtistId, update: UpdateArtist) -> Result<Option<Artist>> {
    let result = sqlx::query(
        "UPDATE artists
         SET name = COALESCE(?, name),
             bio = COALESCE(?, bio),
             updated_at = datetime('now')
         WHERE id = ?",
    )
    .bind(&update.name)
    .bind(&update.bio)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_by_id(pool, id).await
}

pub async fn set_profile_picture(pool: &SqlitePool, id: &ArtistId, url: &str) -> Result<()> {
    sqlx::query(
        "UPDATE artists SET profile_picture_url = ?, updated_at = datetime('now') WHERE id = ?",
    )
    .bind(url)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Deleting an artist cascades to its albums and tracks
pub async fn delete(pool: &SqlitePool, id: &ArtistId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM artists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
