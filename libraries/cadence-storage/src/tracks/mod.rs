use crate::like_pattern;
use cadence_core::{error::Result, types::*, CadenceError};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, title, artist_id, album_id, genre_id, file_url, duration_seconds,
    release_date, release_type, cover_image_url, description, created_at, updated_at";

/// Track columns plus joined artist/album/genre names
const DETAILS_SELECT: &str = "SELECT t.id, t.title, t.artist_id, t.album_id, t.genre_id,
        t.file_url, t.duration_seconds, t.release_date, t.release_type, t.cover_image_url,
        t.description, t.created_at, t.updated_at,
        ar.name AS artist_name, al.title AS album_title, g.name AS genre_name
    FROM tracks t
    INNER JOIN artists ar ON ar.id = t.artist_id
    LEFT JOIN albums al ON al.id = t.album_id
    INNER JOIN genres g ON g.id = t.genre_id";

pub async fn get_by_id(pool: &SqlitePool, id: &TrackId) -> Result<Option<Track>> {
    let track = sqlx::query_as::<_, Track>(&format!("SELECT {COLUMNS} FROM tracks WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(track)
}

pub async fn get_details(pool: &SqlitePool, id: &TrackId) -> Result<Option<TrackDetails>> {
    let track = sqlx::query_as::<_, TrackDetails>(&format!("{DETAILS_SELECT} WHERE t.id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(track)
}

pub async fn get_all_details(pool: &SqlitePool) -> Result<Vec<TrackDetails>> {
    let tracks = sqlx::query_as::<_, TrackDetails>(&format!(
        "{DETAILS_SELECT} ORDER BY t.created_at, t.rowid"
    ))
    .fetch_all(pool)
    .await?;

    Ok(tracks)
}

/// Exact, case-sensitive match on the related names that are set
pub async fn filter(pool: &SqlitePool, filter: &TrackFilter) -> Result<Vec<TrackDetails>> {
    let tracks = sqlx::query_as::<_, TrackDetails>(&format!(
        "{DETAILS_SELECT}
         WHERE (?1 IS NULL OR g.name = ?1)
           AND (?2 IS NULL OR ar.name = ?2)
           AND (?3 IS NULL OR al.title = ?3)
         ORDER BY t.created_at, t.rowid"
    ))
    .bind(&filter.genre)
    .bind(&filter.artist)
    .bind(&filter.album)
    .fetch_all(pool)
    .await?;

    Ok(tracks)
}

/// Case-insensitive substring search over title, artist, album and genre
pub async fn search(pool: &SqlitePool, query: &str) -> Result<Vec<TrackDetails>> {
    let pattern = like_pattern(query);

    let tracks = sqlx::query_as::<_, TrackDetails>(&format!(
        "{DETAILS_SELECT}
         WHERE t.title LIKE ?1 ESCAPE '\\'
            OR ar.name LIKE ?1 ESCAPE '\\'
            OR al.title LIKE ?1 ESCAPE '\\'
            OR g.name LIKE ?1 ESCAPE '\\'
         ORDER BY t.created_at, t.rowid"
    ))
    .bind(&pattern)
    .fetch_all(pool)
    .await?;

    Ok(tracks)
}

pub async fn get_by_artist(pool: &SqlitePool, artist_id: &ArtistId) -> Result<Vec<Track>> {
    let tracks = sqlx::query_as::<_, Track>(&format!(
        "SELECT {COLUMNS} FROM tracks WHERE artist_id = ? ORDER BY created_at, rowid"
    ))
    .bind(artist_id)
    .fetch_all(pool)
    .await?;

    Ok(tracks)
}

/// Insert a track. The release type is derived from whether an album is set.
pub async fn create(pool: &SqlitePool, track: CreateTrack) -> Result<Track> {
    let id = TrackId::generate();
    let release_type = ReleaseType::for_album(track.album_id.as_ref());

    sqlx::query(
        "INSERT INTO tracks (id, title, artist_id, album_id, genre_id, file_url,
                             duration_seconds, release_date, release_type, description)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&track.title)
    .bind(&track.artist_id)
    .bind(&track.album_id)
    .bind(&track.genre_id)
    .bind(&track.file_url)
    .bind(track.duration_seconds)
    .bind(&track.release_date)
    .bind(release_type)
    .bind(&track.description)
    .execute(pool)
    .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| CadenceError::storage("Failed to retrieve created track"))
}

pub async fn set_cover_image(pool: &SqlitePool, id: &TrackId, url: &str) -> Result<()> {
    sqlx::query("UPDATE tracks SET cover_image_url = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(url)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn delete(pool: &SqlitePool, id: &TrackId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM tracks WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
