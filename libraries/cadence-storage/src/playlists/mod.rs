use cadence_core::{error::Result, types::*, CadenceError};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, name, description, user_id, created_at, updated_at";

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<Playlist>> {
    let playlists = sqlx::query_as::<_, Playlist>(&format!(
        "SELECT {COLUMNS} FROM playlists ORDER BY created_at, rowid"
    ))
    .fetch_all(pool)
    .await?;

    Ok(playlists)
}

pub async fn get_by_id(pool: &SqlitePool, id: &PlaylistId) -> Result<Option<Playlist>> {
    let playlist =
        sqlx::query_as::<_, Playlist>(&format!("SELECT {COLUMNS} FROM playlists WHERE id = ?"))
            .bind(id)
            .fetch_optional(pool)
            .await?;

    Ok(playlist)
}

pub async fn get_by_owner(pool: &SqlitePool, user_id: &UserId) -> Result<Vec<Playlist>> {
    let playlists = sqlx::query_as::<_, Playlist>(&format!(
        "SELECT {COLUMNS} FROM playlists WHERE user_id = ? ORDER BY created_at, rowid"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(playlists)
}

pub async fn create(pool: &SqlitePool, playlist: CreatePlaylist) -> Result<Playlist> {
    let id = PlaylistId::generate();

    sqlx::query("INSERT INTO playlists (id, name, description, user_id) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&playlist.name)
        .bind(&playlist.description)
        .bind(&playlist.user_id)
        .execute(pool)
        .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| CadenceError::storage("Failed to retrieve created playlist"))
}

pub async fn update(
    pool: &SqlitePool,
    id: &PlaylistId,
    update: UpdatePlaylist,
) -> Result<Option<Playlist>> {
    let result = sqlx::query(
        "UPDATE playlists
         SET name = COALESCE(?, name),
             description = COALESCE(?, description),
             updated_at = datetime('now')
         WHERE id = ?",
    )
    .bind(&update.name)
    .bind(&update.description)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_by_id(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: &PlaylistId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn contains_track(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    track_id: &TrackId,
) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM playlist_tracks WHERE playlist_id = ? AND track_id = ?",
    )
    .bind(playlist_id)
    .bind(track_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Append tracks in order. Runs in one transaction so a duplicate or missing
/// track leaves the playlist unchanged.
pub async fn add_tracks(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    track_ids: &[TrackId],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    for track_id in track_ids {
        sqlx::query("INSERT INTO playlist_tracks (playlist_id, track_id) VALUES (?, ?)")
            .bind(playlist_id)
            .bind(track_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("UPDATE playlists SET updated_at = datetime('now') WHERE id = ?")
        .bind(playlist_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(())
}

/// Returns `false` when the track was not in the playlist
pub async fn remove_track(
    pool: &SqlitePool,
    playlist_id: &PlaylistId,
    track_id: &TrackId,
) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlist_tracks WHERE playlist_id = ? AND track_id = ?")
        .bind(playlist_id)
        .bind(track_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Tracks in insertion order
pub async fn get_tracks(pool: &SqlitePool, playlist_id: &PlaylistId) -> Result<Vec<TrackDetails>> {
    let tracks = sqlx::query_as::<_, TrackDetails>(
        "SELECT t.id, t.title, t.artist_id, t.album_id, t.genre_id,
                t.file_url, t.duration_seconds, t.release_date, t.release_type, t.cover_image_url,
                t.description, t.created_at, t.updated_at,
                ar.name AS artist_name, al.title AS album_title, g.name AS genre_name
         FROM playlist_tracks pt
         INNER JOIN tracks t ON t.id = pt.track_id
         INNER JOIN artists ar ON ar.id = t.artist_id
         LEFT JOIN albums al ON al.id = t.album_id
         INNER JOIN genres g ON g.id = t.genre_id
         WHERE pt.playlist_id = ?
         ORDER BY pt.position",
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(tracks)
}
