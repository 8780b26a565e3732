use cadence_core::{error::Result, types::CatalogStats};
use sqlx::SqlitePool;

/// Row counts for the main tables in a single round trip
pub async fn counts(pool: &SqlitePool) -> Result<CatalogStats> {
    let stats = sqlx::query_as::<_, CatalogStats>(
        "SELECT
            (SELECT COUNT(*) FROM users) AS users,
            (SELECT COUNT(*) FROM artists) AS artists,
            (SELECT COUNT(*) FROM albums) AS albums,
            (SELECT COUNT(*) FROM tracks) AS music,
            (SELECT COUNT(*) FROM playlists) AS playlists,
            (SELECT COUNT(*) FROM news) AS news",
    )
    .fetch_one(pool)
    .await?;

    Ok(stats)
}
