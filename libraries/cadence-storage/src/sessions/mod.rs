use cadence_core::{error::Result, types::*, CadenceError};
use sqlx::SqlitePool;

/// Open a session that expires `ttl_seconds` from now
pub async fn create(pool: &SqlitePool, user_id: &UserId, ttl_seconds: i64) -> Result<Session> {
    let id = SessionId::generate();
    let expires_at = chrono::Utc::now().timestamp() + ttl_seconds;

    sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
        .bind(&id)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| CadenceError::storage("Failed to retrieve created session"))
}

pub async fn get_by_id(pool: &SqlitePool, id: &SessionId) -> Result<Option<Session>> {
    let session = sqlx::query_as::<_, Session>(
        "SELECT id, user_id, created_at, expires_at FROM sessions WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// Fetch a session only if it has not expired
pub async fn get_active(pool: &SqlitePool, id: &SessionId) -> Result<Option<Session>> {
    let now = chrono::Utc::now().timestamp();
    Ok(get_by_id(pool, id).await?.filter(|s| !s.is_expired(now)))
}

pub async fn delete(pool: &SqlitePool, id: &SessionId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Log a user out everywhere
pub async fn delete_for_user(pool: &SqlitePool, user_id: &UserId) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

pub async fn purge_expired(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(chrono::Utc::now().timestamp())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
