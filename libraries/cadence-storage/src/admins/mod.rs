use cadence_core::{error::Result, types::*, CadenceError};
use sqlx::SqlitePool;

pub async fn is_admin(pool: &SqlitePool, user_id: &UserId) -> Result<bool> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM admins WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

/// Grant admin rights. Granting twice is a `Duplicate` error.
pub async fn grant(pool: &SqlitePool, user_id: &UserId) -> Result<Admin> {
    let id = AdminId::generate();

    sqlx::query("INSERT INTO admins (id, user_id) VALUES (?, ?)")
        .bind(&id)
        .bind(user_id)
        .execute(pool)
        .await?;

    sqlx::query_as::<_, Admin>("SELECT id, user_id, created_at FROM admins WHERE id = ?")
        .bind(&id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CadenceError::storage("Failed to retrieve created admin"))
}

pub async fn revoke(pool: &SqlitePool, user_id: &UserId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM admins WHERE user_id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<AdminSummary>> {
    let admins = sqlx::query_as::<_, AdminSummary>(
        "SELECT a.id, a.user_id, u.username, u.email, a.created_at
         FROM admins a
         INNER JOIN users u ON u.id = a.user_id
         ORDER BY a.created_at, a.rowid",
    )
    .fetch_all(pool)
    .await?;

    Ok(admins)
}
