use cadence_core::{error::Result, types::*, CadenceError};
use sqlx::SqlitePool;

const COLUMNS: &str = "id, username, email, password_hash, profile_picture_url, reset_token, created_at, updated_at";

pub async fn get_all(pool: &SqlitePool) -> Result<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {COLUMNS} FROM users ORDER BY created_at, rowid"
    ))
    .fetch_all(pool)
    .await?;

    Ok(users)
}

pub async fn get_by_id(pool: &SqlitePool, id: &UserId) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = ?"))
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<User>> {
    let user =
        sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE username = ?"))
            .bind(username)
            .fetch_optional(pool)
            .await?;

    Ok(user)
}

pub async fn find_by_reset_token(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let user =
        sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE reset_token = ?"))
            .bind(token)
            .fetch_optional(pool)
            .await?;

    Ok(user)
}

/// Insert a user. A taken username or email surfaces as `CadenceError::Duplicate`.
pub async fn create(pool: &SqlitePool, user: CreateUser) -> Result<User> {
    let id = UserId::generate();

    sqlx::query("INSERT INTO users (id, username, email, password_hash) VALUES (?, ?, ?, ?)")
        .bind(&id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .execute(pool)
        .await?;

    get_by_id(pool, &id)
        .await?
        .ok_or_else(|| CadenceError::storage("Failed to retrieve created user"))
}

pub async fn update_username(pool: &SqlitePool, id: &UserId, username: &str) -> Result<()> {
    let result = sqlx::query(
        "UPDATE users SET username = ?, updated_at = datetime('now') WHERE id = ?",
    )
    .bind(username)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CadenceError::not_found("User", id.as_str()));
    }

    Ok(())
}

/// Replace the password hash and consume any outstanding reset token
pub async fn update_password(pool: &SqlitePool, id: &UserId, password_hash: &str) -> Result<()> {
    let result = sqlx::query(
        "UPDATE users SET password_hash = ?, reset_token = NULL, updated_at = datetime('now')
         WHERE id = ?",
    )
    .bind(password_hash)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CadenceError::not_found("User", id.as_str()));
    }

    Ok(())
}

pub async fn set_reset_token(pool: &SqlitePool, id: &UserId, token: Option<&str>) -> Result<()> {
    sqlx::query("UPDATE users SET reset_token = ?, updated_at = datetime('now') WHERE id = ?")
        .bind(token)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn set_profile_picture(pool: &SqlitePool, id: &UserId, url: &str) -> Result<()> {
    sqlx::query(
        "UPDATE users SET profile_picture_url = ?, updated_at = datetime('now') WHERE id = ?",
    )
    .bind(url)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Returns `false` when no row matched
pub async fn delete(pool: &SqlitePool, id: &UserId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
