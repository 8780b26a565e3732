/// Account types: users, admin grants and login sessions
use super::{AdminId, SessionId, UserId};
use serde::{Deserialize, Serialize};

/// A registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub profile_picture_url: Option<String>,
    #[serde(skip_serializing, default)]
    pub reset_token: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Input for registering a user. The password must already be hashed.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Marks a user as an administrator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Admin {
    pub id: AdminId,
    pub user_id: UserId,
    pub created_at: String,
}

/// Admin grant joined with the account it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct AdminSummary {
    pub id: AdminId,
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

/// Server-side login session. Logout deletes the row, which revokes every
/// token minted for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub created_at: String,
    /// Unix timestamp (seconds)
    pub expires_at: i64,
}

impl Session {
    pub fn is_expired(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}
