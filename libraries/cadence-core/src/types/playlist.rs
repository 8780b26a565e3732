/// Playlist types
use super::{PlaylistId, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Playlist {
    pub id: PlaylistId,
    pub name: String,
    pub description: Option<String>,
    pub user_id: UserId,
    pub created_at: String,
    pub updated_at: String,
}

impl Playlist {
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.user_id == user_id
    }
}

#[derive(Debug, Clone)]
pub struct CreatePlaylist {
    pub name: String,
    pub description: Option<String>,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default)]
pub struct UpdatePlaylist {
    pub name: Option<String>,
    pub description: Option<String>,
}
