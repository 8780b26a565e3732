//! Cache key naming
//!
//! | Key | Holds |
//! |---|---|
//! | `{kind}_{id}` | one resource |
//! | `{kind}_{id}_user_{user}` | one resource as seen by one user |
//! | `{kinds}_list:page_{p}:limit_{l}[:{filter}]` | one page of a listing |
//! | `user_news:{user}:page_{p}:limit_{l}` | a user's own news |
//! | `user_artists:{user}` | artists owned by a user |
//!
//! Invalidation patterns use Redis `MATCH` syntax. Ids and other caller
//! supplied parts are escaped with [`escape`] before they enter a pattern.

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    User,
    Artist,
    Album,
    Genre,
    Music,
    Playlist,
    News,
}

impl EntityKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            EntityKind::User => "user",
            EntityKind::Artist => "artist",
            EntityKind::Album => "album",
            EntityKind::Genre => "genre",
            EntityKind::Music => "music",
            EntityKind::Playlist => "playlist",
            EntityKind::News => "news",
        }
    }

    /// Prefix of listing keys
    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::User => "users",
            EntityKind::Artist => "artists",
            EntityKind::Album => "albums",
            EntityKind::Genre => "genres",
            EntityKind::Music => "music",
            EntityKind::Playlist => "playlists",
            EntityKind::News => "news",
        }
    }
}

pub fn entity(kind: EntityKind, id: impl Display) -> String {
    format!("{}_{}", kind.prefix(), id)
}

pub fn entity_for_user(kind: EntityKind, id: impl Display, user_id: impl Display) -> String {
    format!("{}_{}_user_{}", kind.prefix(), id, user_id)
}

pub fn list(kind: EntityKind, page: u32, limit: u32) -> String {
    format!("{}_list:page_{}:limit_{}", kind.plural(), page, limit)
}

pub fn filtered_list(kind: EntityKind, page: u32, limit: u32, filter: &str) -> String {
    format!("{}:{}", list(kind, page, limit), filter)
}

pub fn user_news(user_id: impl Display, page: u32, limit: u32) -> String {
    format!("user_news:{}:page_{}:limit_{}", user_id, page, limit)
}

pub fn user_news_pattern(user_id: impl Display) -> String {
    format!("user_news:{}:*", escape(&user_id.to_string()))
}

pub fn user_artists(user_id: impl Display) -> String {
    format!("user_artists:{}", user_id)
}

/// Pattern matching exactly the `user_artists` key of one user
pub fn user_artists_pattern(user_id: impl Display) -> String {
    escape(&user_artists(user_id))
}

/// Backslash-escape glob metacharacters so `value` only matches itself
pub fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Patterns covering every single-resource key and every listing of `kind`
pub fn kind_patterns(kind: EntityKind) -> Vec<String> {
    vec![
        format!("{}_*", kind.prefix()),
        format!("{}_list:*", kind.plural()),
    ]
}

/// Patterns covering one resource, including its per-user variants
pub fn entity_patterns(kind: EntityKind, id: impl Display) -> Vec<String> {
    let key = escape(&entity(kind, id));
    vec![format!("{key}_user_*"), key]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_shapes() {
        assert_eq!(entity(EntityKind::Artist, "a1"), "artist_a1");
        assert_eq!(
            entity_for_user(EntityKind::Playlist, "p1", "u1"),
            "playlist_p1_user_u1"
        );
        assert_eq!(list(EntityKind::Album, 2, 10), "albums_list:page_2:limit_10");
        assert_eq!(
            filtered_list(EntityKind::Music, 1, 10, "genre_Rock"),
            "music_list:page_1:limit_10:genre_Rock"
        );
        assert_eq!(user_news("u1", 3, 5), "user_news:u1:page_3:limit_5");
    }

    #[test]
    fn kind_patterns_cover_entities_and_lists() {
        assert_eq!(
            kind_patterns(EntityKind::Playlist),
            vec!["playlist_*".to_string(), "playlists_list:*".to_string()]
        );
        assert_eq!(
            entity_patterns(EntityKind::News, "n1"),
            vec!["news_n1_user_*".to_string(), "news_n1".to_string()]
        );
    }

    #[test]
    fn caller_supplied_parts_are_escaped() {
        assert_eq!(escape("a*b?[c]\\d"), "a\\*b\\?\\[c\\]\\\\d");
        assert_eq!(
            entity_patterns(EntityKind::Artist, "*"),
            vec!["artist_\\*_user_*".to_string(), "artist_\\*".to_string()]
        );
        assert_eq!(user_news_pattern("u?"), "user_news:u\\?:*");
        assert_eq!(user_artists_pattern("u1"), "user_artists:u1");
    }
}
