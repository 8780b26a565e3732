/// Catalog types: artists, albums, genres and tracks
use super::{AlbumId, ArtistId, GenreId, TrackId, UserId};
use crate::error::CadenceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Artist profile, optionally owned by the user who created it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Artist {
    pub id: ArtistId,
    pub name: String,
    pub bio: Option<String>,
    pub profile_picture_url: Option<String>,
    pub user_id: Option<UserId>,
    pub created_at: String,
    pub updated_at: String,
}

impl Artist {
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        self.user_id.as_ref() == Some(user_id)
    }
}

#[derive(Debug, Clone)]
pub struct CreateArtist {
    pub name: String,
    pub bio: Option<String>,
    pub user_id: UserId,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct UpdateArtist {
    pub name: Option<String>,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub artist_id: ArtistId,
    /// `YYYY-MM-DD`
    pub release_date: Option<String>,
    pub cover_image_url: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct CreateAlbum {
    pub title: String,
    pub artist_id: ArtistId,
    pub release_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
    pub created_at: String,
}

/// Whether a track is a standalone single or part of an album
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseType {
    Single,
    Album,
}

impl ReleaseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReleaseType::Single => "single",
            ReleaseType::Album => "album",
        }
    }

    /// A track uploaded with an album is an album track, otherwise a single
    pub fn for_album(album: Option<&AlbumId>) -> Self {
        if album.is_some() {
            ReleaseType::Album
        } else {
            ReleaseType::Single
        }
    }
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReleaseType {
    type Err = CadenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(ReleaseType::Single),
            "album" => Ok(ReleaseType::Album),
            other => Err(CadenceError::invalid_input(format!(
                "Invalid release type: {other}"
            ))),
        }
    }
}

sqlx_text_enum!(ReleaseType);

/// A track ("music") row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct Track {
    pub id: TrackId,
    pub title: String,
    pub artist_id: ArtistId,
    pub album_id: Option<AlbumId>,
    pub genre_id: GenreId,
    pub file_url: String,
    pub duration_seconds: i64,
    pub release_date: Option<String>,
    pub release_type: ReleaseType,
    pub cover_image_url: Option<String>,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// A track joined with the names of its artist, album and genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct TrackDetails {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx-support", sqlx(flatten))]
    pub track: Track,
    pub artist_name: String,
    pub album_title: Option<String>,
    pub genre_name: String,
}

#[derive(Debug, Clone)]
pub struct CreateTrack {
    pub title: String,
    pub artist_id: ArtistId,
    pub album_id: Option<AlbumId>,
    pub genre_id: GenreId,
    pub file_url: String,
    pub duration_seconds: i64,
    pub release_date: Option<String>,
    pub description: Option<String>,
}

/// Equality filters on related names used by the track listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackFilter {
    pub genre: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
}

impl TrackFilter {
    pub fn is_empty(&self) -> bool {
        self.genre.is_none() && self.artist.is_none() && self.album.is_none()
    }

    /// Stable textual form, used to build cache keys
    pub fn cache_suffix(&self) -> String {
        format!(
            "genre_{}:artist_{}:album_{}",
            self.genre.as_deref().unwrap_or(""),
            self.artist.as_deref().unwrap_or(""),
            self.album.as_deref().unwrap_or("")
        )
    }
}
