/// Domain types for Cadence

/// Stores a unit enum as its lowercase `TEXT` form
macro_rules! sqlx_text_enum {
    ($name:ident) => {
        #[cfg(feature = "sqlx-support")]
        impl sqlx::Type<sqlx::Sqlite> for $name {
            fn type_info() -> sqlx::sqlite::SqliteTypeInfo {
                <String as sqlx::Type<sqlx::Sqlite>>::type_info()
            }

            fn compatible(ty: &sqlx::sqlite::SqliteTypeInfo) -> bool {
                <String as sqlx::Type<sqlx::Sqlite>>::compatible(ty)
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl<'q> sqlx::Encode<'q, sqlx::Sqlite> for $name {
            fn encode_by_ref(
                &self,
                args: &mut Vec<sqlx::sqlite::SqliteArgumentValue<'q>>,
            ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
                <&str as sqlx::Encode<sqlx::Sqlite>>::encode(self.as_str(), args)
            }
        }

        #[cfg(feature = "sqlx-support")]
        impl<'r> sqlx::Decode<'r, sqlx::Sqlite> for $name {
            fn decode(
                value: sqlx::sqlite::SqliteValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s = <String as sqlx::Decode<sqlx::Sqlite>>::decode(value)?;
                Ok(s.parse::<$name>()?)
            }
        }
    };
}

pub mod catalog;
pub mod ids;
pub mod news;
pub mod playlist;
pub mod user;

pub use catalog::{
    Album, Artist, CreateAlbum, CreateArtist, CreateTrack, Genre, ReleaseType, Track,
    TrackDetails, TrackFilter, UpdateArtist,
};
pub use ids::{
    AdminId, AlbumId, ArtistId, GenreId, NewsId, NewsImageId, PlaylistId, SessionId, TrackId,
    UserId,
};
pub use news::{CreateNews, News, NewsCategory, NewsImage, NewsStatus, UpdateNews};
pub use playlist::{CreatePlaylist, Playlist, UpdatePlaylist};
pub use user::{Admin, AdminSummary, CreateUser, Session, User};

use serde::{Deserialize, Serialize};

/// Row counts reported by the stats endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx-support", derive(sqlx::FromRow))]
pub struct CatalogStats {
    pub users: i64,
    pub artists: i64,
    pub albums: i64,
    pub music: i64,
    pub playlists: i64,
    pub news: i64,
}
