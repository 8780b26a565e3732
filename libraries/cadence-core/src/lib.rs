//! Cadence Core
//!
//! Domain types, typed identifiers, validation rules and error handling shared
//! by the Cadence storage layer, cache layer and HTTP server.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `User`, `Artist`, `Album`, `Track`, `Playlist`, `News`, etc.
//! - **Validation**: duration, release date, username and news rules
//! - **Pagination**: `PageParams` and `Page<T>` used by every list endpoint
//! - **Error Handling**: Unified `CadenceError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cadence_core::validation::{format_duration, parse_duration};
//!
//! let seconds = parse_duration("5:54").unwrap();
//! assert_eq!(seconds, 354);
//! assert_eq!(format_duration(seconds), "5:54");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod pagination;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use error::{CadenceError, Result};
pub use pagination::{paginate, Page, PageParams};

pub use types::{
    // Identifiers
    AdminId, AlbumId, ArtistId, GenreId, NewsId, NewsImageId, PlaylistId, SessionId, TrackId,
    UserId,
    // Accounts
    Admin, AdminSummary, CreateUser, Session, User,
    // Catalog
    Album, Artist, CreateAlbum, CreateArtist, CreateTrack, Genre, ReleaseType, Track,
    TrackDetails, TrackFilter, UpdateArtist,
    // Playlists
    CreatePlaylist, Playlist, UpdatePlaylist,
    // News
    CreateNews, News, NewsCategory, NewsImage, NewsStatus, UpdateNews,
    // Stats
    CatalogStats,
};
