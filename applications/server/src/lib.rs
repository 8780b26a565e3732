//! Cadence Server Library
//!
//! REST backend for the Cadence music catalog: accounts and sessions, artists,
//! albums, music uploads and streaming, playlists, an editorial news feed and
//! admin moderation.
//!
//! This library exposes the core components for the binary and for testing.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod router;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::{CacheBackend, ServerConfig};
pub use error::{Result, ServerError};
pub use router::create_router;
pub use services::{AuthService, MediaStorage};
pub use state::AppState;
