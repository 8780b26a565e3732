/// Server services
pub mod auth;
pub mod media;
pub mod upload;

pub use auth::AuthService;
pub use media::{ImageKind, MediaStorage};
pub use upload::{MultipartForm, UploadedFile};
