/// Request middleware and auth extractors
pub mod auth;

pub use auth::{auth_middleware, AdminUser, AuthenticatedUser, SESSION_COOKIE};
