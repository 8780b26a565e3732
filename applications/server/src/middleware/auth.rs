/// Authentication middleware
use crate::{error::ServerError, services::auth::TokenIdentity, state::AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use cadence_core::{SessionId, UserId};
use cadence_storage::{admins, sessions};

/// Cookie carrying the access token of the current session
pub const SESSION_COOKIE: &str = "session";

/// Extension type to store the authenticated caller in the request.
/// Can be used as an extractor in handlers.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub session_id: SessionId,
}

impl AuthenticatedUser {
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

/// Authenticated caller that also holds an admin grant
#[derive(Debug, Clone)]
pub struct AdminUser(pub AuthenticatedUser);

impl AdminUser {
    pub fn user_id(&self) -> &UserId {
        &self.0.user_id
    }
}

/// Access token from `Authorization: Bearer`, falling back to the session cookie
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::to_string);

    bearer.or_else(|| {
        CookieJar::from_headers(headers)
            .get(SESSION_COOKIE)
            .map(|c| c.value().to_string())
            .filter(|v| !v.is_empty())
    })
}

/// Resolve a token to a live server-side session
pub async fn resolve_session(state: &AppState, token: &str) -> Result<AuthenticatedUser, ServerError> {
    let TokenIdentity {
        user_id,
        session_id,
    } = state.auth_service.verify_access_token(token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        ServerError::Auth("Invalid or expired session".to_string())
    })?;

    let session = sessions::get_active(state.db.pool(), &session_id)
        .await?
        .filter(|s| s.user_id == user_id)
        .ok_or_else(|| ServerError::Auth("Invalid or expired session".to_string()))?;

    Ok(AuthenticatedUser {
        user_id: session.user_id,
        session_id: session.id,
    })
}

/// Middleware that requires a valid token naming a live session
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let token = token_from_headers(request.headers())
        .ok_or_else(|| ServerError::Auth("No active session".to_string()))?;

    let user = resolve_session(&state, &token).await?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Implement FromRequestParts so AuthenticatedUser can be used as an extractor
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ServerError::Auth("No active session".to_string()))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ServerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthenticatedUser::from_request_parts(parts, state).await?;

        if !admins::is_admin(state.db.pool(), &user.user_id).await? {
            tracing::warn!(user_id = %user.user_id, "Admin route refused");
            return Err(ServerError::forbidden("Admin privileges required"));
        }

        Ok(AdminUser(user))
    }
}
