/// Authentication API routes
use super::{invalidate, links::links, links::resource, non_empty, JsonBody};
use crate::{
    error::{Result, ServerError},
    middleware::{auth::resolve_session, auth::token_from_headers, SESSION_COOKIE},
    state::AppState,
};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use cadence_cache::{keys, EntityKind};
use cadence_core::{validation::validate_username, CreateUser};
use cadence_storage::{sessions, users};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmResetRequest {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub new_password: Option<String>,
    pub confirm_password: Option<String>,
}

/// First four characters of an email for log lines
pub fn mask_email(email: &str) -> String {
    let head: String = email.chars().take(4).collect();
    format!("{head}***@***")
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.secure_cookies)
        .build()
}

/// POST /api/v1/auth/register
pub async fn register(
    State(app_state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse> {
    let (Some(username), Some(email), Some(password)) = (
        non_empty(req.username),
        non_empty(req.email),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        tracing::warn!("Attempted registration with missing fields");
        return Err(ServerError::bad_request("Missing fields"));
    };

    validate_username(&username)?;

    let pool = app_state.db.pool();
    if users::find_by_email(pool, &email).await?.is_some() {
        tracing::info!("Email {} already registered", mask_email(&email));
        return Err(ServerError::bad_request("Email already registered"));
    }
    if users::find_by_username(pool, &username).await?.is_some() {
        return Err(ServerError::bad_request("Username already exists"));
    }

    let password_hash = app_state.auth_service.hash_password_blocking(password).await?;
    let user = users::create(
        pool,
        CreateUser {
            username,
            email: email.clone(),
            password_hash,
        },
    )
    .await?;

    tracing::info!("New user registered: ({})", mask_email(&email));

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User registered successfully",
            "userId": user.id,
            "_links": links("/users/me", &[("login", "/auth/login".to_string())]),
        })),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    let (Some(email), Some(password)) = (
        non_empty(req.email),
        req.password.filter(|p| !p.is_empty()),
    ) else {
        tracing::warn!("Login attempt with missing fields");
        return Err(ServerError::bad_request("Missing fields"));
    };

    let invalid = || ServerError::Auth("Invalid email or password".to_string());

    let user = users::find_by_email(app_state.db.pool(), &email)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Failed login attempt for email: {}", mask_email(&email));
            invalid()
        })?;

    if !app_state
        .auth_service
        .verify_password_blocking(password, user.password_hash.clone())
        .await?
    {
        tracing::warn!("Failed login attempt for email: {}", mask_email(&email));
        return Err(invalid());
    }

    let session = sessions::create(
        app_state.db.pool(),
        &user.id,
        app_state.auth_service.session_ttl_seconds(),
    )
    .await?;

    let access_token = app_state
        .auth_service
        .create_access_token(&user.id, &session.id)?;
    let refresh_token = app_state
        .auth_service
        .create_refresh_token(&user.id, &session.id)?;

    tracing::info!(user_id = %user.id, "User logged in");

    let jar = jar.add(session_cookie(&app_state, access_token.clone()));

    Ok((
        jar,
        Json(LoginResponse {
            message: "Logged in successfully".to_string(),
            user_id: user.id.to_string(),
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
        }),
    ))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(app_state): State<AppState>,
    jar: CookieJar,
    JsonBody(req): JsonBody<RefreshRequest>,
) -> Result<(CookieJar, Json<RefreshResponse>)> {
    let token = non_empty(req.refresh_token)
        .ok_or_else(|| ServerError::bad_request("Missing fields"))?;

    let identity = app_state
        .auth_service
        .verify_refresh_token(&token)
        .map_err(|_| ServerError::Auth("Invalid or expired token".to_string()))?;

    // The session must still be live; logout revokes refresh tokens as well
    let session = sessions::get_active(app_state.db.pool(), &identity.session_id)
        .await?
        .filter(|s| s.user_id == identity.user_id)
        .ok_or_else(|| ServerError::Auth("Invalid or expired session".to_string()))?;

    let access_token = app_state
        .auth_service
        .create_access_token(&session.user_id, &session.id)?;

    let jar = jar.add(session_cookie(&app_state, access_token.clone()));

    Ok((
        jar,
        Json(RefreshResponse {
            access_token,
            token_type: "Bearer".to_string(),
        }),
    ))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Json<Value>)> {
    let no_session = || ServerError::bad_request("No active session");

    let token = token_from_headers(&headers).ok_or_else(|| {
        tracing::info!("Logout attempt with no active session");
        no_session()
    })?;
    let user = resolve_session(&app_state, &token)
        .await
        .map_err(|_| no_session())?;

    sessions::delete(app_state.db.pool(), &user.session_id).await?;
    tracing::info!(user_id = %user.user_id, "User logged out");

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));

    Ok((
        jar,
        Json(json!({
            "message": "Logged out successfully",
            "_links": links("/auth/logout", &[("login", "/auth/login".to_string())]),
        })),
    ))
}

/// POST /api/v1/auth/reset-password
pub async fn request_password_reset(
    State(app_state): State<AppState>,
    JsonBody(req): JsonBody<ResetRequest>,
) -> Result<Json<Value>> {
    let email = non_empty(req.email).ok_or_else(|| ServerError::bad_request("Email required"))?;

    let user = users::find_by_email(app_state.db.pool(), &email)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Password reset request for unknown email: {}", mask_email(&email));
            ServerError::not_found("User not found")
        })?;

    let reset_token = uuid::Uuid::new_v4().to_string();
    users::set_reset_token(app_state.db.pool(), &user.id, Some(&reset_token)).await?;

    tracing::info!("Password reset token generated for {}", mask_email(&email));

    Ok(Json(json!({
        "email": email,
        "reset_token": reset_token,
        "_links": links(
            "/auth/reset-password",
            &[("confirm", "/auth/reset-password/confirm".to_string())],
        ),
    })))
}

/// POST /api/v1/auth/reset-password/confirm
///
/// Redirects to the change-password route carrying the token.
pub async fn confirm_password_reset(
    State(app_state): State<AppState>,
    JsonBody(req): JsonBody<ConfirmResetRequest>,
) -> Result<impl IntoResponse> {
    let token = non_empty(req.token).ok_or_else(|| ServerError::bad_request("Missing fields"))?;

    let user = users::find_by_reset_token(app_state.db.pool(), &token)
        .await?
        .ok_or_else(|| ServerError::bad_request("Invalid or expired token"))?;

    tracing::info!(user_id = %user.id, "Password reset confirmed");

    let location = resource(&format!(
        "/auth/reset-password/change-password?token={}",
        user.reset_token.unwrap_or(token)
    ));

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]))
}

/// POST /api/v1/auth/reset-password/change-password?token=
pub async fn change_password(
    State(app_state): State<AppState>,
    Query(query): Query<TokenQuery>,
    JsonBody(req): JsonBody<ChangePasswordRequest>,
) -> Result<Json<Value>> {
    let (Some(token), Some(new_password), Some(confirm_password)) = (
        non_empty(query.token),
        req.new_password.filter(|p| !p.is_empty()),
        req.confirm_password.filter(|p| !p.is_empty()),
    ) else {
        return Err(ServerError::bad_request("Missing fields"));
    };

    if new_password != confirm_password {
        return Err(ServerError::bad_request("Passwords do not match"));
    }

    let pool = app_state.db.pool();
    let user = users::find_by_reset_token(pool, &token)
        .await?
        .ok_or_else(|| ServerError::bad_request("Invalid or expired token"))?;

    let password_hash = app_state
        .auth_service
        .hash_password_blocking(new_password)
        .await?;
    users::update_password(pool, &user.id, &password_hash).await?;

    let revoked = sessions::delete_for_user(pool, &user.id).await?;
    invalidate(&app_state, &keys::entity_patterns(EntityKind::User, &user.id)).await;

    tracing::info!(user_id = %user.id, revoked, "Password changed");

    Ok(Json(json!({
        "message": "Password reset successfully",
        "_links": links("/auth/reset-password/change-password", &[("login", "/auth/login".to_string())]),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emails_are_masked() {
        assert_eq!(mask_email("someone@example.com"), "some***@***");
        assert_eq!(mask_email("ab"), "ab***@***");
    }
}
