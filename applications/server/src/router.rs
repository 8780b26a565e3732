/// HTTP routing
use crate::{
    api,
    middleware::auth_middleware,
    services::media::UPLOADS_ROUTE,
    state::AppState,
};
use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Headroom over the largest upload for multipart framing and text fields
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Build the application router
///
/// An empty `cors_origins` allows any origin.
pub fn create_router(app_state: AppState, cors_origins: &[String]) -> Router {
    // Public routes (no session required)
    let public_routes = Router::new()
        .route("/status", get(api::index::status))
        .route("/stats", get(api::index::catalog_stats))
        // Auth
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login))
        .route("/auth/refresh", post(api::auth::refresh))
        .route("/auth/logout", post(api::auth::logout))
        .route("/auth/reset-password", post(api::auth::request_password_reset))
        .route(
            "/auth/reset-password/confirm",
            post(api::auth::confirm_password_reset),
        )
        .route(
            "/auth/reset-password/change-password",
            post(api::auth::change_password),
        )
        // Catalog reads
        .route("/artists", get(api::artists::list_artists))
        .route("/albums", get(api::albums::list_albums))
        .route("/genres", get(api::genres::list_genres))
        .route("/music", get(api::music::list_music))
        .route("/music/search", post(api::music::search_music))
        .route("/music/:id", get(api::music::get_music))
        .route("/music/:id/stream", get(api::music::stream_music))
        .route("/playlists", get(api::playlists::list_playlists))
        .route("/playlists/:id", get(api::playlists::get_playlist))
        .route("/news", get(api::news::list_news))
        .route("/news/:id", get(api::news::get_news));

    // Protected routes (session required)
    let protected_routes = Router::new()
        // Users
        .route(
            "/users/me",
            get(api::users::get_profile).put(api::users::update_profile),
        )
        .route("/users/me/artists", get(api::users::my_artists))
        .route("/users/me/news", get(api::users::my_news))
        .route(
            "/users/me/profile-picture",
            post(api::users::update_profile_picture),
        )
        .route("/users/:id", delete(api::users::delete_user))
        // Artists
        .route("/artists", post(api::artists::create_artist))
        .route(
            "/artists/:id",
            get(api::artists::get_artist)
                .put(api::artists::update_artist)
                .delete(api::artists::delete_artist),
        )
        .route(
            "/artists/:id/profile-picture",
            post(api::artists::update_profile_picture),
        )
        // Albums
        .route("/albums", post(api::albums::create_album))
        .route("/albums/:id", get(api::albums::get_album))
        .route(
            "/albums/:id/cover-image",
            post(api::albums::update_cover_image),
        )
        // Music
        .route("/music/upload", post(api::music::upload_music))
        .route(
            "/music/:id/cover-image",
            post(api::music::update_cover_image),
        )
        // Playlists
        .route("/playlists", post(api::playlists::create_playlist))
        .route(
            "/playlists/:id",
            put(api::playlists::update_playlist).delete(api::playlists::delete_playlist),
        )
        .route("/playlists/:id/music", post(api::playlists::add_music))
        .route(
            "/playlists/:id/music/:music_id",
            delete(api::playlists::remove_music),
        )
        // News
        .route("/news", post(api::news::create_news))
        .route(
            "/news/:id",
            put(api::news::update_news).delete(api::news::delete_news),
        )
        .route("/news/:id/image", post(api::news::upload_image))
        // Admin
        .route("/admin/users", get(api::admin::list_users))
        .route("/admin/users/:id", delete(api::admin::delete_user))
        .route("/admin/artists/:id", delete(api::admin::delete_artist))
        .route("/admin/albums/:id", delete(api::admin::delete_album))
        .route("/admin/music/:id", delete(api::admin::delete_music))
        .route("/admin/news/:id", delete(api::admin::delete_news))
        .route("/admin/list", get(api::admin::list_admins))
        .route("/admin/news/review", get(api::admin::pending_news))
        .route("/admin/news/:id/review", post(api::admin::review_news))
        .route("/admin/genres", post(api::genres::create_genre))
        .route(
            "/admin/genres/:id",
            put(api::genres::update_genre).delete(api::genres::delete_genre),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    let body_limit = app_state.media.max_audio_bytes() + MULTIPART_OVERHEAD;
    let uploads = ServeDir::new(app_state.media.base_path());

    Router::new()
        .nest("/api/v1", public_routes.merge(protected_routes))
        .nest_service(UPLOADS_ROUTE, uploads)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(false)),
        )
        .layer(cors_layer(cors_origins))
        .with_state(app_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::permissive().allow_origin(AllowOrigin::list(allowed))
}
