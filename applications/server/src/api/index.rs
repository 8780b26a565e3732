/// Service status and catalog statistics
use crate::{error::Result, state::AppState};
use axum::{extract::State, Json};
use cadence_storage::stats;
use serde_json::{json, Value};

/// GET /api/v1/status
pub async fn status() -> Json<Value> {
    Json(json!({ "status": "OK" }))
}

/// GET /api/v1/stats
pub async fn catalog_stats(State(app_state): State<AppState>) -> Result<Json<Value>> {
    let counts = stats::counts(app_state.db.pool()).await?;

    Ok(Json(json!({
        "users": counts.users,
        "artists": counts.artists,
        "albums": counts.albums,
        "music": counts.music,
        "playlists": counts.playlists,
        "news": counts.news,
    })))
}
