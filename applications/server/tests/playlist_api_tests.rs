/// Playlist API tests
mod common;

use axum::http::StatusCode;
use common::{Session, TestApp};
use serde_json::json;

/// One user with a genre, an artist and `titles` uploaded as singles
async fn seeded(app: &TestApp, titles: &[&str]) -> (Session, Vec<String>) {
    let session = app.signup("listener").await;
    app.add_genre("Ambient").await;
    app.create_artist(&session, "Drone Unit").await;

    let mut ids = Vec::new();
    for title in titles {
        let res = app
            .upload_music(&session, title, "Drone Unit", "Ambient", None)
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        ids.push(res.json()["musicId"].as_str().unwrap().to_string());
    }
    (session, ids)
}

async fn create_playlist(app: &TestApp, session: &Session, name: &str) -> String {
    let res = app
        .post_json(
            "/api/v1/playlists",
            Some(&session.token),
            json!({ "name": name, "description": "For testing" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.json()["message"], "Playlist created successfully");
    res.json()["playlistId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_requires_name() {
    let app = TestApp::new().await;
    let session = app.signup("nameless").await;

    let res = app
        .post_json("/api/v1/playlists", Some(&session.token), json!({ "description": "x" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Missing name");

    let res = app
        .post_json("/api/v1/playlists", None, json!({ "name": "Anonymous" }))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_tracks_keep_insertion_order() {
    let app = TestApp::new().await;
    let (session, ids) = seeded(&app, &["First", "Second", "Third"]).await;
    let playlist_id = create_playlist(&app, &session, "Ordered").await;

    let res = app
        .post_json(
            &format!("/api/v1/playlists/{playlist_id}/music"),
            Some(&session.token),
            json!({ "music_ids": [ids[2], ids[0]] }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "Music added to playlist successfully");

    let res = app
        .post_json(
            &format!("/api/v1/playlists/{playlist_id}/music"),
            Some(&session.token),
            json!({ "music_ids": [ids[1]] }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);

    // Public read
    let res = app.get(&format!("/api/v1/playlists/{playlist_id}"), None).await;
    assert_eq!(res.status, StatusCode::OK);

    let playlist = &res.json()["playlist"];
    assert_eq!(playlist["name"], "Ordered");
    let titles: Vec<&str> = playlist["music"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Third", "First", "Second"]);
    assert_eq!(playlist["music"][0]["duration"], "3:30");
    assert_eq!(playlist["music"][0]["artist"], "Drone Unit");
}

#[tokio::test]
async fn test_add_music_rejections_leave_playlist_unchanged() {
    let app = TestApp::new().await;
    let (session, ids) = seeded(&app, &["Only"]).await;
    let playlist_id = create_playlist(&app, &session, "Strict").await;
    let uri = format!("/api/v1/playlists/{playlist_id}/music");

    let res = app
        .post_json(&uri, Some(&session.token), json!({ "music_ids": [] }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "No music provided");

    let res = app
        .post_json(&uri, Some(&session.token), json!({ "music_ids": [ids[0], "ghost"] }))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "Music with id ghost not found");

    let res = app.get(&format!("/api/v1/playlists/{playlist_id}"), None).await;
    assert_eq!(res.json()["playlist"]["music"], json!([]));

    let res = app
        .post_json(&uri, Some(&session.token), json!({ "music_ids": [ids[0]] }))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app
        .post_json(&uri, Some(&session.token), json!({ "music_ids": [ids[0]] }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Music already in playlist");
}

#[tokio::test]
async fn test_remove_music() {
    let app = TestApp::new().await;
    let (session, ids) = seeded(&app, &["Keep", "Drop"]).await;
    let playlist_id = create_playlist(&app, &session, "Trimmed").await;

    app.post_json(
        &format!("/api/v1/playlists/{playlist_id}/music"),
        Some(&session.token),
        json!({ "music_ids": [ids[0], ids[1]] }),
    )
    .await;

    // Cache the playlist before changing it
    app.get(&format!("/api/v1/playlists/{playlist_id}"), None).await;

    let res = app
        .delete(
            &format!("/api/v1/playlists/{playlist_id}/music/{}", ids[1]),
            Some(&session.token),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "Music removed from playlist successfully");

    let res = app.get(&format!("/api/v1/playlists/{playlist_id}"), None).await;
    let music = res.json()["playlist"]["music"].clone();
    assert_eq!(music.as_array().unwrap().len(), 1);
    assert_eq!(music[0]["title"], "Keep");

    let res = app
        .delete(
            &format!("/api/v1/playlists/{playlist_id}/music/{}", ids[1]),
            Some(&session.token),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Music not found in the playlist.");
}

#[tokio::test]
async fn test_only_owner_may_modify() {
    let app = TestApp::new().await;
    let (owner, ids) = seeded(&app, &["Mine"]).await;
    let intruder = app.signup("intruder").await;
    let playlist_id = create_playlist(&app, &owner, "Private Mix").await;

    let res = app
        .put_json(
            &format!("/api/v1/playlists/{playlist_id}"),
            Some(&intruder.token),
            json!({ "name": "Taken" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error(), "Unauthorized to update this playlist");

    let res = app
        .post_json(
            &format!("/api/v1/playlists/{playlist_id}/music"),
            Some(&intruder.token),
            json!({ "music_ids": [ids[0]] }),
        )
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .delete(&format!("/api/v1/playlists/{playlist_id}"), Some(&intruder.token))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error(), "Unauthorized to delete this playlist");
}

#[tokio::test]
async fn test_update_list_and_delete() {
    let app = TestApp::new().await;
    let session = app.signup("curator").await;
    let playlist_id = create_playlist(&app, &session, "Draft").await;
    create_playlist(&app, &session, "Another").await;

    let res = app.get("/api/v1/playlists?limit=1", None).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["total_count"], 2);
    assert_eq!(body["playlists"].as_array().unwrap().len(), 1);
    assert_eq!(body["_links"]["next"], "/api/v1/playlists?page=2&limit=1");

    let res = app
        .put_json(
            &format!("/api/v1/playlists/{playlist_id}"),
            Some(&session.token),
            json!({ "name": "Final" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "Playlist updated successfully");

    let res = app.get(&format!("/api/v1/playlists/{playlist_id}"), None).await;
    assert_eq!(res.json()["playlist"]["name"], "Final");
    assert_eq!(res.json()["playlist"]["description"], "For testing");

    let res = app
        .delete(&format!("/api/v1/playlists/{playlist_id}"), Some(&session.token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "Playlist deleted successfully");

    let res = app.get(&format!("/api/v1/playlists/{playlist_id}"), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "Playlist not found");
}
