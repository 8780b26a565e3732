/// News feed and admin moderation API tests
mod common;

use axum::http::StatusCode;
use common::{fixtures, Session, TestApp};
use serde_json::json;

async fn post_news(app: &TestApp, session: &Session, title: &str) -> String {
    let res = app
        .post_json(
            "/api/v1/news",
            Some(&session.token),
            json!({
                "title": title,
                "content": fixtures::long_content(),
                "category": "Album Release",
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED, "news failed: {:?}", res.json());
    assert_eq!(res.json()["message"], "News created successfully");
    res.json()["newsId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_create_news_validation_order() {
    let app = TestApp::new().await;
    let session = app.signup("writer").await;

    // Category is checked before the other fields
    let res = app
        .post_json(
            "/api/v1/news",
            Some(&session.token),
            json!({ "category": "Gossip" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Invalid category");

    let res = app
        .post_json(
            "/api/v1/news",
            Some(&session.token),
            json!({ "title": "No body", "category": "Music Charts" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Missing title or content");

    let res = app
        .post_json(
            "/api/v1/news",
            Some(&session.token),
            json!({ "title": "Too short", "content": "just a few words" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Content must be at least 500 words.");
}

#[tokio::test]
async fn test_news_read_back_with_author_and_images() {
    let app = TestApp::new().await;
    let session = app.signup("reporter").await;
    let news_id = post_news(&app, &session, "Big Release").await;

    let png = fixtures::png_bytes();
    let res = app
        .post_multipart(
            &format!("/api/v1/news/{news_id}/image"),
            Some(&session.token),
            &[],
            Some(("cover.png", &png)),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let image_url = res.json()["image_url"].as_str().unwrap().to_string();
    assert!(image_url.starts_with("/uploads/news_images/"));

    let res = app.get(&format!("/api/v1/news/{news_id}"), None).await;
    assert_eq!(res.status, StatusCode::OK);

    let news = &res.json()["news"];
    assert_eq!(news["title"], "Big Release");
    assert_eq!(news["author"], "reporter");
    assert_eq!(news["category"], "Album Release");
    assert_eq!(news["images"], json!([image_url]));

    let res = app.get("/api/v1/users/me/news", Some(&session.token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["total"], 1);
}

#[tokio::test]
async fn test_news_update_and_delete_permissions() {
    let app = TestApp::new().await;
    let author = app.signup("author").await;
    let stranger = app.signup("stranger").await;
    let admin = app.signup_admin("moderator").await;
    let news_id = post_news(&app, &author, "Original").await;
    let uri = format!("/api/v1/news/{news_id}");

    let res = app
        .put_json(&uri, Some(&stranger.token), json!({ "title": "Hijacked" }))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app
        .put_json(&uri, Some(&author.token), json!({ "title": "Edited" }))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "News updated successfully");

    let res = app
        .put_json(&uri, Some(&admin.token), json!({ "category": "Music Awards" }))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get(&uri, None).await;
    assert_eq!(res.json()["news"]["title"], "Edited");
    assert_eq!(res.json()["news"]["category"], "Music Awards");

    let res = app.delete(&uri, Some(&stranger.token)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);

    let res = app.delete(&uri, Some(&author.token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "News deleted successfully");

    let res = app.get(&uri, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "News not found");
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = TestApp::new().await;
    let session = app.signup("regular").await;

    let res = app.get("/api/v1/admin/users", Some(&session.token)).await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error(), "Admin privileges required");

    let res = app.get("/api/v1/admin/users", None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_lists_users_and_admins() {
    let app = TestApp::new().await;
    let admin = app.signup_admin("boss").await;
    app.signup("member").await;

    let res = app.get("/api/v1/admin/users", Some(&admin.token)).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["total_count"], 2);
    assert!(body["users"][0].get("password_hash").is_none());

    let res = app.get("/api/v1/admin/list", Some(&admin.token)).await;
    assert_eq!(res.status, StatusCode::OK);
    let body = res.json();
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["admins"][0]["id"], admin.user_id.as_str());
    assert_eq!(body["admins"][0]["username"], "boss");
}

#[tokio::test]
async fn test_admin_deletes_user() {
    let app = TestApp::new().await;
    let admin = app.signup_admin("root").await;
    let target = app.signup("target").await;

    let res = app
        .delete(&format!("/api/v1/admin/users/{}", target.user_id), Some(&admin.token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "User deleted successfully");

    let res = app.get("/api/v1/users/me", Some(&target.token)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .delete(&format!("/api/v1/admin/users/{}", target.user_id), Some(&admin.token))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_music_delete_only_singles() {
    let app = TestApp::new().await;
    let admin = app.signup_admin("janitor").await;
    let artist_owner = app.signup("musician").await;
    app.add_genre("Folk").await;
    let artist_id = app.create_artist(&artist_owner, "Hollow Pines").await;
    app.create_album(&artist_owner, &artist_id, "Evergreen").await;

    let res = app
        .upload_music(&artist_owner, "Album Cut", "Hollow Pines", "Folk", Some("Evergreen"))
        .await;
    let album_track = res.json()["musicId"].as_str().unwrap().to_string();

    let res = app
        .upload_music(&artist_owner, "Lone Single", "Hollow Pines", "Folk", None)
        .await;
    let single = res.json()["musicId"].as_str().unwrap().to_string();

    let res = app
        .delete(&format!("/api/v1/admin/music/{album_track}"), Some(&admin.token))
        .await;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert_eq!(res.error(), "Cannot delete an album");

    let res = app
        .delete(&format!("/api/v1/admin/music/{single}"), Some(&admin.token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "Single deleted successfully");

    let res = app.get(&format!("/api/v1/music/{single}"), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);

    // Album tracks go with their artist
    let res = app
        .delete(&format!("/api/v1/admin/artists/{artist_id}"), Some(&admin.token))
        .await;
    assert_eq!(res.status, StatusCode::OK);

    let res = app.get(&format!("/api/v1/music/{album_track}"), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_news_review() {
    let app = TestApp::new().await;
    let admin = app.signup_admin("editor").await;
    let author = app.signup("columnist").await;
    let keep = post_news(&app, &author, "Worth Reading").await;
    let reject = post_news(&app, &author, "Spam").await;

    let res = app.get("/api/v1/admin/news/review", Some(&admin.token)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["total"], 2);
    assert_eq!(res.json()["pending_news"][0]["author_id"], author.user_id.as_str());

    let res = app
        .post_json(
            &format!("/api/v1/admin/news/{keep}/review"),
            Some(&admin.token),
            json!({ "action": "publish" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error(), "Invalid action. Use 'approve' or 'reject'");

    let res = app
        .post_json(
            "/api/v1/admin/news/missing/review",
            Some(&admin.token),
            json!({ "action": "approve" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "News post not found");

    // Prime the public caches so the review has to clear them
    app.get("/api/v1/news", None).await;
    app.get(&format!("/api/v1/news/{reject}"), None).await;

    let res = app
        .post_json(
            &format!("/api/v1/admin/news/{keep}/review"),
            Some(&admin.token),
            json!({ "action": "approve" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "News post approved successfully");

    let res = app
        .post_json(
            &format!("/api/v1/admin/news/{reject}/review"),
            Some(&admin.token),
            json!({ "action": "reject" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "News post rejected successfully");

    let res = app.get("/api/v1/admin/news/review", Some(&admin.token)).await;
    assert_eq!(res.json()["total"], 0);

    let res = app.get("/api/v1/news", None).await;
    let body = res.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["news"][0]["title"], "Worth Reading");

    let res = app.get(&format!("/api/v1/news/{reject}"), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_deletes_news() {
    let app = TestApp::new().await;
    let admin = app.signup_admin("chief").await;
    let author = app.signup("blogger").await;
    let news_id = post_news(&app, &author, "Outdated").await;

    let res = app
        .delete("/api/v1/admin/news/nothing-here", Some(&admin.token))
        .await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.error(), "News article not found");

    let res = app
        .delete(&format!("/api/v1/admin/news/{news_id}"), Some(&admin.token))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["message"], "News article deleted successfully");

    let res = app.get("/api/v1/news", None).await;
    assert_eq!(res.json()["total"], 0);
}
