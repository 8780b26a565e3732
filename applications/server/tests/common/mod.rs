//! Common test utilities and fixtures
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use cadence_cache::MemoryCache;
use cadence_server::{create_router, services::MediaStorage, AppState, AuthService};
use cadence_storage::{admins, genres, Database};
use serde_json::Value;
use std::{sync::Arc, time::Duration};
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const BOUNDARY: &str = "cadence-test-boundary";

/// Test user credentials
pub mod fixtures {
    pub const TEST_USERNAME: &str = "testuser";
    pub const TEST_EMAIL: &str = "testuser@example.com";
    pub const TEST_PASSWORD: &str = "TestPassword123!";

    /// Smallest thing `infer` recognizes as MP3: an ID3 tag header
    pub fn mp3_bytes() -> Vec<u8> {
        let mut data = b"ID3\x03\x00\x00\x00\x00\x00\x00".to_vec();
        data.extend(std::iter::repeat(0u8).take(256));
        data
    }

    pub fn png_bytes() -> Vec<u8> {
        let img = image::RgbImage::from_pixel(64, 64, image::Rgb([200, 30, 30]));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        out.into_inner()
    }

    /// News content long enough to pass the word count rule
    pub fn long_content() -> String {
        vec!["lorem"; 520].join(" ")
    }
}

/// A router over a throwaway database and upload directory
pub struct TestApp {
    pub router: Router,
    pub db: Arc<Database>,
    pub auth_service: Arc<AuthService>,
    pub cache: Arc<MemoryCache>,
    pub media: Arc<MediaStorage>,
    _temp_dir: TempDir,
}

/// A logged-in user
pub struct Session {
    pub user_id: String,
    pub token: String,
    pub refresh_token: String,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }

    pub fn error(&self) -> String {
        self.json()["error"].as_str().unwrap_or_default().to_string()
    }
}

impl TestApp {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());
        let db = Arc::new(Database::new(&db_url).await.unwrap());

        let media = MediaStorage::new(temp_dir.path().join("uploads"), 1024 * 1024, 2 * 1024 * 1024);
        media.initialize().await.unwrap();
        let media = Arc::new(media);

        // Lowest bcrypt cost keeps the suite fast
        let auth_service = Arc::new(AuthService::new("test-secret-key".to_string(), 1, 1, 4));
        let cache = Arc::new(MemoryCache::new());

        let state = AppState::new(
            Arc::clone(&db),
            Arc::clone(&auth_service),
            Arc::clone(&media),
            cache.clone(),
            Duration::from_secs(60),
        );

        Self {
            router: create_router(state, &[]),
            db,
            auth_service,
            cache,
            media,
            _temp_dir: temp_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request("GET", uri, token, Body::empty(), None)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request("DELETE", uri, token, Body::empty(), None)).await
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(json_request("POST", uri, token, &body)).await
    }

    pub async fn put_json(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.send(json_request("PUT", uri, token, &body)).await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        token: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> TestResponse {
        let body = multipart_body(fields, file);
        let content_type = format!("multipart/form-data; boundary={BOUNDARY}");
        self.send(request("POST", uri, token, Body::from(body), Some(&content_type)))
            .await
    }

    /// Register then log in
    pub async fn signup(&self, username: &str) -> Session {
        let email = format!("{username}@example.com");
        let res = self
            .post_json(
                "/api/v1/auth/register",
                None,
                serde_json::json!({
                    "username": username,
                    "email": email,
                    "password": fixtures::TEST_PASSWORD,
                }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "register failed: {:?}", res.json());

        let res = self
            .post_json(
                "/api/v1/auth/login",
                None,
                serde_json::json!({ "email": email, "password": fixtures::TEST_PASSWORD }),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {:?}", res.json());

        let json = res.json();
        Session {
            user_id: json["userId"].as_str().unwrap().to_string(),
            token: json["access_token"].as_str().unwrap().to_string(),
            refresh_token: json["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn signup_admin(&self, username: &str) -> Session {
        let session = self.signup(username).await;
        admins::grant(self.db.pool(), &cadence_core::UserId::new(session.user_id.clone()))
            .await
            .unwrap();
        session
    }

    /// Look up a genre by name, creating it if the seed data lacks it
    pub async fn add_genre(&self, name: &str) -> String {
        let pool = self.db.pool();
        match genres::find_by_name(pool, name).await.unwrap() {
            Some(genre) => genre.id.to_string(),
            None => genres::create(pool, name).await.unwrap().id.to_string(),
        }
    }

    /// Create an artist owned by `session`, returning its id
    pub async fn create_artist(&self, session: &Session, name: &str) -> String {
        let res = self
            .post_json(
                "/api/v1/artists",
                Some(&session.token),
                serde_json::json!({ "name": name, "bio": "Test bio" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        res.json()["artistId"].as_str().unwrap().to_string()
    }

    pub async fn create_album(&self, session: &Session, artist_id: &str, title: &str) -> String {
        let res = self
            .post_json(
                &format!("/api/v1/albums?artist_id={artist_id}"),
                Some(&session.token),
                serde_json::json!({ "title": title, "release_date": "2023-05-01" }),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "album failed: {:?}", res.json());
        res.json()["albumId"].as_str().unwrap().to_string()
    }

    /// Upload a track; `album` is the album title, if any
    pub async fn upload_music(
        &self,
        session: &Session,
        title: &str,
        artist: &str,
        genre: &str,
        album: Option<&str>,
    ) -> TestResponse {
        let mp3 = fixtures::mp3_bytes();
        let mut fields = vec![
            ("title", title),
            ("artist", artist),
            ("genre", genre),
            ("duration", "3:30"),
        ];
        if let Some(album) = album {
            fields.push(("album", album));
        }
        self.post_multipart(
            "/api/v1/music/upload",
            Some(&session.token),
            &fields,
            Some(("song.mp3", &mp3)),
        )
        .await
    }
}

pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Body,
    content_type: Option<&str>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    builder.body(body).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    request(
        method,
        uri,
        token,
        Body::from(serde_json::to_vec(body).unwrap()),
        Some("application/json"),
    )
}

pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}
