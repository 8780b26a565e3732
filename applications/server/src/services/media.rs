/// Media storage service - uploaded images and audio on disk
use crate::error::{Result, ServerError};
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

/// URL prefix the upload directory is served under
pub const UPLOADS_ROUTE: &str = "/uploads";

const MUSIC_DIR: &str = "music";
const ALLOWED_IMAGE_MIME: [&str; 3] = ["image/png", "image/jpeg", "image/webp"];
const AUDIO_MIME: &str = "audio/mpeg";

/// What an uploaded image is for; decides directory and thumbnail bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    ProfilePicture,
    ArtistPicture,
    AlbumCover,
    MusicCover,
    NewsImage,
}

impl ImageKind {
    pub const ALL: [ImageKind; 5] = [
        ImageKind::ProfilePicture,
        ImageKind::ArtistPicture,
        ImageKind::AlbumCover,
        ImageKind::MusicCover,
        ImageKind::NewsImage,
    ];

    pub fn subdirectory(&self) -> &'static str {
        match self {
            ImageKind::ProfilePicture => "profile_pictures",
            ImageKind::ArtistPicture => "artist_pictures",
            ImageKind::AlbumCover => "album_covers",
            ImageKind::MusicCover => "music_covers",
            ImageKind::NewsImage => "news_images",
        }
    }

    /// Bounding box; aspect ratio is preserved
    pub fn thumbnail_size(&self) -> (u32, u32) {
        match self {
            ImageKind::ProfilePicture => (100, 100),
            ImageKind::ArtistPicture | ImageKind::AlbumCover | ImageKind::MusicCover => (500, 500),
            ImageKind::NewsImage => (800, 800),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MediaStorage {
    base_path: PathBuf,
    max_image_bytes: usize,
    max_audio_bytes: usize,
}

impl MediaStorage {
    pub fn new(base_path: PathBuf, max_image_bytes: usize, max_audio_bytes: usize) -> Self {
        Self {
            base_path,
            max_image_bytes,
            max_audio_bytes,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn max_audio_bytes(&self) -> usize {
        self.max_audio_bytes
    }

    /// Initialize storage directories
    pub async fn initialize(&self) -> Result<()> {
        for kind in ImageKind::ALL {
            fs::create_dir_all(self.base_path.join(kind.subdirectory())).await?;
        }
        fs::create_dir_all(self.base_path.join(MUSIC_DIR)).await?;
        Ok(())
    }

    /// Validate an uploaded image, write a JPEG thumbnail and return its public URL
    pub async fn store_image(
        &self,
        kind: ImageKind,
        filename: Option<&str>,
        data: Vec<u8>,
    ) -> Result<String> {
        if data.len() > self.max_image_bytes {
            return Err(ServerError::bad_request("File is too large"));
        }
        if !is_allowed_image(filename, &data) {
            return Err(ServerError::bad_request("Invalid file type"));
        }

        let name = format!("{}.jpg", Uuid::new_v4());
        let path = self.base_path.join(kind.subdirectory()).join(&name);
        let (width, height) = kind.thumbnail_size();

        tokio::task::spawn_blocking(move || write_thumbnail(&data, width, height, &path))
            .await
            .map_err(|e| ServerError::Internal(format!("Thumbnail task failed: {e}")))??;

        Ok(format!("{UPLOADS_ROUTE}/{}/{name}", kind.subdirectory()))
    }

    /// Validate an uploaded MP3 and store it unchanged
    pub async fn store_audio(&self, filename: &str, data: &[u8]) -> Result<String> {
        if data.len() > self.max_audio_bytes {
            return Err(ServerError::bad_request("File is too large"));
        }

        let extension_ok = mime_guess::from_path(filename)
            .first()
            .is_some_and(|m| m.essence_str() == AUDIO_MIME);
        let signature_ok = infer::get(data).is_some_and(|k| k.mime_type() == AUDIO_MIME);
        if !extension_ok || !signature_ok {
            return Err(ServerError::bad_request(
                "Invalid file type, only MP3 is allowed",
            ));
        }

        let name = format!("{}.mp3", Uuid::new_v4());
        let path = self.base_path.join(MUSIC_DIR).join(&name);
        fs::write(&path, data).await?;

        Ok(format!("{UPLOADS_ROUTE}/{MUSIC_DIR}/{name}"))
    }

    /// Map a public `/uploads/...` URL back to a file inside the storage directory
    pub async fn resolve(&self, url: &str) -> Result<PathBuf> {
        let relative = url
            .strip_prefix(UPLOADS_ROUTE)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| ServerError::not_found("Music file not found"))?;

        let path = self.base_path.join(relative);
        let is_file = fs::metadata(&path).await.is_ok_and(|m| m.is_file());
        if !is_file {
            return Err(ServerError::not_found("Music file not found"));
        }

        self.validate_path(&path).await?;
        Ok(path)
    }

    /// Delete a stored file; failures are logged and ignored
    pub async fn remove(&self, url: &str) {
        let Ok(path) = self.resolve(url).await else {
            return;
        };
        if let Err(e) = fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove media file");
        }
    }

    /// Validate that a path is within the storage directory (prevent directory traversal)
    pub async fn validate_path(&self, path: &Path) -> Result<()> {
        let canonical_base = fs::canonicalize(&self.base_path)
            .await
            .map_err(|e| ServerError::Internal(format!("Invalid base path: {}", e)))?;

        let canonical_path = fs::canonicalize(path)
            .await
            .map_err(|e| ServerError::Internal(format!("Invalid path: {}", e)))?;

        if !canonical_path.starts_with(&canonical_base) {
            return Err(ServerError::forbidden("Path traversal attempt detected"));
        }

        Ok(())
    }
}

/// The signature decides. An extension only counts when it names a known
/// type, which then has to be an allowed image type too.
fn is_allowed_image(filename: Option<&str>, data: &[u8]) -> bool {
    let signature_ok = infer::get(data).is_some_and(|k| ALLOWED_IMAGE_MIME.contains(&k.mime_type()));

    let extension_ok = filename
        .and_then(|name| mime_guess::from_path(name).first())
        .map_or(true, |m| ALLOWED_IMAGE_MIME.contains(&m.essence_str()));

    signature_ok && extension_ok
}

fn write_thumbnail(data: &[u8], width: u32, height: u32, path: &Path) -> Result<()> {
    let image = image::load_from_memory(data).map_err(|e| ServerError::Image(e.to_string()))?;
    image
        .thumbnail(width, height)
        .to_rgb8()
        .save_with_format(path, image::ImageFormat::Jpeg)
        .map_err(|e| ServerError::Image(e.to_string()))
}
