/// Multipart form parsing for media uploads
use crate::error::{Result, ServerError};
use axum::http::{header, HeaderMap};
use bytes::Bytes;
use std::collections::HashMap;

/// Name of the form field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub data: Vec<u8>,
}

/// Text fields plus the optional `file` part of a multipart body
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl MultipartForm {
    /// Parse a buffered `multipart/form-data` body
    pub async fn parse(headers: &HeaderMap, body: Bytes) -> Result<Self> {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ServerError::bad_request("Missing Content-Type"))?;

        if !content_type.starts_with("multipart/form-data") {
            return Err(ServerError::bad_request("Expected multipart/form-data"));
        }

        let boundary = multer::parse_boundary(content_type)
            .map_err(|_| ServerError::bad_request("Missing boundary"))?;

        let stream = futures_util::stream::once(async move { Ok::<_, std::io::Error>(body) });
        let mut multipart = multer::Multipart::new(stream, boundary);

        let mut form = MultipartForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ServerError::bad_request(format!("Failed to parse multipart: {e}")))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == FILE_FIELD {
                let filename = field.file_name().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ServerError::bad_request(format!("Failed to read file: {e}")))?;

                // An empty file input still produces a part; treat it as absent
                if !data.is_empty() {
                    form.file = Some(UploadedFile {
                        filename,
                        data: data.to_vec(),
                    });
                }
            } else {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::bad_request(format!("Failed to read field: {e}")))?;
                form.fields.insert(name, text);
            }
        }

        Ok(form)
    }

    /// Trimmed, non-empty text field
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Take the uploaded file or fail with `No file uploaded`
    pub fn require_file(&mut self) -> Result<UploadedFile> {
        self.file
            .take()
            .ok_or_else(|| ServerError::bad_request("No file uploaded"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn multipart_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("multipart/form-data; boundary=XBOUNDARY"),
        );
        headers
    }

    #[tokio::test]
    async fn parses_fields_and_file() {
        let body = "--XBOUNDARY\r\n\
Content-Disposition: form-data; name=\"title\"\r\n\r\n\
  Paranoid Android \r\n\
--XBOUNDARY\r\n\
Content-Disposition: form-data; name=\"file\"; filename=\"song.mp3\"\r\n\
Content-Type: audio/mpeg\r\n\r\n\
ID3data\r\n\
--XBOUNDARY--\r\n";

        let mut form = MultipartForm::parse(&multipart_headers(), Bytes::from(body))
            .await
            .unwrap();

        assert_eq!(form.text("title"), Some("Paranoid Android"));
        assert_eq!(form.text("album"), None);

        let file = form.require_file().unwrap();
        assert_eq!(file.filename.as_deref(), Some("song.mp3"));
        assert_eq!(file.data, b"ID3data");
    }

    #[tokio::test]
    async fn missing_file_is_a_bad_request() {
        let body = "--XBOUNDARY\r\n\
Content-Disposition: form-data; name=\"title\"\r\n\r\n\
x\r\n\
--XBOUNDARY--\r\n";

        let mut form = MultipartForm::parse(&multipart_headers(), Bytes::from(body))
            .await
            .unwrap();
        let err = form.require_file().unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(msg) if msg == "No file uploaded"));
    }

    #[tokio::test]
    async fn rejects_non_multipart_bodies() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let err = MultipartForm::parse(&headers, Bytes::from_static(b"{}"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::BadRequest(_)));
    }
}
