//! Direct uploads to Cloudflare Stream.
//!
//! Two transfer modes are supported: a single multipart POST ("basic") and
//! the tus protocol (creation POST followed by one PATCH).

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use url::Url;

use crate::error::{StorageError, StorageResult};
use crate::transfer::TransferClient;

const TUS_VERSION: &str = "1.0.0";
const VIDEO_MIME: &str = "video/mp4";

/// How the final video is sent to the direct-upload URL.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadMode {
    #[default]
    Basic,
    Tus,
}

impl UploadMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadMode::Basic => "basic",
            UploadMode::Tus => "tus",
        }
    }
}

impl fmt::Display for UploadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UploadMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(UploadMode::Basic),
            "tus" => Ok(UploadMode::Tus),
            other => Err(format!("unknown upload mode: {}", other)),
        }
    }
}

/// Video uid addressed by a direct-upload URL (its last path segment).
pub fn stream_uid_from_url(upload_url: &str) -> StorageResult<String> {
    let parsed = Url::parse(upload_url).map_err(|e| StorageError::InvalidUrl(format!("{}: {}", upload_url, e)))?;
    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .ok_or_else(|| StorageError::InvalidUrl(format!("{} has no uid segment", upload_url)))
}

impl TransferClient {
    /// Upload `file` with the given mode and return the video uid.
    pub async fn upload_video(
        &self,
        mode: UploadMode,
        upload_url: &str,
        file: impl AsRef<Path>,
    ) -> StorageResult<String> {
        match mode {
            UploadMode::Basic => self.upload_basic(upload_url, file).await,
            UploadMode::Tus => self.upload_tus(upload_url, file).await,
        }
    }

    /// Single multipart/form-data POST with the file under `file`.
    pub async fn upload_basic(&self, upload_url: &str, file: impl AsRef<Path>) -> StorageResult<String> {
        let file = file.as_ref();
        let uid = stream_uid_from_url(upload_url)?;
        let data = tokio::fs::read(file).await?;
        let size = data.len();

        let part = Part::bytes(data)
            .file_name(file_name(file))
            .mime_str(VIDEO_MIME)?;
        let form = Form::new().part("file", part);

        debug!("Uploading {} bytes (basic) to {}", size, upload_url);
        let response = self
            .http()
            .post(upload_url)
            .multipart(form)
            .timeout(self.config().upload_timeout)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::upload_failed(format!(
                "basic upload failed {}: {}",
                status.as_u16(),
                body
            )));
        }

        info!("Uploaded video {} ({} bytes)", uid, size);
        Ok(uid)
    }

    /// tus 1.0.0 creation request followed by a single PATCH of the whole file.
    pub async fn upload_tus(&self, upload_url: &str, file: impl AsRef<Path>) -> StorageResult<String> {
        let file = file.as_ref();
        let uid = stream_uid_from_url(upload_url)?;
        let data = tokio::fs::read(file).await?;
        let size = data.len();

        let metadata = format!(
            "filename {},filetype {}",
            STANDARD.encode(file_name(file)),
            STANDARD.encode(VIDEO_MIME)
        );
        let response = self
            .http()
            .post(upload_url)
            .header("Tus-Resumable", TUS_VERSION)
            .header("Upload-Length", size.to_string())
            .header("Upload-Metadata", metadata)
            .timeout(self.config().callback_timeout)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED && status != StatusCode::NO_CONTENT {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::upload_failed(format!(
                "tus POST failed {}: {}",
                status.as_u16(),
                body
            )));
        }

        let location = match response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
        {
            Some(loc) => resolve_location(upload_url, loc)?,
            None => upload_url.to_string(),
        };

        debug!("Uploading {} bytes (tus) to {}", size, location);
        let response = self
            .http()
            .patch(&location)
            .header("Tus-Resumable", TUS_VERSION)
            .header("Upload-Offset", "0")
            .header(reqwest::header::CONTENT_TYPE, "application/offset+octet-stream")
            .body(data)
            .timeout(self.config().upload_timeout)
            .send()
            .await?;

        if response.status() != StatusCode::NO_CONTENT {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::upload_failed(format!(
                "tus PATCH failed {}: {}",
                status.as_u16(),
                body
            )));
        }

        info!("Uploaded video {} ({} bytes, tus)", uid, size);
        Ok(uid)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "out.mp4".to_string())
}

/// Resolve a possibly relative `Location` header against the upload URL.
fn resolve_location(upload_url: &str, location: &str) -> StorageResult<String> {
    let base = Url::parse(upload_url).map_err(|e| StorageError::InvalidUrl(e.to_string()))?;
    base.join(location)
        .map(|u| u.to_string())
        .map_err(|e| StorageError::InvalidUrl(format!("{}: {}", location, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransferConfig;
    use tempfile::TempDir;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> TransferClient {
        TransferClient::new(TransferConfig::default()).unwrap()
    }

    async fn video_file(dir: &TempDir) -> std::path::PathBuf {
        let file = dir.path().join("final.mp4");
        tokio::fs::write(&file, b"not really a video").await.unwrap();
        file
    }

    #[test]
    fn test_uid_from_url() {
        assert_eq!(
            stream_uid_from_url("https://upload.cloudflarestream.com/a1b2c3d4").unwrap(),
            "a1b2c3d4"
        );
        assert_eq!(
            stream_uid_from_url("https://upload.cloudflarestream.com/tus/a1b2c3d4/").unwrap(),
            "a1b2c3d4"
        );
        assert!(stream_uid_from_url("https://upload.cloudflarestream.com/").is_err());
        assert!(stream_uid_from_url("::").is_err());
    }

    #[test]
    fn test_upload_mode_parse() {
        assert_eq!("TUS".parse::<UploadMode>().unwrap(), UploadMode::Tus);
        assert_eq!("basic".parse::<UploadMode>().unwrap(), UploadMode::Basic);
        assert!("ftp".parse::<UploadMode>().is_err());
    }

    #[test]
    fn test_resolve_location() {
        assert_eq!(
            resolve_location("https://up.test/abc", "/tus/xyz").unwrap(),
            "https://up.test/tus/xyz"
        );
        assert_eq!(
            resolve_location("https://up.test/abc", "https://other.test/x").unwrap(),
            "https://other.test/x"
        );
    }

    #[tokio::test]
    async fn test_basic_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/abcdef123"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = video_file(&dir).await;
        let uid = client()
            .upload_basic(&format!("{}/abcdef123", server.uri()), &file)
            .await
            .unwrap();
        assert_eq!(uid, "abcdef123");
    }

    #[tokio::test]
    async fn test_basic_upload_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("expired"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = video_file(&dir).await;
        let err = client()
            .upload_video(UploadMode::Basic, &format!("{}/abcdef123", server.uri()), &file)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("basic upload failed 400"));
    }

    #[tokio::test]
    async fn test_tus_upload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/vid123"))
            .and(header("Tus-Resumable", "1.0.0"))
            .and(header("Upload-Length", "18"))
            .respond_with(ResponseTemplate::new(201).insert_header("Location", "/tus/vid123-session"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/tus/vid123-session"))
            .and(header("Upload-Offset", "0"))
            .and(header("Content-Type", "application/offset+octet-stream"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = video_file(&dir).await;
        let uid = client()
            .upload_video(UploadMode::Tus, &format!("{}/vid123", server.uri()), &file)
            .await
            .unwrap();
        assert_eq!(uid, "vid123");
    }

    #[tokio::test]
    async fn test_tus_patch_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .respond_with(ResponseTemplate::new(409))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let file = video_file(&dir).await;
        let err = client()
            .upload_tus(&format!("{}/vid123", server.uri()), &file)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("tus PATCH failed 409"));
    }
}
