//! Transfer error types.

use thiserror::Error;

/// Result type for transfer operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while moving bytes to and from remote services.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to configure transfer client: {0}")]
    ConfigError(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status} from {url}: {body}")]
    HttpStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Callback failed: {0}")]
    CallbackFailed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn download_failed(msg: impl Into<String>) -> Self {
        Self::DownloadFailed(msg.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }

    pub fn callback_failed(msg: impl Into<String>) -> Self {
        Self::CallbackFailed(msg.into())
    }

    /// Build an error from a non-success response, consuming its body.
    pub async fn from_response(url: &str, response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Self::HttpStatus {
            status,
            url: url.to_string(),
            body: truncate(&body, 300),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            StorageError::HttpStatus { status, .. } => Some(*status),
            StorageError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
