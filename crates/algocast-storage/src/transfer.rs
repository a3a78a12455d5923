//! Asset downloads and preflight checks.

use std::path::Path;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};
use url::Url;

use crate::config::TransferConfig;
use crate::error::{StorageError, StorageResult};

/// HTTP client for fetching job assets.
#[derive(Clone)]
pub struct TransferClient {
    http: Client,
    config: TransferConfig,
}

#[derive(Debug, Deserialize)]
struct DirectUploadResponse {
    #[serde(rename = "uploadURL")]
    upload_url: String,
}

impl TransferClient {
    /// Create a new client.
    pub fn new(config: TransferConfig) -> StorageResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("algocast-storage/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(StorageError::Network)?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    /// Download `url` to `dest`, returning the byte count.
    ///
    /// Non-2xx responses and empty bodies are errors.
    pub async fn download(&self, url: &str, dest: impl AsRef<Path>) -> StorageResult<u64> {
        let dest = dest.as_ref();
        debug!("Downloading {} -> {}", url, dest.display());

        let mut response = self
            .http
            .get(url)
            .timeout(self.config.download_timeout)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(StorageError::from_response(url, response).await);
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;

        if written == 0 {
            return Err(StorageError::download_failed(format!("empty body from {}", url)));
        }

        info!("Downloaded {} bytes to {}", written, dest.display());
        Ok(written)
    }

    /// Issue a HEAD request (following redirects) and return the final status.
    pub async fn head_status(&self, url: &str) -> StorageResult<StatusCode> {
        let response = self
            .http
            .head(url)
            .timeout(self.config.head_timeout)
            .send()
            .await?;
        Ok(response.status())
    }

    /// Ask the backend for a fresh direct-upload URL.
    pub async fn request_direct_upload(&self) -> StorageResult<String> {
        let url = self.config.direct_upload_url();
        let response = self
            .http
            .get(&url)
            .timeout(Duration::from_secs(15))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(StorageError::from_response(&url, response).await);
        }
        let body: DirectUploadResponse = response.json().await?;
        Ok(body.upload_url)
    }
}

/// File name for a downloaded asset.
///
/// Asset proxies address objects as `/assets/get?key=<object key>`; the key's
/// basename wins, then the URL path's basename, then `default`.
pub fn infer_asset_filename(url: &str, default: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return default.to_string();
    };

    let from_query = parsed
        .query_pairs()
        .find(|(k, _)| k == "key" || k == "k")
        .map(|(_, v)| v.into_owned());
    if let Some(key) = from_query {
        if let Some(name) = basename(&key) {
            return name;
        }
    }

    let path = urlencoding::decode(parsed.path())
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| parsed.path().to_string());
    basename(&path).unwrap_or_else(|| default.to_string())
}

fn basename(path: &str) -> Option<String> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
}
