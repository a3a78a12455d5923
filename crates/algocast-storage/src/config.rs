//! Transfer configuration.

use std::time::Duration;

/// Settings for downloads, uploads and backend callbacks.
#[derive(Debug, Clone)]
pub struct TransferConfig {
    /// Backend base URL, without trailing slash
    pub backend_base_url: String,
    /// Bearer token sent with callbacks
    pub callback_token: String,
    pub download_timeout: Duration,
    pub head_timeout: Duration,
    pub upload_timeout: Duration,
    pub callback_timeout: Duration,
    /// Ask the backend for a direct-upload URL when a job has none
    pub direct_upload_fallback: bool,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            backend_base_url: "http://localhost:8080".to_string(),
            callback_token: String::new(),
            download_timeout: Duration::from_secs(60),
            head_timeout: Duration::from_secs(10),
            upload_timeout: Duration::from_secs(300),
            callback_timeout: Duration::from_secs(30),
            direct_upload_fallback: false,
        }
    }
}

impl TransferConfig {
    /// Load from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let secs = |name: &str, default: Duration| {
            std::env::var(name)
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        Self {
            backend_base_url: std::env::var("BACKEND_BASE_URL")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or(defaults.backend_base_url),
            callback_token: std::env::var("CALLBACK_TOKEN").unwrap_or_default(),
            download_timeout: secs("DOWNLOAD_TIMEOUT_SECS", defaults.download_timeout),
            head_timeout: secs("HEAD_TIMEOUT_SECS", defaults.head_timeout),
            upload_timeout: secs("UPLOAD_TIMEOUT_SECS", defaults.upload_timeout),
            callback_timeout: secs("CALLBACK_TIMEOUT_SECS", defaults.callback_timeout),
            direct_upload_fallback: std::env::var("STREAM_DIRECT_UPLOAD_FALLBACK")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }

    /// Callback endpoint for a job.
    pub fn callback_url(&self, job_id: &str) -> String {
        format!("{}/api/jobs/{}/callback", self.backend_base_url, job_id)
    }

    /// Backend endpoint minting a direct-upload URL.
    pub fn direct_upload_url(&self) -> String {
        format!("{}/debug/stream/direct-upload", self.backend_base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timeouts() {
        let config = TransferConfig::default();
        assert_eq!(config.download_timeout, Duration::from_secs(60));
        assert_eq!(config.head_timeout, Duration::from_secs(10));
        assert_eq!(config.upload_timeout, Duration::from_secs(300));
        assert!(!config.direct_upload_fallback);
    }

    #[test]
    fn test_endpoints() {
        let config = TransferConfig {
            backend_base_url: "https://api.example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.callback_url("job-1"),
            "https://api.example.com/api/jobs/job-1/callback"
        );
        assert_eq!(
            config.direct_upload_url(),
            "https://api.example.com/debug/stream/direct-upload"
        );
    }
}
