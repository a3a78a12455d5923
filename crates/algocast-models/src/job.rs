//! Render job payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signed asset URLs for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Assets {
    #[serde(rename = "eventsUrl")]
    #[validate(url)]
    pub events_url: String,
    #[serde(rename = "narrationUrl")]
    #[validate(url)]
    pub narration_url: String,
    #[serde(rename = "complexityUrl")]
    #[validate(url)]
    pub complexity_url: String,
    #[serde(rename = "syncUrl", default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub sync_url: Option<String>,
    /// One narration clip per line, in order.
    #[serde(rename = "audioUrls")]
    #[validate(length(min = 1), custom(function = "validate_audio_urls"))]
    pub audio_urls: Vec<String>,
}

/// Upload destination on the video host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct StreamTarget {
    #[serde(rename = "uploadURL", default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_upload_url"))]
    pub upload_url: Option<String>,
}

/// Body of a render request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct RenderPayload {
    #[serde(rename = "jobId")]
    #[validate(length(min = 1))]
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub algo_id: Option<String>,
    #[validate(nested)]
    pub assets: Assets,
    #[serde(default)]
    #[validate(nested)]
    pub stream: StreamTarget,
}

impl RenderPayload {
    pub fn job_id(&self) -> JobId {
        JobId::from_string(&self.job_id)
    }
}

/// Whether `url` is a Cloudflare Stream direct-upload URL.
pub fn is_stream_upload_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let host_ok = parsed
        .host_str()
        .is_some_and(|h| h.ends_with("upload.cloudflarestream.com"));
    matches!(parsed.scheme(), "http" | "https")
        && host_ok
        && parsed.path().trim_matches('/').len() >= 6
}

#[allow(clippy::ptr_arg)]
fn validate_audio_urls(urls: &Vec<String>) -> Result<(), ValidationError> {
    if urls.iter().all(|u| Url::parse(u).is_ok()) {
        Ok(())
    } else {
        Err(ValidationError::new("audio_url"))
    }
}

fn validate_upload_url(url: &str) -> Result<(), ValidationError> {
    if is_stream_upload_url(url) {
        Ok(())
    } else {
        let mut err = ValidationError::new("stream_upload_url");
        err.message = Some("stream.uploadURL is not a Cloudflare Stream direct-upload URL".into());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(upload: Option<&str>) -> serde_json::Value {
        json!({
            "jobId": "job-1",
            "assets": {
                "eventsUrl": "https://assets.example.com/events.json",
                "narrationUrl": "https://assets.example.com/narration.json",
                "complexityUrl": "https://assets.example.com/complexity.json",
                "audioUrls": ["https://assets.example.com/000.mp3"]
            },
            "stream": { "uploadURL": upload }
        })
    }

    #[test]
    fn test_stream_upload_url() {
        assert!(is_stream_upload_url("https://upload.cloudflarestream.com/abcdef123"));
        assert!(!is_stream_upload_url("https://upload.cloudflarestream.com/abc"));
        assert!(!is_stream_upload_url("https://evil.example.com/abcdef123"));
        assert!(!is_stream_upload_url("ftp://upload.cloudflarestream.com/abcdef123"));
    }

    #[test]
    fn test_valid_payload() {
        let p: RenderPayload =
            serde_json::from_value(payload(Some("https://upload.cloudflarestream.com/abcdef123"))).unwrap();
        assert!(p.validate().is_ok());
        assert_eq!(p.job_id().as_str(), "job-1");
    }

    #[test]
    fn test_rejects_foreign_upload_url() {
        let p: RenderPayload =
            serde_json::from_value(payload(Some("https://example.com/upload/abcdef"))).unwrap();
        assert!(p.validate().is_err());
    }

    #[test]
    fn test_missing_upload_url_is_valid_shape() {
        let p: RenderPayload = serde_json::from_value(payload(None)).unwrap();
        assert!(p.validate().is_ok());
        assert!(p.stream.upload_url.is_none());
    }

    #[test]
    fn test_rejects_empty_audio_list() {
        let mut v = payload(None);
        v["assets"]["audioUrls"] = json!([]);
        let p: RenderPayload = serde_json::from_value(v).unwrap();
        assert!(p.validate().is_err());
    }
}
