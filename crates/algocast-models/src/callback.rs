//! Job completion callbacks.

use serde::{Deserialize, Serialize};

/// Base URL of the video host's player.
pub const PLAYBACK_BASE_URL: &str = "https://watch.cloudflarestream.com";

/// Terminal status reported to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobOutcome {
    Done,
    Failed,
}

/// Body of `POST /api/jobs/{id}/callback`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackPayload {
    pub status: JobOutcome,
    pub message: Option<String>,
    pub stream_uid: Option<String>,
    pub playback_url: Option<String>,
}

impl CallbackPayload {
    /// Successful upload of video `uid`.
    pub fn done(uid: impl Into<String>) -> Self {
        let uid = uid.into();
        Self {
            status: JobOutcome::Done,
            message: Some("ok".to_string()),
            playback_url: Some(playback_url_for(&uid)),
            stream_uid: Some(uid),
        }
    }

    /// Failed job with a prefixed message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: JobOutcome::Failed,
            message: Some(message.into()),
            stream_uid: None,
            playback_url: None,
        }
    }
}

/// Player URL for an uploaded video.
pub fn playback_url_for(uid: &str) -> String {
    format!("{}/{}", PLAYBACK_BASE_URL, uid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_done_payload_shape() {
        let v = serde_json::to_value(CallbackPayload::done("abc123")).unwrap();
        assert_eq!(
            v,
            json!({
                "status": "done",
                "message": "ok",
                "streamUid": "abc123",
                "playbackUrl": "https://watch.cloudflarestream.com/abc123"
            })
        );
    }

    #[test]
    fn test_failed_payload_has_null_ids() {
        let v = serde_json::to_value(CallbackPayload::failed("UPLOAD_ERROR: boom")).unwrap();
        assert_eq!(v["status"], "failed");
        assert!(v["streamUid"].is_null());
        assert!(v["playbackUrl"].is_null());
    }
}
