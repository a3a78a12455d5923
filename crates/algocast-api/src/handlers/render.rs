//! Render job endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;
use tracing::{info, warn};

use algocast_models::RenderPayload;
use algocast_worker::RenderOutput;

use crate::error::{ApiError, ApiResult};
use crate::security::check_bearer;
use crate::state::AppState;

/// Successful render response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    pub ok: bool,
    pub job_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
}

impl RenderResponse {
    fn new(job_id: String, output: RenderOutput) -> Self {
        let mut response = Self {
            ok: true,
            job_id,
            stream_uid: None,
            playback_url: None,
            local_path: None,
        };
        match output {
            RenderOutput::Stream {
                stream_uid,
                playback_url,
            } => {
                response.stream_uid = Some(stream_uid);
                response.playback_url = Some(playback_url);
            }
            RenderOutput::Local { path } => {
                response.local_path = Some(path.display().to_string());
            }
        }
        response
    }
}

/// Run one render job to completion.
///
/// Jobs are serialized through the state's job gate. Failures have already
/// been reported to the backend callback by the time the error response is
/// returned.
pub async fn render(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<RenderPayload>, JsonRejection>,
) -> ApiResult<Json<RenderResponse>> {
    check_bearer(&headers, &state.config.render_token)?;
    let Json(payload) = payload.map_err(|e| ApiError::unprocessable(e.body_text()))?;

    let _gate = state.job_gate.lock().await;
    info!(job_id = %payload.job_id, "Render job accepted");

    match state.processor.run(&payload).await {
        Ok(output) => Ok(Json(RenderResponse::new(payload.job_id, output))),
        Err(e) => {
            warn!(job_id = %payload.job_id, "Render job failed: {}", e);
            Err(ApiError::from(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_stream_response_shape() {
        let response = RenderResponse::new(
            "job-1".to_string(),
            RenderOutput::Stream {
                stream_uid: "abc123".to_string(),
                playback_url: "https://videodelivery.net/abc123/manifest/video.m3u8".to_string(),
            },
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["jobId"], "job-1");
        assert_eq!(json["streamUid"], "abc123");
        assert!(json.get("localPath").is_none());
    }

    #[test]
    fn test_local_response_shape() {
        let response = RenderResponse::new(
            "job-1".to_string(),
            RenderOutput::Local {
                path: PathBuf::from("/output/job-1.mp4"),
            },
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["localPath"], "/output/job-1.mp4");
        assert!(json.get("streamUid").is_none());
    }
}
