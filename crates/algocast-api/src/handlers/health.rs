//! Health check handlers.

use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use algocast_media::{check_ffmpeg, check_ffprobe};

/// Liveness response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    /// Unix seconds
    pub time: i64,
}

/// Health check endpoint (liveness probe).
pub async fn healthz() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        time: Utc::now().timestamp(),
    })
}

/// Readiness response.
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub ok: bool,
}

/// Readiness check endpoint: the media tools must be installed.
pub async fn readyz() -> (StatusCode, Json<ReadinessResponse>) {
    let checks = [check_ffmpeg(), check_ffprobe()];
    let mut ok = true;
    for check in checks {
        if let Err(e) = check {
            warn!("Readiness check failed: {}", e);
            ok = false;
        }
    }

    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(ReadinessResponse { ok }))
}
