//! Local-mode output files.

use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::{ApiError, ApiResult};
use crate::security::is_valid_file_name;
use crate::state::AppState;

/// Serve a rendered video from the local output directory.
pub async fn get_file(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Response> {
    if !is_valid_file_name(&name) {
        return Err(ApiError::bad_request("invalid file name"));
    }

    let path = state.processor.config().local_output_dir.join(&name);
    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::not_found("not found"));
        }
        Err(e) => return Err(ApiError::internal(format!("read {}: {}", name, e))),
    };

    Ok(([(header::CONTENT_TYPE, "video/mp4")], bytes).into_response())
}
