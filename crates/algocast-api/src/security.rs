//! Request authentication and input sanitization.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::error::{ApiError, ApiResult};

/// Maximum served file name length.
const MAX_FILE_NAME_LENGTH: usize = 255;

/// Check the `Authorization: Bearer <token>` header against `expected`.
pub fn check_bearer(headers: &HeaderMap, expected: &str) -> ApiResult<()> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::unauthorized("missing bearer"))?;

    if token.trim() != expected {
        return Err(ApiError::unauthorized("bad bearer"));
    }
    Ok(())
}

/// Validate a file name served from the output directory.
/// Prevents path traversal attacks.
pub fn is_valid_file_name(name: &str) -> bool {
    if name.is_empty() || name.len() > MAX_FILE_NAME_LENGTH {
        return false;
    }

    if name.starts_with('.') || name.contains("..") || name.contains('/') || name.contains('\\') {
        return false;
    }

    name.chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
}
