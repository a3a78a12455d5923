//! Filesystem helpers for publishing finished renders.

use std::path::Path;
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Copy `src` to `dst` so that readers never observe a partial file.
///
/// The copy lands in a sibling `.part` file first and is renamed into place.
/// Parent directories are created as needed. The source is left untouched.
pub async fn publish_copy(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<u64> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if !src.exists() {
        return Err(MediaError::FileNotFound(src.to_path_buf()));
    }
    if let Some(parent) = dst.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut part = dst.as_os_str().to_owned();
    part.push(".part");
    let part = std::path::PathBuf::from(part);

    let bytes = fs::copy(src, &part).await?;
    if let Err(e) = fs::rename(&part, dst).await {
        let _ = fs::remove_file(&part).await;
        tracing::error!("Failed to publish {} -> {}: {}", src.display(), dst.display(), e);
        return Err(MediaError::from(e));
    }

    tracing::debug!("Published {} bytes to {}", bytes, dst.display());
    Ok(bytes)
}
