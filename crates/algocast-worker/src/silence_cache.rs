//! Per-job cache of generated silence clips.
//!
//! Silence of the same duration and format is generated once per job and
//! reused; the file name is derived from a hash of the request.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use algocast_media::{AudioFormat, MediaResult};

use crate::backend::MediaBackend;

/// Silence files inside one job's scratch directory.
#[derive(Debug, Clone)]
pub struct SilenceCache {
    dir: PathBuf,
}

impl SilenceCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path a silence clip of this duration and format is stored at.
    pub fn path_for(&self, duration: f64, format: &AudioFormat) -> PathBuf {
        self.dir.join(format!("silence_{}.m4a", cache_key(duration, format)))
    }

    /// Return a silence clip, generating it on first use.
    ///
    /// The duration is rounded to whole milliseconds, matching the cache key.
    pub async fn get_or_create(
        &self,
        backend: &dyn MediaBackend,
        duration: f64,
        format: &AudioFormat,
    ) -> MediaResult<PathBuf> {
        let duration = (duration * 1000.0).round() / 1000.0;
        let path = self.path_for(duration, format);
        if is_file(&path).await {
            debug!("Silence cache hit: {}", path.display());
            return Ok(path);
        }
        backend.generate_silence(duration, format, &path).await?;
        Ok(path)
    }
}

/// Millisecond-resolution key over duration and format.
fn cache_key(duration: f64, format: &AudioFormat) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{:.3}|{}|{}", duration, format.sample_rate, format.channel_layout));
    let digest = hasher.finalize();
    digest[..8].iter().map(|b| format!("{:02x}", b)).collect()
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path).await.map(|m| m.is_file()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeBackend;

    #[test]
    fn test_key_is_stable_and_format_sensitive() {
        let mono = AudioFormat::default();
        let stereo = AudioFormat::new(44_100, "stereo");
        assert_eq!(cache_key(0.25, &mono), cache_key(0.2501, &mono));
        assert_ne!(cache_key(0.25, &mono), cache_key(0.3, &mono));
        assert_ne!(cache_key(0.25, &mono), cache_key(0.25, &stereo));
        assert_eq!(cache_key(0.6, &mono).len(), 16);
    }

    #[test]
    fn test_path_for() {
        let cache = SilenceCache::new("/tmp/job");
        let path = cache.path_for(0.6, &AudioFormat::default());
        assert!(path.starts_with("/tmp/job"));
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("m4a"));
    }

    #[tokio::test]
    async fn test_generated_length_matches_key() {
        let dir = tempfile::TempDir::new().unwrap();
        let backend = FakeBackend::new();
        let cache = SilenceCache::new(dir.path());
        let format = AudioFormat::default();

        let first = cache.get_or_create(&backend, 0.2501, &format).await.unwrap();
        let second = cache.get_or_create(&backend, 0.25, &format).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(backend.silence_requests(), vec![0.25]);
    }
}
