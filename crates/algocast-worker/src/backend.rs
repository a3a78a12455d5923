//! Media collaborators used by the pipeline.
//!
//! The pipeline only talks to ffmpeg through [`MediaBackend`], so tests can
//! substitute a backend that writes placeholder files.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use algocast_media::{
    audio, assemble, probe_duration_or, probe_media, AudioFormat, FfmpegRunner, MediaResult,
    DEFAULT_PROBE_DURATION,
};
use algocast_models::EncodingConfig;

/// Probe, silence, concatenation and mux operations.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Duration in seconds; never fails, substituting a default.
    async fn probe_duration(&self, path: &Path) -> f64;

    /// Sample rate and channel layout of the first audio stream.
    async fn audio_format(&self, path: &Path) -> AudioFormat;

    async fn generate_silence(&self, duration: f64, format: &AudioFormat, output: &Path) -> MediaResult<()>;

    async fn concat_audio(&self, inputs: &[PathBuf], format: &AudioFormat, output: &Path) -> MediaResult<()>;

    async fn copy_audio(&self, input: &Path, output: &Path) -> MediaResult<()>;

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> MediaResult<()>;

    async fn concat_clips(&self, clips: &[PathBuf], output: &Path) -> MediaResult<()>;

    /// Join the narration files into one track for the plain fallback video.
    async fn concat_narration(&self, audio_files: &[PathBuf], output: &Path) -> MediaResult<()>;

    /// Solid background video of `total_secs` carrying `audio`.
    async fn plain_video(&self, total_secs: f64, audio: &Path, output: &Path) -> MediaResult<()>;
}

/// [`MediaBackend`] running the ffmpeg and ffprobe binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegBackend {
    runner: FfmpegRunner,
    encoding: EncodingConfig,
}

impl FfmpegBackend {
    pub fn new(runner: FfmpegRunner, encoding: EncodingConfig) -> Self {
        Self { runner, encoding }
    }

    pub fn runner(&self) -> &FfmpegRunner {
        &self.runner
    }

    pub fn encoding(&self) -> &EncodingConfig {
        &self.encoding
    }
}

#[async_trait]
impl MediaBackend for FfmpegBackend {
    async fn probe_duration(&self, path: &Path) -> f64 {
        probe_duration_or(path, DEFAULT_PROBE_DURATION).await
    }

    async fn audio_format(&self, path: &Path) -> AudioFormat {
        match probe_media(path).await {
            Ok(info) => info.audio.as_ref().map(AudioFormat::from).unwrap_or_default(),
            Err(e) => {
                debug!("Audio format probe failed for {}: {}", path.display(), e);
                AudioFormat::default()
            }
        }
    }

    async fn generate_silence(&self, duration: f64, format: &AudioFormat, output: &Path) -> MediaResult<()> {
        audio::generate_silence(&self.runner, duration, format, &self.encoding, output).await
    }

    async fn concat_audio(&self, inputs: &[PathBuf], format: &AudioFormat, output: &Path) -> MediaResult<()> {
        audio::concat_audio(&self.runner, inputs, format, &self.encoding, output).await
    }

    async fn copy_audio(&self, input: &Path, output: &Path) -> MediaResult<()> {
        audio::copy_audio(&self.runner, input, output).await
    }

    async fn mux(&self, video: &Path, audio: &Path, output: &Path) -> MediaResult<()> {
        assemble::mux(&self.runner, video, audio, output, &self.encoding).await
    }

    async fn concat_clips(&self, clips: &[PathBuf], output: &Path) -> MediaResult<()> {
        assemble::concat_clips(&self.runner, clips, output, &self.encoding).await
    }

    async fn concat_narration(&self, audio_files: &[PathBuf], output: &Path) -> MediaResult<()> {
        assemble::concat_narration(&self.runner, audio_files, output, &self.encoding).await
    }

    async fn plain_video(&self, total_secs: f64, audio: &Path, output: &Path) -> MediaResult<()> {
        assemble::plain_video(&self.runner, total_secs, audio, output, &self.encoding).await
    }
}
