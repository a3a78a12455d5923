//! In-memory media collaborators for pipeline tests.
//!
//! The fake backend tracks a duration per path instead of running ffmpeg:
//! silence has its requested length, concatenation sums its inputs, copies
//! and muxes inherit the audio length. Every output file is created empty.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;

use algocast_media::{AudioFormat, MediaError, MediaResult, SceneRenderer, DEFAULT_PROBE_DURATION};
use algocast_models::{EventKind, Scene};

use crate::backend::MediaBackend;

#[derive(Debug, Default)]
pub(crate) struct FakeBackend {
    durations: Mutex<HashMap<PathBuf, f64>>,
    silences: Mutex<Vec<f64>>,
    concatenated: Mutex<Vec<Vec<PathBuf>>>,
    plain_videos: Mutex<Vec<f64>>,
    pub(crate) fail_mux: bool,
    pub(crate) fail_concat: bool,
}

impl FakeBackend {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_duration(&self, path: impl AsRef<Path>, secs: f64) {
        self.durations
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), secs);
    }

    pub(crate) fn duration_of(&self, path: &Path) -> f64 {
        self.durations
            .lock()
            .unwrap()
            .get(path)
            .copied()
            .unwrap_or(DEFAULT_PROBE_DURATION)
    }

    pub(crate) fn silence_requests(&self) -> Vec<f64> {
        self.silences.lock().unwrap().clone()
    }

    /// Clip lists passed to `concat_clips`.
    pub(crate) fn clip_concats(&self) -> Vec<Vec<PathBuf>> {
        self.concatenated.lock().unwrap().clone()
    }

    /// Durations of plain fallback videos produced.
    pub(crate) fn plain_videos(&self) -> Vec<f64> {
        self.plain_videos.lock().unwrap().clone()
    }

    async fn touch(&self, path: &Path, secs: f64) -> MediaResult<()> {
        tokio::fs::write(path, b"").await?;
        self.set_duration(path, secs);
        Ok(())
    }
}

#[async_trait]
impl MediaBackend for FakeBackend {
    async fn probe_duration(&self, path: &Path) -> f64 {
        self.duration_of(path)
    }

    async fn audio_format(&self, _path: &Path) -> AudioFormat {
        AudioFormat::default()
    }

    async fn generate_silence(&self, duration: f64, _format: &AudioFormat, output: &Path) -> MediaResult<()> {
        self.silences.lock().unwrap().push(duration);
        self.touch(output, duration).await
    }

    async fn concat_audio(&self, inputs: &[PathBuf], _format: &AudioFormat, output: &Path) -> MediaResult<()> {
        let total = inputs.iter().map(|p| self.duration_of(p)).sum();
        self.touch(output, total).await
    }

    async fn copy_audio(&self, input: &Path, output: &Path) -> MediaResult<()> {
        let secs = self.duration_of(input);
        self.touch(output, secs).await
    }

    async fn mux(&self, _video: &Path, audio: &Path, output: &Path) -> MediaResult<()> {
        if self.fail_mux {
            return Err(MediaError::ffmpeg_failed("mux failed", None, Some(1)));
        }
        let secs = self.duration_of(audio);
        self.touch(output, secs).await
    }

    async fn concat_clips(&self, clips: &[PathBuf], output: &Path) -> MediaResult<()> {
        if self.fail_concat {
            return Err(MediaError::ffmpeg_failed("concat failed", None, Some(1)));
        }
        self.concatenated.lock().unwrap().push(clips.to_vec());
        let total = clips.iter().map(|p| self.duration_of(p)).sum();
        self.touch(output, total).await
    }

    async fn concat_narration(&self, audio_files: &[PathBuf], output: &Path) -> MediaResult<()> {
        let total = audio_files.iter().map(|p| self.duration_of(p)).sum();
        self.touch(output, total).await
    }

    async fn plain_video(&self, total_secs: f64, _audio: &Path, output: &Path) -> MediaResult<()> {
        self.plain_videos.lock().unwrap().push(total_secs);
        self.touch(output, total_secs).await
    }
}

/// Records every render request and fails the configured scene kinds.
#[derive(Debug, Default)]
pub(crate) struct FakeRenderer {
    pub(crate) fail_kinds: Vec<EventKind>,
    calls: Mutex<Vec<(Scene, f64)>>,
}

impl FakeRenderer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn failing(kinds: &[EventKind]) -> Self {
        Self {
            fail_kinds: kinds.to_vec(),
            ..Self::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<(Scene, f64)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SceneRenderer for FakeRenderer {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn render(&self, scene: &Scene, duration: f64, output: &Path) -> MediaResult<()> {
        self.calls.lock().unwrap().push((scene.clone(), duration));
        if self.fail_kinds.contains(&scene.kind()) {
            return Err(MediaError::render_failed(format!("cannot draw {}", scene.kind()), None));
        }
        tokio::fs::write(output, b"").await?;
        Ok(())
    }
}
