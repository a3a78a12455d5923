//! Scene templates drawn with ffmpeg's `color` source and text/box filters.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use algocast_models::{EncodingConfig, Scene};

use super::layout::{scene_graph, Canvas, SceneGraph};
use super::SceneRenderer;
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};

/// Renders scenes by drawing on a solid canvas with ffmpeg filters.
#[derive(Debug, Clone)]
pub struct FfmpegSceneRenderer {
    encoding: EncodingConfig,
    font_file: Option<PathBuf>,
    runner: FfmpegRunner,
}

impl FfmpegSceneRenderer {
    pub fn new(encoding: EncodingConfig, runner: FfmpegRunner) -> Self {
        Self {
            encoding,
            font_file: None,
            runner,
        }
    }

    /// Use a specific font instead of the fontconfig default.
    pub fn with_font_file(mut self, font_file: Option<PathBuf>) -> Self {
        self.font_file = font_file;
        self
    }

    /// Build the ffmpeg command drawing `graph` for `duration` seconds.
    fn build_command(&self, graph: &SceneGraph, duration: f64, output: &Path) -> FfmpegCommand {
        let enc = &self.encoding;
        let mut cmd = FfmpegCommand::to(output).lavfi(format!(
            "color=c={}:s={}:r={}:d={:.3}",
            enc.background,
            enc.size(),
            enc.fps,
            duration
        ));
        if !graph.is_empty() {
            cmd = cmd.video_filter(graph.filter.clone());
        }
        cmd.output_args(enc.video_args()).no_audio().duration(duration)
    }
}

#[async_trait]
impl SceneRenderer for FfmpegSceneRenderer {
    fn name(&self) -> &'static str {
        "ffmpeg"
    }

    async fn render(&self, scene: &Scene, duration: f64, output: &Path) -> MediaResult<()> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(MediaError::render_failed(
                format!("invalid scene duration {}", duration),
                None,
            ));
        }

        let graph = scene_graph(
            scene,
            duration,
            Canvas::from(&self.encoding),
            &output.with_extension(""),
            self.font_file.as_deref(),
        );
        for (path, text) in &graph.text_files {
            tokio::fs::write(path, text).await?;
        }

        debug!(
            "Drawing {} scene ({:.3}s, {} filters) -> {}",
            scene.kind().as_str(),
            duration,
            graph.filter.matches("draw").count(),
            output.display()
        );

        let cmd = self.build_command(&graph, duration, output);
        self.runner.run(&cmd).await.map_err(|e| match e {
            MediaError::FfmpegFailed { message, stderr, .. } => MediaError::render_failed(
                format!("{} scene: {}", scene.kind().as_str(), message),
                stderr,
            ),
            other => other,
        })
    }
}
