//! Scene rendering delegated to an external animation program.
//!
//! The program is invoked as
//! `PROGRAM --scene <json> --duration <secs> --size <WxH> --fps <n> --output <path>`
//! and must write a video file to `--output`. Its output is re-encoded to the
//! shared silent clip format.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use algocast_models::{EncodingConfig, Scene};

use super::SceneRenderer;
use crate::assemble::normalize_silent_clip;
use crate::command::FfmpegRunner;
use crate::error::{MediaError, MediaResult};

/// Renders scenes with an external program.
#[derive(Debug, Clone)]
pub struct CommandSceneRenderer {
    program: String,
    encoding: EncodingConfig,
    runner: FfmpegRunner,
}

impl CommandSceneRenderer {
    pub fn new(program: impl Into<String>, encoding: EncodingConfig, runner: FfmpegRunner) -> Self {
        Self {
            program: program.into(),
            encoding,
            runner,
        }
    }

    fn build_args(&self, scene_json: &str, duration: f64, output: &Path) -> Vec<String> {
        vec![
            "--scene".to_string(),
            scene_json.to_string(),
            "--duration".to_string(),
            format!("{:.3}", duration),
            "--size".to_string(),
            self.encoding.size(),
            "--fps".to_string(),
            self.encoding.fps.to_string(),
            "--output".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl SceneRenderer for CommandSceneRenderer {
    fn name(&self) -> &'static str {
        "command"
    }

    async fn render(&self, scene: &Scene, duration: f64, output: &Path) -> MediaResult<()> {
        let program = which::which(&self.program)
            .map_err(|_| MediaError::RendererNotFound(self.program.clone()))?;

        let raw = output.with_extension("raw.mp4");
        let scene_json = serde_json::to_string(scene)?;
        let args = self.build_args(&scene_json, duration, &raw);
        debug!("Running scene renderer: {} {}", self.program, args.join(" "));

        let result = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !result.status.success() {
            return Err(MediaError::render_failed(
                format!("{} exited with {}", self.program, result.status),
                Some(String::from_utf8_lossy(&result.stderr).to_string()),
            ));
        }
        if !raw.exists() {
            return Err(MediaError::render_failed(
                format!("{} produced no output", self.program),
                None,
            ));
        }

        normalize_silent_clip(&self.runner, &raw, output, &self.encoding).await?;

        if let Err(e) = tokio::fs::remove_file(&raw).await {
            warn!("Failed to remove raw render {}: {}", raw.display(), e);
        }
        Ok(())
    }
}
