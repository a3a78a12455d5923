//! Scene renderers.
//!
//! A renderer turns a [`Scene`] into a silent clip of an exact duration in
//! the shared encoding. Two implementations exist: [`FfmpegSceneRenderer`]
//! draws the scene templates with ffmpeg filters, [`CommandSceneRenderer`]
//! delegates to an external animation program.

use std::path::Path;

use async_trait::async_trait;
use algocast_models::Scene;
use serde_json::Value;

use crate::error::MediaResult;

mod command;
mod ffmpeg;
pub mod layout;

pub use command::CommandSceneRenderer;
pub use ffmpeg::FfmpegSceneRenderer;

/// Renders one scene to a silent video file.
#[async_trait]
pub trait SceneRenderer: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Render `scene` lasting `duration` seconds into `output`.
    async fn render(&self, scene: &Scene, duration: f64, output: &Path) -> MediaResult<()>;
}

/// Display label for an array value.
pub fn value_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
