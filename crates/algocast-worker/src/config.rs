//! Render configuration.

use std::path::PathBuf;
use std::str::FromStr;

use algocast_models::EncodingConfig;
use algocast_storage::UploadMode;

use crate::budget::DurationBudget;

/// Which scene renderer draws the clips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SceneRendererKind {
    /// Built-in ffmpeg drawing templates
    #[default]
    Ffmpeg,
    /// External program given by `SCENE_RENDER_COMMAND`
    Command,
}

impl FromStr for SceneRendererKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ffmpeg" => Ok(SceneRendererKind::Ffmpeg),
            "command" => Ok(SceneRendererKind::Command),
            other => Err(format!("unknown scene renderer: {}", other)),
        }
    }
}

/// Render pipeline configuration.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Shortest scene in seconds
    pub min_scene: f64,
    /// Seconds added after each scene's narration
    pub tail_pad: f64,
    /// Global pacing multiplier applied to every scene duration
    pub pace_mult: f64,
    /// Parent of per-job scratch directories; system temp when unset
    pub work_dir: Option<PathBuf>,
    /// Local mode: copy the video to `local_output_dir` instead of uploading
    pub skip_stream: bool,
    pub local_output_dir: PathBuf,
    /// Use the scene pipeline (otherwise a plain video over the narration)
    pub use_scenes: bool,
    /// Per-ffmpeg-process timeout; unlimited when unset
    pub ffmpeg_timeout_secs: Option<u64>,
    pub renderer: SceneRendererKind,
    pub render_command: Option<String>,
    /// Font for drawn text; fontconfig default when unset
    pub font_file: Option<PathBuf>,
    pub upload_mode: UploadMode,
    pub encoding: EncodingConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            min_scene: 1.2,
            tail_pad: 0.25,
            pace_mult: 1.0,
            work_dir: None,
            skip_stream: false,
            local_output_dir: PathBuf::from("/output"),
            use_scenes: true,
            ffmpeg_timeout_secs: None,
            renderer: SceneRendererKind::Ffmpeg,
            render_command: None,
            font_file: None,
            upload_mode: UploadMode::Basic,
            encoding: EncodingConfig::default(),
        }
    }
}

impl RenderConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let encoding = EncodingConfig {
            width: env_parse("RENDER_WIDTH").unwrap_or(defaults.encoding.width),
            height: env_parse("RENDER_HEIGHT").unwrap_or(defaults.encoding.height),
            fps: env_parse("RENDER_FPS").unwrap_or(defaults.encoding.fps),
            ..defaults.encoding.clone()
        };

        Self {
            min_scene: env_seconds("MIN_SCENE").unwrap_or(defaults.min_scene),
            tail_pad: env_seconds("TAIL_PAD").unwrap_or(defaults.tail_pad),
            pace_mult: env_seconds("PACE_MULT")
                .filter(|p| *p > 0.0)
                .unwrap_or(defaults.pace_mult),
            work_dir: std::env::var("RENDER_WORK_DIR").ok().map(PathBuf::from),
            skip_stream: env_flag("SKIP_STREAM").unwrap_or(defaults.skip_stream),
            local_output_dir: std::env::var("LOCAL_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.local_output_dir),
            use_scenes: env_flag("USE_SCENES").unwrap_or(defaults.use_scenes),
            ffmpeg_timeout_secs: env_parse("RENDER_FFMPEG_TIMEOUT_SECS"),
            renderer: env_parse("SCENE_RENDERER").unwrap_or_default(),
            render_command: std::env::var("SCENE_RENDER_COMMAND")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            font_file: std::env::var("RENDER_FONT_FILE").ok().map(PathBuf::from),
            upload_mode: env_parse("UPLOAD_MODE").unwrap_or_default(),
            encoding,
        }
    }

    /// Duration budget derived from the pacing settings.
    pub fn budget(&self) -> DurationBudget {
        DurationBudget {
            min_scene: self.min_scene,
            tail_pad: self.tail_pad,
            pace: self.pace_mult,
        }
    }
}

fn env_parse<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

/// Non-negative, finite seconds.
fn env_seconds(name: &str) -> Option<f64> {
    env_parse::<f64>(name).filter(|v| v.is_finite() && *v >= 0.0)
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name).ok().map(|v| parse_flag(&v))
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        let budget = config.budget();
        assert_eq!(budget.min_scene, 1.2);
        assert_eq!(budget.tail_pad, 0.25);
        assert_eq!(budget.pace, 1.0);
        assert!(config.use_scenes);
        assert!(!config.skip_stream);
        assert_eq!(config.encoding.size(), "1280x720");
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_renderer_kind() {
        assert_eq!("Command".parse::<SceneRendererKind>().unwrap(), SceneRendererKind::Command);
        assert!("manim".parse::<SceneRendererKind>().is_err());
    }
}
