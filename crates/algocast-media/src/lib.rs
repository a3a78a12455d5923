//! FFmpeg CLI wrapper for scene rendering and clip assembly.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and a runner with progress parsing
//! - Duration and stream-format probing via ffprobe
//! - Silence generation, audio concatenation and copying
//! - Per-scene muxing and final clip concatenation
//! - Scene renderers drawing the visualization templates

pub mod assemble;
pub mod audio;
pub mod command;
pub mod error;
pub mod fs_utils;
pub mod probe;
pub mod progress;
pub mod render;

pub use assemble::{concat_clips, concat_narration, mux, normalize_silent_clip, plain_video};
pub use audio::{concat_audio, copy_audio, generate_silence, AudioFormat};
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use fs_utils::publish_copy;
pub use probe::{probe_duration, probe_duration_or, probe_media, MediaInfo, DEFAULT_PROBE_DURATION};
pub use progress::FfmpegProgress;
pub use render::{CommandSceneRenderer, FfmpegSceneRenderer, SceneRenderer};
