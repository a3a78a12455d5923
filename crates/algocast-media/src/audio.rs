//! Audio operations: silence generation, concatenation and copying.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::debug;

use algocast_models::EncodingConfig;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::AudioStreamInfo;

/// Sample rate and channel layout of an audio track.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: u32,
    /// Layout name understood by `anullsrc` and `aformat` (e.g. "mono")
    pub channel_layout: String,
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            channel_layout: "mono".to_string(),
        }
    }
}

impl AudioFormat {
    pub fn new(sample_rate: u32, channel_layout: impl Into<String>) -> Self {
        Self {
            sample_rate,
            channel_layout: channel_layout.into(),
        }
    }

    /// `anullsrc` source spec producing this format.
    pub fn anullsrc(&self) -> String {
        format!("anullsrc=r={}:cl={}", self.sample_rate, self.channel_layout)
    }
}

impl From<&AudioStreamInfo> for AudioFormat {
    fn from(info: &AudioStreamInfo) -> Self {
        let channel_layout = info
            .channel_layout
            .clone()
            .filter(|l| !l.is_empty() && l != "unknown")
            .unwrap_or_else(|| match info.channels {
                1 => "mono".to_string(),
                2 => "stereo".to_string(),
                n => format!("{}c", n),
            });
        Self {
            sample_rate: info.sample_rate,
            channel_layout,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Hz {}", self.sample_rate, self.channel_layout)
    }
}

/// Generate `duration` seconds of silence in `format`.
pub async fn generate_silence(
    runner: &FfmpegRunner,
    duration: f64,
    format: &AudioFormat,
    encoding: &EncodingConfig,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    if !duration.is_finite() || duration <= 0.0 {
        return Err(MediaError::internal(format!("invalid silence duration {}", duration)));
    }
    let output = output.as_ref();
    debug!("Generating {:.3}s of silence ({}) -> {}", duration, format, output.display());

    let cmd = FfmpegCommand::to(output)
        .lavfi(format.anullsrc())
        .input_arg("-t")
        .input_arg(format!("{:.3}", duration))
        .output_args(encoding.audio_args());

    runner.run(&cmd).await
}

/// Concatenate audio files in order, re-encoding to `format`.
pub async fn concat_audio(
    runner: &FfmpegRunner,
    inputs: &[PathBuf],
    format: &AudioFormat,
    encoding: &EncodingConfig,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    if inputs.is_empty() {
        return Err(MediaError::internal("concat_audio called with no inputs"));
    }
    let output = output.as_ref();
    debug!("Concatenating {} audio files -> {}", inputs.len(), output.display());

    let cmd = inputs
        .iter()
        .fold(FfmpegCommand::to(output), |cmd, input| cmd.input(input))
        .filter_complex(audio_concat_filter(inputs.len(), format))
        .map("[a]")
        .output_args(encoding.audio_args());

    runner.run(&cmd).await
}

/// Copy an audio track without re-encoding.
pub async fn copy_audio(
    runner: &FfmpegRunner,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> MediaResult<()> {
    let cmd = FfmpegCommand::new(input, output).output_arg("-vn").codec_copy();
    runner.run(&cmd).await
}

/// Filter graph resampling `count` inputs to one format and joining them.
fn audio_concat_filter(count: usize, format: &AudioFormat) -> String {
    let mut graph = String::new();
    for i in 0..count {
        graph.push_str(&format!(
            "[{i}:a]aresample={rate},aformat=channel_layouts={layout}[a{i}];",
            rate = format.sample_rate,
            layout = format.channel_layout,
        ));
    }
    for i in 0..count {
        graph.push_str(&format!("[a{}]", i));
    }
    graph.push_str(&format!("concat=n={}:v=0:a=1[a]", count));
    graph
}
