//! Duration Budgeter: scene length from narration length, and audio padding.

use std::path::{Path, PathBuf};

use tracing::debug;

use algocast_media::MediaResult;

use crate::backend::MediaBackend;
use crate::silence_cache::SilenceCache;

/// Shortest duration a probe is trusted to report.
pub const MIN_MEASURED_SECS: f64 = 0.2;
/// Audio within this much of the target is not padded.
pub const PAD_TOLERANCE_SECS: f64 = 1e-3;

/// Pacing parameters turning narration length into scene length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DurationBudget {
    /// Shortest scene in seconds
    pub min_scene: f64,
    /// Seconds of breathing room after the narration
    pub tail_pad: f64,
    /// Uniform slow-down (>1) or speed-up (<1) of every scene
    pub pace: f64,
}

impl Default for DurationBudget {
    fn default() -> Self {
        Self {
            min_scene: 1.2,
            tail_pad: 0.25,
            pace: 1.0,
        }
    }
}

impl DurationBudget {
    /// Scene duration for narration of `measured` seconds.
    pub fn target(&self, measured: f64) -> f64 {
        self.min_scene.max(measured + self.tail_pad) * self.pace
    }

    /// Probe narration length for budgeting.
    pub async fn measure(&self, backend: &dyn MediaBackend, audio: &Path) -> f64 {
        backend.probe_duration(audio).await.max(MIN_MEASURED_SECS)
    }
}

/// Seconds of silence to append so `measured` reaches `target`, if any.
///
/// Rounded up to whole milliseconds so the padded track never falls short.
pub fn silence_needed(measured: f64, target: f64) -> Option<f64> {
    let deficit = target - measured;
    if deficit <= PAD_TOLERANCE_SECS {
        return None;
    }
    Some((deficit * 1000.0).ceil() / 1000.0)
}

/// Extend `input` with silence to at least `target` seconds.
///
/// Audio already long enough is copied unchanged, keeping its extension;
/// padded audio is written as `.m4a`. The path written is returned.
pub async fn pad_audio_to(
    backend: &dyn MediaBackend,
    silence: &SilenceCache,
    input: &Path,
    output_stem: &Path,
    target: f64,
) -> MediaResult<PathBuf> {
    let measured = backend.probe_duration(input).await;

    let Some(deficit) = silence_needed(measured, target) else {
        let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("m4a");
        let output = output_stem.with_extension(ext);
        backend.copy_audio(input, &output).await?;
        return Ok(output);
    };

    debug!(
        "Padding {} from {:.3}s to {:.3}s (+{:.3}s)",
        input.display(),
        measured,
        target,
        deficit
    );
    let format = backend.audio_format(input).await;
    let pad = silence.get_or_create(backend, deficit, &format).await?;
    let output = output_stem.with_extension("m4a");
    backend
        .concat_audio(&[input.to_path_buf(), pad], &format, &output)
        .await?;
    Ok(output)
}
