//! Sync Planner: which narration clips form each scene's audio.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use algocast_media::{AudioFormat, MediaResult};
use algocast_models::SyncPlan;

use crate::backend::MediaBackend;
use crate::silence_cache::SilenceCache;

/// Gap between grouped narration lines when no plan supplies one.
pub const DEFAULT_BREATH_GAP: f64 = 0.12;
pub const MAX_BREATH_GAP: f64 = 2.0;
/// Largest float index accepted; beyond this f64 no longer holds integers exactly.
const MAX_EXACT_INDEX: f64 = 9_007_199_254_740_992.0;
/// Audio of a scene whose plan entry references no narration.
pub const PLACEHOLDER_SILENCE_SECS: f64 = 0.6;

/// A sync plan checked against the event list.
///
/// Always holds exactly one entry per event, each a list of non-negative
/// audio indices. Indices are checked against the downloaded files later,
/// so entries may still reference clips that do not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSyncPlan {
    pub pairs: Vec<Vec<usize>>,
    /// Silence between grouped lines, in whole milliseconds
    pub gap: f64,
}

impl ResolvedSyncPlan {
    /// Scene `i` narrated by clip `i`.
    pub fn identity(event_count: usize) -> Self {
        Self {
            pairs: (0..event_count).map(|i| vec![i]).collect(),
            gap: DEFAULT_BREATH_GAP,
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Valid audio indices of entry `entry`, in listed order.
    pub fn audio_indices(&self, entry: usize, audio_count: usize) -> Vec<usize> {
        self.pairs
            .get(entry)
            .map(|indices| {
                indices
                    .iter()
                    .copied()
                    .filter(|&i| i < audio_count)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Check a supplied plan against the event count.
///
/// A missing plan, or one whose entry count differs from the event count,
/// yields the identity plan.
pub fn plan(supplied: Option<&SyncPlan>, event_count: usize) -> ResolvedSyncPlan {
    let Some(supplied) = supplied else {
        return ResolvedSyncPlan::identity(event_count);
    };
    if supplied.pairs.len() != event_count {
        warn!(
            "Sync plan has {} entries for {} events; using identity pairing",
            supplied.pairs.len(),
            event_count
        );
        return ResolvedSyncPlan::identity(event_count);
    }

    let gap = supplied
        .breath_gap_sec
        .filter(|g| g.is_finite())
        .unwrap_or(DEFAULT_BREATH_GAP)
        .clamp(0.0, MAX_BREATH_GAP);

    ResolvedSyncPlan {
        pairs: supplied
            .pairs
            .iter()
            .map(|group| group.iter().filter_map(audio_index).collect())
            .collect(),
        gap: whole_millis(gap),
    }
}

/// A non-negative integral index; anything else is dropped.
fn audio_index(value: &Value) -> Option<usize> {
    if let Some(i) = value.as_u64() {
        return usize::try_from(i).ok();
    }
    let f = value.as_f64()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= MAX_EXACT_INDEX {
        Some(f as usize)
    } else {
        None
    }
}

/// Round to whole milliseconds; gaps under half a millisecond become zero.
fn whole_millis(secs: f64) -> f64 {
    (secs * 1000.0).round() / 1000.0
}

/// Build one audio track per plan entry.
///
/// A single referenced clip is used as is; several are concatenated with
/// `gap` seconds of silence between them; none yields a short silence.
pub async fn group_audio(
    plan: &ResolvedSyncPlan,
    audio_files: &[PathBuf],
    backend: &dyn MediaBackend,
    silence: &SilenceCache,
    scratch: &Path,
) -> MediaResult<Vec<PathBuf>> {
    let mut grouped = Vec::with_capacity(plan.len());

    for entry in 0..plan.len() {
        let indices = plan.audio_indices(entry, audio_files.len());
        let track = match indices.as_slice() {
            [] => {
                debug!("Sync entry {} references no audio; using placeholder", entry);
                silence
                    .get_or_create(backend, PLACEHOLDER_SILENCE_SECS, &AudioFormat::default())
                    .await?
            }
            [only] => audio_files[*only].clone(),
            [first, ..] => {
                let format = backend.audio_format(&audio_files[*first]).await;
                let gap = if plan.gap > 0.0 {
                    Some(silence.get_or_create(backend, plan.gap, &format).await?)
                } else {
                    None
                };

                let mut inputs = Vec::with_capacity(indices.len() * 2);
                for (n, idx) in indices.iter().enumerate() {
                    if n > 0 {
                        inputs.extend(gap.iter().cloned());
                    }
                    inputs.push(audio_files[*idx].clone());
                }

                let output = scratch.join(format!("group_{:03}.m4a", entry));
                backend.concat_audio(&inputs, &format, &output).await?;
                output
            }
        };
        grouped.push(track);
    }

    Ok(grouped)
}
