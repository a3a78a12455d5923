//! Clip Assembly Driver.
//!
//! Renders, pads and muxes one clip per (event, audio) pair strictly in
//! timeline order, then concatenates the clips into the final video. A scene
//! whose render fails is replaced by the fallback callout of the same
//! duration, so the clip count always equals the pair count.

use std::path::{Path, PathBuf};

use serde_json::Value;

use algocast_media::SceneRenderer;
use algocast_models::{CanonicalEvent, Scene, SyncPlan};

use crate::backend::MediaBackend;
use crate::budget::{pad_audio_to, DurationBudget};
use crate::coerce::coerce_event;
use crate::error::{AssemblyError, AssemblyResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::normalize::{normalize_events, root_nums};
use crate::silence_cache::SilenceCache;
use crate::sync;

/// Summary of an assembled video.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyReport {
    /// Clips concatenated into the output
    pub clips: usize,
    /// Scenes drawn with the fallback callout
    pub fallbacks: usize,
    /// Sum of the scene target durations
    pub total_seconds: f64,
}

/// Drives the scene pipeline for one job inside its scratch directory.
pub struct ClipAssembler<'a> {
    backend: &'a dyn MediaBackend,
    renderer: &'a dyn SceneRenderer,
    budget: DurationBudget,
    scratch: &'a Path,
    silence: SilenceCache,
    logger: JobLogger,
}

impl<'a> ClipAssembler<'a> {
    pub fn new(
        backend: &'a dyn MediaBackend,
        renderer: &'a dyn SceneRenderer,
        budget: DurationBudget,
        scratch: &'a Path,
        logger: &JobLogger,
    ) -> Self {
        Self {
            backend,
            renderer,
            budget,
            scratch,
            silence: SilenceCache::new(scratch),
            logger: logger.for_operation("assembly"),
        }
    }

    /// Full pipeline from a decoded event document to `output`.
    pub async fn render_timeline(
        &self,
        raw_events: &Value,
        sync_plan: Option<&SyncPlan>,
        audio_files: &[PathBuf],
        output: &Path,
    ) -> AssemblyResult<AssemblyReport> {
        let events = normalize_events(raw_events)?;
        let nums = root_nums(raw_events);
        self.logger.log_progress(&format!(
            "{} events, {} narration clips",
            events.len(),
            audio_files.len()
        ));

        let plan = sync::plan(sync_plan, events.len());
        let grouped = sync::group_audio(&plan, audio_files, self.backend, &self.silence, self.scratch).await?;

        self.assemble(&events, &nums, &grouped, output).await
    }

    /// Render each event over its grouped audio and concatenate the clips.
    pub async fn assemble(
        &self,
        events: &[CanonicalEvent],
        root_nums: &Value,
        grouped_audio: &[PathBuf],
        output: &Path,
    ) -> AssemblyResult<AssemblyReport> {
        let pairs = events.len().min(grouped_audio.len());
        if pairs == 0 {
            return Err(AssemblyError::NoPairs {
                events: events.len(),
                audio: grouped_audio.len(),
            });
        }

        let mut clips = Vec::with_capacity(pairs);
        let mut fallbacks = 0;
        let mut total_seconds = 0.0;

        for (index, (event, audio)) in events.iter().zip(grouped_audio).enumerate() {
            let scene = coerce_event(event, root_nums);
            let measured = self.budget.measure(self.backend, audio).await;
            let target = self.budget.target(measured);

            let video = self.scratch.join(format!("clip_{:03}.mp4", index));
            if self.render_scene(index, &scene, target, &video).await? {
                fallbacks += 1;
            }

            let padded = pad_audio_to(
                self.backend,
                &self.silence,
                audio,
                &self.scratch.join(format!("audio_{:03}", index)),
                target,
            )
            .await?;

            let clip = self.scratch.join(format!("clip_{:03}_av.mp4", index));
            self.backend
                .mux(&video, &padded, &clip)
                .await
                .map_err(|source| AssemblyError::Mux { index, source })?;

            clips.push(clip);
            total_seconds += target;
        }

        if clips.is_empty() {
            return Err(AssemblyError::NoScenesRendered);
        }

        self.backend
            .concat_clips(&clips, output)
            .await
            .map_err(AssemblyError::Concatenation)?;

        self.logger.log_progress(&format!(
            "Assembled {} clips ({} fallbacks, {:.2}s)",
            clips.len(),
            fallbacks,
            total_seconds
        ));

        Ok(AssemblyReport {
            clips: clips.len(),
            fallbacks,
            total_seconds,
        })
    }

    /// Render one scene, substituting the fallback callout on failure.
    ///
    /// Returns whether the fallback was used.
    async fn render_scene(&self, index: usize, scene: &Scene, duration: f64, output: &Path) -> AssemblyResult<bool> {
        let kind = scene.kind();
        match self.renderer.render(scene, duration, output).await {
            Ok(()) => {
                metrics::record_scene_rendered(kind.as_str());
                Ok(false)
            }
            Err(e) => {
                self.logger
                    .log_scene_warning(index, &format!("{} render failed, using fallback: {}", kind, e));
                metrics::record_scene_fallback(kind.as_str());
                self.renderer
                    .render(&Scene::fallback(), duration, output)
                    .await
                    .map_err(|source| AssemblyError::SceneRender { index, source })?;
                Ok(true)
            }
        }
    }
}
