//! Render pipeline metrics.
//!
//! Recorded through the `metrics` facade; the API binary installs the
//! Prometheus recorder.

use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const SCENES_RENDERED_TOTAL: &str = "algocast_scenes_rendered_total";
    pub const SCENE_FALLBACKS_TOTAL: &str = "algocast_scene_fallbacks_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "algocast_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "algocast_jobs_failed_total";
    pub const RENDER_DURATION_SECONDS: &str = "algocast_render_duration_seconds";
}

/// Record a scene rendered by its own template.
pub fn record_scene_rendered(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::SCENES_RENDERED_TOTAL, &labels).increment(1);
}

/// Record a scene replaced by the fallback callout.
pub fn record_scene_fallback(kind: &str) {
    let labels = [("kind", kind.to_string())];
    counter!(names::SCENE_FALLBACKS_TOTAL, &labels).increment(1);
}

/// Record a finished job (`output` is "stream" or "local").
pub fn record_job_completed(output: &str) {
    let labels = [("output", output.to_string())];
    counter!(names::JOBS_COMPLETED_TOTAL, &labels).increment(1);
}

/// Record a failed job by callback prefix.
pub fn record_job_failed(reason: &str) {
    let labels = [("reason", reason.to_string())];
    counter!(names::JOBS_FAILED_TOTAL, &labels).increment(1);
}

/// Record wall-clock time spent producing the final video.
pub fn record_render_duration(pipeline: &str, duration_secs: f64) {
    let labels = [("pipeline", pipeline.to_string())];
    histogram!(names::RENDER_DURATION_SECONDS, &labels).record(duration_secs);
}
