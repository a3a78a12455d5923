//! Render pipeline for algorithm-visualization videos.
//!
//! This crate provides:
//! - Event file decoding and the Event Normalizer
//! - Scene-argument coercion into typed scenes
//! - Sync planning and narration grouping
//! - Duration budgeting and audio padding
//! - The Clip Assembly Driver and the end-to-end job processor

pub mod assembly;
pub mod backend;
pub mod budget;
pub mod coerce;
pub mod config;
pub mod error;
pub mod loader;
pub mod logging;
pub mod metrics;
pub mod normalize;
pub mod processor;
pub mod silence_cache;
pub mod sync;

mod value;

#[cfg(test)]
mod testing;

pub use assembly::{AssemblyReport, ClipAssembler};
pub use backend::{FfmpegBackend, MediaBackend};
pub use budget::DurationBudget;
pub use coerce::coerce_event;
pub use config::{RenderConfig, SceneRendererKind};
pub use error::{AssemblyError, AssemblyResult, WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use normalize::normalize_events;
pub use processor::{JobProcessor, RenderOutput};
pub use sync::{plan as plan_sync, ResolvedSyncPlan};
