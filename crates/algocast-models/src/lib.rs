//! Shared data models for the algocast render service.
//!
//! This crate provides Serde-serializable types for:
//! - Canonical timeline events and their wire kinds
//! - Typed scene variants consumed by the renderers
//! - Narration sync plans
//! - Render job payloads and completion callbacks
//! - Output encoding parameters

pub mod callback;
pub mod encoding;
pub mod event;
pub mod job;
pub mod scene;
pub mod sync;

// Re-export common types
pub use callback::{playback_url_for, CallbackPayload, JobOutcome};
pub use encoding::EncodingConfig;
pub use event::{CanonicalEvent, EventKind};
pub use job::{is_stream_upload_url, Assets, JobId, RenderPayload, StreamTarget};
pub use scene::{PointerName, Pointers, Scene};
pub use sync::SyncPlan;
