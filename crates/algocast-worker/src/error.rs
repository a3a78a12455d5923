//! Worker error types.

use thiserror::Error;

use algocast_media::MediaError;
use algocast_storage::StorageError;

pub type AssemblyResult<T> = Result<T, AssemblyError>;
pub type WorkerResult<T> = Result<T, WorkerError>;

/// Structural failures of the scene pipeline.
///
/// Per-scene render failures are compensated by the driver and never
/// surface here unless the fallback render itself fails.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("Unsupported events format: {0}")]
    Format(String),

    #[error("No event/audio pairs ({events} events, {audio} audio groups)")]
    NoPairs { events: usize, audio: usize },

    #[error("No scenes rendered")]
    NoScenesRendered,

    #[error("Fallback render failed for scene {index}: {source}")]
    SceneRender {
        index: usize,
        #[source]
        source: MediaError,
    },

    #[error("Mux failed for scene {index}: {source}")]
    Mux {
        index: usize,
        #[source]
        source: MediaError,
    },

    #[error("Concatenation failed: {0}")]
    Concatenation(#[source] MediaError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssemblyError {
    pub fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }
}

/// Job-level failures, each mapped to a callback message prefix.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The request itself is unusable (bad payload, no upload target).
    #[error("VALIDATION_ERROR: {0}")]
    InvalidPayload(String),

    #[error("VALIDATION_ERROR: {0}")]
    Validation(String),

    #[error("FETCH_ERROR: {0}")]
    Fetch(String),

    #[error("UPLOAD_ERROR: {0}")]
    Upload(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Media error: {0}")]
    Media(#[from] MediaError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn invalid_payload(msg: impl Into<String>) -> Self {
        Self::InvalidPayload(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    /// Whether the failure was anticipated (bad input, unreachable asset,
    /// rejected upload) rather than a crash of the renderer itself.
    pub fn is_controlled(&self) -> bool {
        matches!(
            self,
            WorkerError::InvalidPayload(_)
                | WorkerError::Validation(_)
                | WorkerError::Fetch(_)
                | WorkerError::Upload(_)
        )
    }

    /// Message prefix reported in the failure callback.
    pub fn prefix(&self) -> &'static str {
        match self {
            WorkerError::InvalidPayload(_) | WorkerError::Validation(_) => "VALIDATION_ERROR",
            WorkerError::Fetch(_) => "FETCH_ERROR",
            WorkerError::Upload(_) => "UPLOAD_ERROR",
            _ => "RENDERER_CRASH",
        }
    }

    /// Full failure message for the callback.
    pub fn callback_message(&self) -> String {
        if self.is_controlled() {
            self.to_string()
        } else {
            format!("{}: {}", self.prefix(), self)
        }
    }
}
