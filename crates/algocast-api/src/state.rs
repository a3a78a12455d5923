//! Application state.

use std::sync::Arc;

use tokio::sync::Mutex;

use algocast_storage::TransferConfig;
use algocast_worker::{JobProcessor, RenderConfig, WorkerResult};

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub processor: Arc<JobProcessor>,
    /// Serializes render jobs; one job runs at a time.
    pub job_gate: Arc<Mutex<()>>,
}

impl AppState {
    /// Create new application state.
    pub fn new(
        config: ApiConfig,
        render: RenderConfig,
        transfer: TransferConfig,
    ) -> WorkerResult<Self> {
        let processor = JobProcessor::new(render, transfer)?;
        Ok(Self::with_processor(config, processor))
    }

    pub fn with_processor(config: ApiConfig, processor: JobProcessor) -> Self {
        Self {
            config,
            processor: Arc::new(processor),
            job_gate: Arc::new(Mutex::new(())),
        }
    }
}
