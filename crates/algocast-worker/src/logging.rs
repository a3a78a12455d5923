//! Structured job logging utilities.
//!
//! Provides consistent, structured logging for render jobs with
//! tracing spans and contextual information.

use tracing::{error, info, warn, Span};
use algocast_models::JobId;

/// Job logger for structured logging with consistent formatting.
///
/// Every line carries the job ID and the operation being performed.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    operation: String,
}

impl JobLogger {
    /// Create a new job logger for a specific job and operation.
    pub fn new(job_id: &JobId, operation: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Create a new job logger from a string job ID.
    pub fn from_string(job_id: &str, operation: &str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation: operation.to_string(),
        }
    }

    /// Logger for a sub-operation of the same job.
    pub fn for_operation(&self, operation: &str) -> Self {
        Self {
            job_id: self.job_id.clone(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job warning: {}", message
        );
    }

    /// Log a warning about one scene of the timeline.
    pub fn log_scene_warning(&self, scene_index: usize, message: &str) {
        warn!(
            job_id = %self.job_id,
            operation = %self.operation,
            scene_index,
            "Scene warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            job_id = %self.job_id,
            operation = %self.operation,
            "Job completed: {}", message
        );
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Create a tracing span for this job.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "job",
            job_id = %self.job_id,
            operation = %self.operation
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_logger_creation() {
        let job_id = JobId::new();
        let logger = JobLogger::new(&job_id, "render");

        assert_eq!(logger.job_id(), job_id.to_string());
        assert_eq!(logger.operation(), "render");
    }

    #[test]
    fn test_for_operation_keeps_job() {
        let logger = JobLogger::from_string("job-1", "render");
        let sub = logger.for_operation("assembly");
        assert_eq!(sub.job_id(), "job-1");
        assert_eq!(sub.operation(), "assembly");
    }
}
