//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Text or JSON-formatted logs
//! - Configurable log levels
//! - Local file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use beacon::logging::init_logging;
//! use beacon::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! // Use tracing macros for logging
//! tracing::info!("Application started");
//! tracing::error!(error = "Something went wrong", "Error occurred");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a report pipeline run
///
/// # Example
///
/// ```no_run
/// use beacon::log_pipeline_start;
/// use beacon::domain::JobId;
///
/// let job_id = JobId::generate();
/// log_pipeline_start!(&job_id, "houston-med", "bed-availability");
/// ```
#[macro_export]
macro_rules! log_pipeline_start {
    ($job_id:expr, $facility:expr, $measure:expr) => {
        tracing::info!(
            job_id = %$job_id,
            facility = %$facility,
            measure = %$measure,
            "Starting report pipeline"
        );
    };
}

/// Log the completion of a report pipeline run
///
/// # Example
///
/// ```no_run
/// use beacon::log_pipeline_complete;
/// use std::time::Duration;
///
/// let duration = Duration::from_secs(10);
/// log_pipeline_complete!("5f3a9c01d2e4b876", "0.1", duration);
/// ```
#[macro_export]
macro_rules! log_pipeline_complete {
    ($report_id:expr, $version:expr, $duration:expr) => {
        tracing::info!(
            report_id = %$report_id,
            version = %$version,
            duration_ms = $duration.as_millis(),
            "Report pipeline completed"
        );
    };
}

/// Log a pipeline stage failure with context
///
/// # Example
///
/// ```no_run
/// use beacon::log_stage_failure;
/// use beacon::domain::BeaconError;
///
/// let error = BeaconError::Census("no census lists in period".to_string());
/// log_stage_failure!("resolve-worklist", &error);
/// ```
#[macro_export]
macro_rules! log_stage_failure {
    ($stage:expr, $error:expr) => {
        tracing::error!(
            stage = %$stage,
            error = %$error,
            "Pipeline stage failed"
        );
    };
}

/// Log evaluation progress over a worklist
///
/// # Example
///
/// ```no_run
/// use beacon::log_evaluation_progress;
///
/// log_evaluation_progress!(10, 250);
/// ```
#[macro_export]
macro_rules! log_evaluation_progress {
    ($completed:expr, $total:expr) => {
        tracing::debug!(
            completed = $completed,
            total = $total,
            progress_pct = ($completed as f64 / $total as f64 * 100.0),
            "Evaluating worklist"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use beacon::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            reason = $reason,
            "Retrying operation"
        );
    };
}
