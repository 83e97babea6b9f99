//! Pipeline event hooks
//!
//! The orchestrator announces its progress through a registry of hooks.
//! Hooks run in registration order; a soft failure is logged and the
//! remaining hooks still run, while a fatal failure aborts the emitting
//! stage. The built-in [`LoggingHook`] turns events into structured log
//! lines.

use crate::domain::{BeaconError, HookError, JobId, ReportCriteria, ReportId, ReportVersion};
use async_trait::async_trait;
use std::sync::Arc;

/// Outcome of a single hook invocation
pub type HookResult = std::result::Result<(), HookError>;

/// Progress notifications emitted while a pipeline runs
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    /// A generation job was accepted and is about to run
    GenerationStarted {
        job: JobId,
        criteria: ReportCriteria,
    },

    /// The worklist source produced the patients to evaluate
    WorklistResolved {
        patients: usize,
        census_lists: usize,
    },

    /// Per-patient evaluation is starting
    EvaluationStarted { patients: usize },

    /// Per-patient evaluation finished
    EvaluationCompleted { succeeded: usize, failed: usize },

    /// Partial results were merged into report groups
    AggregationCompleted {
        groups: usize,
        unmapped: usize,
        clamped: usize,
    },

    /// The report and its manifest were persisted
    ReportStored {
        report: ReportId,
        version: ReportVersion,
    },

    /// The generation job finished cleanly
    GenerationCompleted { job: JobId, report: ReportId },

    /// The generation job failed in the named stage
    GenerationFailed {
        job: JobId,
        stage: String,
        error: String,
    },

    /// A stored report is about to be submitted
    SendStarted { report: ReportId },

    /// The report was accepted by the destination
    SendCompleted { report: ReportId, location: String },

    /// Submission failed
    SendFailed { report: ReportId, error: String },
}

impl PipelineEvent {
    /// Stable event name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            PipelineEvent::GenerationStarted { .. } => "generation_started",
            PipelineEvent::WorklistResolved { .. } => "worklist_resolved",
            PipelineEvent::EvaluationStarted { .. } => "evaluation_started",
            PipelineEvent::EvaluationCompleted { .. } => "evaluation_completed",
            PipelineEvent::AggregationCompleted { .. } => "aggregation_completed",
            PipelineEvent::ReportStored { .. } => "report_stored",
            PipelineEvent::GenerationCompleted { .. } => "generation_completed",
            PipelineEvent::GenerationFailed { .. } => "generation_failed",
            PipelineEvent::SendStarted { .. } => "send_started",
            PipelineEvent::SendCompleted { .. } => "send_completed",
            PipelineEvent::SendFailed { .. } => "send_failed",
        }
    }
}

/// Observer invoked on every pipeline event
#[async_trait]
pub trait EventHook: Send + Sync {
    /// Hook name used in failure logs
    fn name(&self) -> &str;

    /// Handles one event; a fatal [`HookError`] aborts the emitting stage
    async fn handle(&self, event: &PipelineEvent) -> HookResult;
}

/// Ordered collection of event hooks
#[derive(Default)]
pub struct EventRegistry {
    hooks: Vec<Arc<dyn EventHook>>,
}

impl EventRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a hook; hooks run in registration order
    pub fn register(&mut self, hook: Arc<dyn EventHook>) {
        self.hooks.push(hook);
    }

    /// Number of registered hooks
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// True when no hooks are registered
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Delivers the event to every hook in order
    ///
    /// # Errors
    ///
    /// Returns an error as soon as a hook reports a fatal failure. Soft
    /// failures are logged and delivery continues.
    pub async fn emit(&self, event: &PipelineEvent) -> crate::domain::Result<()> {
        for hook in &self.hooks {
            if let Err(e) = hook.handle(event).await {
                if e.fatal {
                    return Err(BeaconError::Other(format!(
                        "Hook '{}' aborted the pipeline on {}: {}",
                        hook.name(),
                        event.name(),
                        e.message
                    )));
                }
                tracing::warn!(
                    hook = hook.name(),
                    event = event.name(),
                    error = %e,
                    "Event hook failed; continuing"
                );
            }
        }
        Ok(())
    }
}

/// Hook that records every event as a structured log line
pub struct LoggingHook;

#[async_trait]
impl EventHook for LoggingHook {
    fn name(&self) -> &str {
        "logging"
    }

    async fn handle(&self, event: &PipelineEvent) -> HookResult {
        match event {
            PipelineEvent::GenerationStarted { job, criteria } => {
                tracing::info!(job_id = %job, criteria = %criteria, "Report generation started");
            }
            PipelineEvent::WorklistResolved {
                patients,
                census_lists,
            } => {
                tracing::info!(patients, census_lists, "Worklist resolved");
            }
            PipelineEvent::EvaluationStarted { patients } => {
                tracing::info!(patients, "Evaluation started");
            }
            PipelineEvent::EvaluationCompleted { succeeded, failed } => {
                tracing::info!(succeeded, failed, "Evaluation completed");
            }
            PipelineEvent::AggregationCompleted {
                groups,
                unmapped,
                clamped,
            } => {
                tracing::info!(groups, unmapped, clamped, "Aggregation completed");
            }
            PipelineEvent::ReportStored { report, version } => {
                tracing::info!(report_id = %report, version = %version, "Report stored");
            }
            PipelineEvent::GenerationCompleted { job, report } => {
                tracing::info!(job_id = %job, report_id = %report, "Report generation completed");
            }
            PipelineEvent::GenerationFailed { job, stage, error } => {
                tracing::error!(job_id = %job, stage = %stage, error = %error, "Report generation failed");
            }
            PipelineEvent::SendStarted { report } => {
                tracing::info!(report_id = %report, "Report submission started");
            }
            PipelineEvent::SendCompleted { report, location } => {
                tracing::info!(report_id = %report, location = %location, "Report submitted");
            }
            PipelineEvent::SendFailed { report, error } => {
                tracing::error!(report_id = %report, error = %error, "Report submission failed");
            }
        }
        Ok(())
    }
}
