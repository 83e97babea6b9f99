//! Job state tracking
//!
//! Wraps a job document and keeps the stored copy current as the pipeline
//! progresses. Note persistence is best-effort: a note that fails to write
//! is logged and dropped rather than failing the pipeline. Terminal status
//! writes do propagate, since a job stuck InProgress forever would
//! misreport the outcome.

use crate::adapters::resolve::ReportStore;
use crate::domain::{Job, JobId, JobKind, JobStatus, Result};

/// Tracks one job document through its lifecycle
pub struct JobTracker {
    store: ReportStore,
    job: Job,
}

impl JobTracker {
    /// Creates a fresh InProgress job and persists it
    pub async fn start(store: ReportStore, kind: JobKind) -> Result<Self> {
        let job = Job::new(kind);
        store.put_job(&job).await?;
        tracing::info!(job_id = %job.id, kind = %kind, "Job started");
        Ok(Self { store, job })
    }

    /// The tracked job's identifier
    pub fn id(&self) -> &JobId {
        &self.job.id
    }

    /// Read access to the tracked job
    pub fn job(&self) -> &Job {
        &self.job
    }

    /// Appends a timestamped note and persists the job
    ///
    /// A failed write keeps the note in memory and logs the failure; later
    /// persists carry it along.
    pub async fn note(&mut self, text: impl Into<String>) {
        let text = text.into();
        tracing::debug!(job_id = %self.job.id, note = %text, "Job note");
        self.job.add_note(text);
        if let Err(e) = self.store.put_job(&self.job).await {
            tracing::warn!(
                job_id = %self.job.id,
                error = %e,
                "Failed to persist job note"
            );
        }
    }

    /// Moves the job to a terminal status and persists it
    ///
    /// # Errors
    ///
    /// Returns an error for an illegal status transition or when the
    /// terminal state cannot be written.
    pub async fn finish(&mut self, status: JobStatus) -> Result<()> {
        self.job.finish(status)?;
        self.store.put_job(&self.job).await?;
        tracing::info!(job_id = %self.job.id, status = %status, "Job finished");
        Ok(())
    }
}
