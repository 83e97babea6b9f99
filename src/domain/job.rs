//! Job record and state machine
//!
//! A job is the pollable record of one pipeline invocation: status, created
//! and last-modified timestamps, and an append-only ordered list of
//! timestamped notes the stages write as they run. Completed and Failed are
//! terminal; the transition rules live in [`Job::finish`].

use crate::domain::errors::BeaconError;
use crate::domain::ids::JobId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Job status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Pipeline is running
    InProgress,
    /// Pipeline finished successfully
    Completed,
    /// Pipeline aborted with a stage failure
    Failed,
}

impl JobStatus {
    /// True for Completed and Failed
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Classification tag describing what a job does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    /// Report generation pipeline run
    GenerateReport,
    /// Report publish/send run
    SendReport,
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobKind::GenerateReport => "generate_report",
            JobKind::SendReport => "send_report",
        };
        write!(f, "{s}")
    }
}

/// One timestamped progress note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobNote {
    /// When the note was recorded
    pub at: DateTime<Utc>,

    /// Note text
    pub text: String,
}

/// Pollable record of one pipeline invocation
///
/// # Examples
///
/// ```
/// use beacon::domain::job::{Job, JobKind, JobStatus};
///
/// let mut job = Job::new(JobKind::GenerateReport);
/// assert_eq!(job.status, JobStatus::InProgress);
///
/// job.add_note("Resolved measure bed-capacity");
/// job.finish(JobStatus::Completed).unwrap();
///
/// // Terminal states accept no further transition
/// assert!(job.finish(JobStatus::Failed).is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    /// Unique job identifier
    pub id: JobId,

    /// What this job does
    pub kind: JobKind,

    /// Current status
    pub status: JobStatus,

    /// When the job record was created
    pub created_at: DateTime<Utc>,

    /// When the job record last changed
    pub last_updated: DateTime<Utc>,

    /// Append-only ordered progress notes
    pub notes: Vec<JobNote>,
}

impl Job {
    /// Creates a new job in InProgress with a fresh identifier
    pub fn new(kind: JobKind) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::generate(),
            kind,
            status: JobStatus::InProgress,
            created_at: now,
            last_updated: now,
            notes: Vec::new(),
        }
    }

    /// Appends a timestamped note
    ///
    /// Notes are accepted in any state; recording detail about a finished
    /// job never changes its status.
    pub fn add_note(&mut self, text: impl Into<String>) {
        let now = Utc::now();
        self.notes.push(JobNote {
            at: now,
            text: text.into(),
        });
        self.last_updated = now;
    }

    /// Moves the job to a terminal status
    ///
    /// Only `InProgress -> Completed` and `InProgress -> Failed` are legal.
    /// Finishing an already-finished job, or "finishing" back to
    /// InProgress, is a caller bug and returns an explicit error rather
    /// than being silently ignored.
    pub fn finish(&mut self, status: JobStatus) -> Result<(), BeaconError> {
        if !status.is_terminal() {
            return Err(BeaconError::Job(format!(
                "Job {} cannot finish with non-terminal status {status}",
                self.id
            )));
        }
        if self.status.is_terminal() {
            return Err(BeaconError::Job(format!(
                "Job {} is already {} and cannot transition to {status}",
                self.id, self.status
            )));
        }
        self.status = status;
        self.last_updated = Utc::now();
        Ok(())
    }

    /// True while the job is still running
    pub fn is_in_progress(&self) -> bool {
        self.status == JobStatus::InProgress
    }

    /// True once the job reached Completed
    pub fn is_completed(&self) -> bool {
        self.status == JobStatus::Completed
    }

    /// True once the job reached Failed
    pub fn is_failed(&self) -> bool {
        self.status == JobStatus::Failed
    }
}
