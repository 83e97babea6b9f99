//! Per-patient evaluation
//!
//! Evaluation turns a worklist of patients into partial results, one per
//! patient, with failures isolated to the patient they occurred on. The
//! [`PatientEvaluator`] trait produces a single result; the coordinator
//! fans a worklist out over a bounded task pool and collects whatever
//! each evaluation produced.

pub mod census;
pub mod coordinator;

pub use census::CensusEvaluator;
pub use coordinator::EvaluationCoordinator;

use crate::domain::{PartialResult, PatientId, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Evaluates one patient into a partial result
///
/// An `Err` from [`evaluate`](PatientEvaluator::evaluate) marks the patient
/// as failed without affecting any other patient; implementations return
/// `Ok` with an empty result when the patient simply contributes nothing.
#[async_trait]
pub trait PatientEvaluator: Send + Sync {
    /// Produces the patient's tally contribution for the reporting window
    async fn evaluate(&self, patient: &PatientId) -> Result<PartialResult>;

    /// Short name identifying the evaluation strategy
    fn name(&self) -> &str;
}

/// Outcome of evaluating a full worklist
#[derive(Debug, Default)]
pub struct EvaluationRun {
    /// One result per resolved patient, failed or not
    pub results: Vec<PartialResult>,

    /// Worklist entries considered, including unresolvable ones
    pub attempted: usize,

    /// Patients that evaluated cleanly
    pub succeeded: usize,

    /// Patients whose evaluation failed, with the recorded reason
    pub failed: Vec<(PatientId, String)>,

    /// References that never resolved to a patient id
    pub skipped: Vec<String>,

    /// Partial results that evaluated but could not be persisted
    pub audit_failures: usize,

    /// Dropped patient contributions per uncodeable category
    pub unmapped: BTreeMap<String, usize>,
}

impl EvaluationRun {
    /// Human-readable completion summary, e.g. "4 of 5 patients evaluated"
    pub fn summary(&self) -> String {
        format!(
            "{} of {} patients evaluated",
            self.succeeded, self.attempted
        )
    }

    /// True when at least one patient failed or was skipped
    pub fn has_losses(&self) -> bool {
        !self.failed.is_empty() || !self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_attempted_not_resolved() {
        let run = EvaluationRun {
            attempted: 5,
            succeeded: 3,
            skipped: vec!["nonsense".to_string()],
            failed: vec![(PatientId::new("p4").unwrap(), "boom".to_string())],
            ..EvaluationRun::default()
        };
        assert_eq!(run.summary(), "3 of 5 patients evaluated");
        assert!(run.has_losses());
    }

    #[test]
    fn test_clean_run_has_no_losses() {
        let run = EvaluationRun {
            attempted: 2,
            succeeded: 2,
            ..EvaluationRun::default()
        };
        assert!(!run.has_losses());
    }
}
