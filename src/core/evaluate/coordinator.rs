//! Bounded parallel evaluation
//!
//! Fans a worklist out over a task pool capped by the configured
//! concurrency. Each patient evaluates independently: an error, or even a
//! panic, in one task becomes a failed partial result for that patient and
//! nothing else. Every produced result is persisted as an audit document
//! before the run completes.

use crate::adapters::resolve::ReportStore;
use crate::config::EvaluationConfig;
use crate::core::evaluate::{EvaluationRun, PatientEvaluator};
use crate::core::pipeline::identity;
use crate::domain::{
    BeaconError, EvaluationOutcome, PartialResult, PatientId, PatientOfInterest, ReportId, Result,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinSet;

/// Runs a worklist through an evaluator with bounded parallelism
pub struct EvaluationCoordinator {
    evaluator: Arc<dyn PatientEvaluator>,
    store: ReportStore,
    concurrency: usize,
    persist_audit: bool,
}

impl EvaluationCoordinator {
    /// Creates a coordinator with the configured concurrency cap
    pub fn new(
        evaluator: Arc<dyn PatientEvaluator>,
        store: ReportStore,
        config: &EvaluationConfig,
    ) -> Self {
        Self {
            evaluator,
            store,
            concurrency: config.concurrency,
            persist_audit: true,
        }
    }

    /// Enables or disables per-patient audit writes; dry runs disable them
    pub fn with_audit_persistence(mut self, enabled: bool) -> Self {
        self.persist_audit = enabled;
        self
    }

    /// Zero concurrency means one task per available core
    fn effective_concurrency(&self) -> usize {
        if self.concurrency > 0 {
            return self.concurrency;
        }
        std::thread::available_parallelism()
            .map(std::num::NonZeroUsize::get)
            .unwrap_or(4)
    }

    /// Evaluates every resolvable worklist entry
    ///
    /// Unresolvable references are skipped and recorded. The returned run
    /// carries one result per resolved patient regardless of individual
    /// failures.
    ///
    /// # Errors
    ///
    /// Returns [`BeaconError::Evaluation`] when the shutdown signal fires
    /// before the worklist drains. Individual evaluation failures never
    /// surface as an `Err`.
    pub async fn run(
        &self,
        master_id: &ReportId,
        worklist: &[PatientOfInterest],
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<EvaluationRun> {
        let mut run = EvaluationRun {
            attempted: worklist.len(),
            ..EvaluationRun::default()
        };

        let mut resolved: Vec<PatientId> = Vec::new();
        for entry in worklist {
            match &entry.id {
                Some(id) => resolved.push(id.clone()),
                None => {
                    tracing::warn!(
                        reference = %entry.reference,
                        "Worklist reference did not resolve to a patient id; skipped"
                    );
                    run.skipped.push(entry.reference.clone());
                }
            }
        }

        if resolved.is_empty() {
            return Ok(run);
        }

        let limit = self.effective_concurrency();
        tracing::info!(
            patients = resolved.len(),
            concurrency = limit,
            evaluator = self.evaluator.name(),
            "Evaluating worklist"
        );

        let semaphore = Arc::new(Semaphore::new(limit));
        let mut tasks: JoinSet<PartialResult> = JoinSet::new();
        let mut pending: HashMap<tokio::task::Id, PatientId> = HashMap::new();

        for patient in resolved {
            let evaluator = Arc::clone(&self.evaluator);
            let semaphore = Arc::clone(&semaphore);
            let task_patient = patient.clone();
            let handle = tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return PartialResult::failed(task_patient, "evaluation pool closed");
                    }
                };
                match evaluator.evaluate(&task_patient).await {
                    Ok(result) => result,
                    Err(e) => PartialResult::failed(task_patient, e.to_string()),
                }
            });
            pending.insert(handle.id(), patient);
        }

        let total = pending.len();
        let mut completed = 0usize;
        let mut shutdown_open = true;

        loop {
            tokio::select! {
                joined = tasks.join_next_with_id() => {
                    let Some(joined) = joined else { break };
                    completed += 1;
                    let result = match joined {
                        Ok((task_id, result)) => {
                            pending.remove(&task_id);
                            result
                        }
                        Err(join_error) => match pending.remove(&join_error.id()) {
                            Some(patient) => {
                                tracing::error!(
                                    patient = %patient,
                                    error = %join_error,
                                    "Evaluation task aborted"
                                );
                                PartialResult::failed(
                                    patient,
                                    format!("evaluation task aborted: {join_error}"),
                                )
                            }
                            None => continue,
                        },
                    };
                    crate::log_evaluation_progress!(completed, total);
                    self.record(master_id, result, &mut run).await;
                }
                changed = shutdown.changed(), if shutdown_open => {
                    match changed {
                        Ok(()) if *shutdown.borrow() => {
                            tracing::warn!(
                                completed = completed,
                                total = total,
                                "Evaluation cancelled; aborting outstanding tasks"
                            );
                            tasks.abort_all();
                            return Err(BeaconError::Evaluation(
                                "Evaluation cancelled by shutdown signal".to_string(),
                            ));
                        }
                        Ok(()) => {}
                        Err(_) => shutdown_open = false,
                    }
                }
            }
        }

        Ok(run)
    }

    /// Tallies the result into the run and persists the audit document
    async fn record(&self, master_id: &ReportId, result: PartialResult, run: &mut EvaluationRun) {
        match &result.outcome {
            EvaluationOutcome::Failed { reason } => {
                tracing::warn!(
                    patient = %result.patient,
                    reason = %reason,
                    "Patient evaluation failed"
                );
                run.failed.push((result.patient.clone(), reason.clone()));
            }
            EvaluationOutcome::Evaluated => run.succeeded += 1,
        }

        for category in &result.unmapped {
            *run.unmapped.entry(category.clone()).or_insert(0) += 1;
        }

        if self.persist_audit {
            let doc_id = identity::patient_result_id(master_id, &result.patient);
            if let Err(e) = self.store.put_partial_result(&doc_id, &result).await {
                tracing::warn!(
                    patient = %result.patient,
                    error = %e,
                    "Failed to persist partial result"
                );
                run.audit_failures += 1;
            }
        }

        run.results.push(result);
    }
}
