//! Report pipeline orchestration
//!
//! Drives one report generation or submission end to end: derive the
//! report identity, resolve the measure and facility, build the worklist,
//! evaluate patients, aggregate tallies, and persist the report with its
//! manifest in a single transaction. Every run is tracked as a job whose
//! notes record what happened, including which stage a failure occurred in.

use crate::adapters::resolve::ReportStore;
use crate::adapters::sender::{create_report_sender, ReportSender};
use crate::adapters::worklist::{create_worklist_resolver, WorklistResolver};
use crate::config::{BeaconConfig, EvaluationConfig, ReportingConfig};
use crate::core::aggregate::TallyAggregator;
use crate::core::evaluate::{CensusEvaluator, EvaluationCoordinator, PatientEvaluator};
use crate::core::pipeline::events::{EventHook, EventRegistry, LoggingHook, PipelineEvent};
use crate::core::pipeline::identity;
use crate::core::pipeline::tracker::JobTracker;
use crate::core::translate::CodeTranslator;
use crate::domain::{
    AggregateReport, BeaconError, JobId, JobKind, JobStatus, ReportCriteria, ReportId,
    ReportManifest, ReportStatus, ReportVersion, Result, StoreError,
};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Pipeline stage names recorded when a run fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Identity,
    Resources,
    Worklist,
    Evaluation,
    Aggregation,
    Persistence,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Identity => "identity",
            Stage::Resources => "resource resolution",
            Stage::Worklist => "worklist resolution",
            Stage::Evaluation => "evaluation",
            Stage::Aggregation => "aggregation",
            Stage::Persistence => "persistence",
        };
        write!(f, "{s}")
    }
}

/// What a generation run produced
#[derive(Debug)]
pub struct GenerationSummary {
    /// Job that tracked the run
    pub job_id: JobId,

    /// Deterministic master report id
    pub report_id: ReportId,

    /// Version the report was stored at
    pub version: ReportVersion,

    /// True when a prior report was regenerated
    pub regenerated: bool,

    /// Worklist entries considered
    pub attempted: usize,

    /// Patients that evaluated cleanly
    pub succeeded: usize,

    /// Patients whose evaluation failed
    pub failed: usize,

    /// Worklist references that never resolved
    pub skipped: usize,

    /// Category groups in the stored report
    pub groups: usize,

    /// True when persistence was skipped
    pub dry_run: bool,
}

/// What a submission run produced
#[derive(Debug)]
pub struct SendSummary {
    /// Job that tracked the submission
    pub job_id: JobId,

    /// Report that was submitted
    pub report_id: ReportId,

    /// Version after the submission bump
    pub version: ReportVersion,

    /// Where the destination filed the report; `None` on a dry run
    pub location: Option<String>,

    /// True when the submission was skipped
    pub dry_run: bool,
}

/// Orchestrates report generation and submission
pub struct ReportPipeline {
    store: ReportStore,
    worklist: Arc<dyn WorklistResolver>,
    sender: Arc<dyn ReportSender>,
    translator: Arc<CodeTranslator>,
    aggregator: TallyAggregator,
    events: EventRegistry,
    evaluation: EvaluationConfig,
    reporting: ReportingConfig,
    dry_run: bool,
}

impl ReportPipeline {
    /// Builds a pipeline with all collaborators resolved from configuration
    ///
    /// Registers the built-in logging hook; callers add their own hooks
    /// with [`register_hook`](Self::register_hook).
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the sender section is incomplete.
    pub fn from_config(config: &BeaconConfig, store: ReportStore) -> Result<Self> {
        let translator = Arc::new(CodeTranslator::new(store.clone(), &config.reporting));
        let aggregator = TallyAggregator::new(Arc::clone(&translator), &config.reporting);
        let worklist = create_worklist_resolver(&config.evaluation, store.clone());
        let sender = create_report_sender(&config.reporting)?;

        let mut events = EventRegistry::new();
        events.register(Arc::new(LoggingHook));

        Ok(Self {
            store,
            worklist,
            sender,
            translator,
            aggregator,
            events,
            evaluation: config.evaluation.clone(),
            reporting: config.reporting.clone(),
            dry_run: config.application.dry_run,
        })
    }

    /// Appends an event hook; hooks fire in registration order
    pub fn register_hook(&mut self, hook: Arc<dyn EventHook>) {
        self.events.register(hook);
    }

    /// Generates (or regenerates) the report described by the criteria
    ///
    /// # Errors
    ///
    /// Returns [`BeaconError::Conflict`] when the report already exists and
    /// `regenerate` was not requested; any stage failure propagates after
    /// being recorded on the job.
    pub async fn generate(
        &self,
        criteria: ReportCriteria,
        regenerate: bool,
        shutdown: watch::Receiver<bool>,
    ) -> Result<GenerationSummary> {
        let started = Instant::now();
        let mut tracker = JobTracker::start(self.store.clone(), JobKind::GenerateReport).await?;
        crate::log_pipeline_start!(tracker.id(), criteria.facility(), criteria.measure());
        tracker.note(criteria.annotation()).await;

        let mut stage = Stage::Identity;
        let run = self
            .run_generation(&criteria, regenerate, &mut stage, &mut tracker, shutdown)
            .await;

        match run {
            Ok(summary) => {
                tracker
                    .note(format!(
                        "Report {} stored at version {} with {} groups",
                        summary.report_id, summary.version, summary.groups
                    ))
                    .await;
                tracker.finish(JobStatus::Completed).await?;
                self.events
                    .emit(&PipelineEvent::GenerationCompleted {
                        job: summary.job_id.clone(),
                        report: summary.report_id.clone(),
                    })
                    .await?;
                crate::log_pipeline_complete!(summary.report_id, summary.version, started.elapsed());
                Ok(summary)
            }
            Err(e) => {
                crate::log_stage_failure!(stage, e);
                tracker
                    .note(format!("Report generation failed during {stage}: {e}"))
                    .await;
                if let Err(finish_err) = tracker.finish(JobStatus::Failed).await {
                    tracing::error!(
                        job_id = %tracker.id(),
                        error = %finish_err,
                        "Failed to record job failure"
                    );
                }
                if let Err(emit_err) = self
                    .events
                    .emit(&PipelineEvent::GenerationFailed {
                        job: tracker.id().clone(),
                        stage: stage.to_string(),
                        error: e.to_string(),
                    })
                    .await
                {
                    tracing::error!(error = %emit_err, "Failure event hook failed");
                }
                Err(e)
            }
        }
    }

    async fn run_generation(
        &self,
        criteria: &ReportCriteria,
        regenerate: bool,
        stage: &mut Stage,
        tracker: &mut JobTracker,
        shutdown: watch::Receiver<bool>,
    ) -> Result<GenerationSummary> {
        self.events
            .emit(&PipelineEvent::GenerationStarted {
                job: tracker.id().clone(),
                criteria: criteria.clone(),
            })
            .await?;

        *stage = Stage::Identity;
        let master_id = identity::master_report_id(criteria)?;
        let prior = identity::existing_manifest(&self.store, &master_id, regenerate).await?;
        let regenerated = prior.is_some();
        if regenerated {
            tracker
                .note(format!("Regenerating previously stored report {master_id}"))
                .await;
        }

        *stage = Stage::Resources;
        let measure = self.store.measure(criteria.measure()).await?;
        let facility = self.store.facility(criteria.facility()).await?;
        facility.geolocation().map_err(BeaconError::Validation)?;
        let totals_id = self
            .reporting
            .totals
            .get(criteria.measure().as_str())
            .ok_or_else(|| {
                BeaconError::Configuration(format!(
                    "Totals baseline for {} not found",
                    criteria.measure()
                ))
            })?;
        let baseline = self.store.totals_baseline(totals_id).await?;

        *stage = Stage::Worklist;
        let worklist = self.worklist.resolve(criteria).await?;
        tracker
            .note(format!(
                "Worklist resolved: {} patients from {} census lists",
                worklist.patients.len(),
                worklist.census_lists.len()
            ))
            .await;
        self.events
            .emit(&PipelineEvent::WorklistResolved {
                patients: worklist.patients.len(),
                census_lists: worklist.census_lists.len(),
            })
            .await?;

        *stage = Stage::Evaluation;
        self.events
            .emit(&PipelineEvent::EvaluationStarted {
                patients: worklist.patients.len(),
            })
            .await?;
        let evaluator: Arc<dyn PatientEvaluator> = Arc::new(CensusEvaluator::new(
            self.store.clone(),
            Arc::clone(&self.translator),
            &self.evaluation,
            *criteria.period(),
        ));
        let coordinator = EvaluationCoordinator::new(evaluator, self.store.clone(), &self.evaluation)
            .with_audit_persistence(!self.dry_run);
        let run = coordinator
            .run(&master_id, &worklist.patients, shutdown)
            .await?;
        tracker.note(run.summary()).await;
        for (patient, reason) in &run.failed {
            tracker
                .note(format!("Evaluation failed for patient {patient}: {reason}"))
                .await;
        }
        for reference in &run.skipped {
            tracker
                .note(format!("Worklist reference skipped: {reference}"))
                .await;
        }
        if run.audit_failures > 0 {
            tracker
                .note(format!(
                    "{} partial results could not be persisted",
                    run.audit_failures
                ))
                .await;
        }
        for (category, dropped) in &run.unmapped {
            tracker
                .note(format!(
                    "No occupied tally code for category {category}; {dropped} patient contribution(s) dropped"
                ))
                .await;
        }
        self.events
            .emit(&PipelineEvent::EvaluationCompleted {
                succeeded: run.succeeded,
                failed: run.failed.len(),
            })
            .await?;

        *stage = Stage::Aggregation;
        let outcome = self.aggregator.aggregate(&run.results, &baseline).await?;
        for unmapped in &outcome.unmapped {
            tracker
                .note(format!("No tally code mapped for {unmapped}"))
                .await;
        }
        for clamped in &outcome.clamped {
            tracker
                .note(format!("Available count clamped for {clamped}"))
                .await;
        }
        let group_count = outcome.groups.len();
        self.events
            .emit(&PipelineEvent::AggregationCompleted {
                groups: group_count,
                unmapped: outcome.unmapped.len(),
                clamped: outcome.clamped.len(),
            })
            .await?;

        *stage = Stage::Persistence;
        let manifest = match prior {
            Some(mut manifest) => {
                manifest.mark_regenerated(worklist.census_lists.clone());
                manifest
            }
            None => ReportManifest::new(
                master_id.clone(),
                criteria.measure().clone(),
                criteria.facility().clone(),
                *criteria.period(),
                worklist.census_lists.clone(),
            ),
        };
        let status = if run.has_losses() {
            ReportStatus::Pending
        } else {
            ReportStatus::Complete
        };
        let report = AggregateReport {
            id: master_id.clone(),
            status,
            measure: measure.reference(),
            facility: criteria.facility().clone(),
            period: *criteria.period(),
            version: manifest.version,
            groups: outcome.groups,
        };

        if self.dry_run {
            tracker.note("Dry run: report and manifest not persisted").await;
        } else {
            // The manifest check at the identity stage is a fast path; the
            // create guard is what decides between concurrent first runs.
            let stored = if regenerate {
                self.store.store_report_with_manifest(&report, &manifest).await
            } else {
                self.store.create_report_with_manifest(&report, &manifest).await
            };
            match stored {
                Ok(()) => {}
                Err(BeaconError::Store(StoreError::DocumentExists(_))) => {
                    return Err(BeaconError::Conflict(identity::REPORT_EXISTS.to_string()));
                }
                Err(e) => return Err(e),
            }
            self.events
                .emit(&PipelineEvent::ReportStored {
                    report: master_id.clone(),
                    version: manifest.version,
                })
                .await?;
        }

        Ok(GenerationSummary {
            job_id: tracker.id().clone(),
            report_id: master_id,
            version: manifest.version,
            regenerated,
            attempted: run.attempted,
            succeeded: run.succeeded,
            failed: run.failed.len(),
            skipped: run.skipped.len(),
            groups: group_count,
            dry_run: self.dry_run,
        })
    }

    /// Submits a stored report and records the publish on its manifest
    ///
    /// Each submission bumps the major version and marks the manifest
    /// Final; resubmitting a previously sent report is allowed and bumps
    /// the version again.
    ///
    /// # Errors
    ///
    /// Returns a store error when the report or manifest is missing, or a
    /// send error when the destination rejects the report.
    pub async fn send(&self, report_id: &ReportId) -> Result<SendSummary> {
        let mut tracker = JobTracker::start(self.store.clone(), JobKind::SendReport).await?;
        tracker
            .note(format!("Submitting report {report_id} via {}", self.sender.name()))
            .await;

        let run = self.run_send(report_id, &mut tracker).await;

        match run {
            Ok(summary) => {
                match &summary.location {
                    Some(location) => {
                        tracker
                            .note(format!("Report delivered to {location}"))
                            .await;
                    }
                    None => tracker.note("Dry run: submission skipped").await,
                }
                tracker.finish(JobStatus::Completed).await?;
                if let Some(location) = &summary.location {
                    self.events
                        .emit(&PipelineEvent::SendCompleted {
                            report: summary.report_id.clone(),
                            location: location.clone(),
                        })
                        .await?;
                }
                Ok(summary)
            }
            Err(e) => {
                tracker.note(format!("Report submission failed: {e}")).await;
                if let Err(finish_err) = tracker.finish(JobStatus::Failed).await {
                    tracing::error!(
                        job_id = %tracker.id(),
                        error = %finish_err,
                        "Failed to record job failure"
                    );
                }
                if let Err(emit_err) = self
                    .events
                    .emit(&PipelineEvent::SendFailed {
                        report: report_id.clone(),
                        error: e.to_string(),
                    })
                    .await
                {
                    tracing::error!(error = %emit_err, "Failure event hook failed");
                }
                Err(e)
            }
        }
    }

    async fn run_send(&self, report_id: &ReportId, tracker: &mut JobTracker) -> Result<SendSummary> {
        self.events
            .emit(&PipelineEvent::SendStarted {
                report: report_id.clone(),
            })
            .await?;

        let mut report = self
            .store
            .aggregate_report(report_id)
            .await?
            .ok_or_else(|| stored_report_missing("aggregate-report", report_id))?;
        let mut manifest = self
            .store
            .manifest(report_id)
            .await?
            .ok_or_else(|| stored_report_missing("report-manifest", report_id))?;

        if self.dry_run {
            return Ok(SendSummary {
                job_id: tracker.id().clone(),
                report_id: report_id.clone(),
                version: manifest.version,
                location: None,
                dry_run: true,
            });
        }

        let location = self.sender.send(&report, &manifest).await?;
        manifest.mark_submitted(Some(location.clone()));
        report.version = manifest.version;
        self.store.store_report_with_manifest(&report, &manifest).await?;

        Ok(SendSummary {
            job_id: tracker.id().clone(),
            report_id: report_id.clone(),
            version: manifest.version,
            location: Some(location),
            dry_run: false,
        })
    }
}

fn stored_report_missing(kind: &str, id: &ReportId) -> BeaconError {
    BeaconError::Store(StoreError::ResourceMissing {
        kind: kind.to_string(),
        id: id.to_string(),
    })
}
