//! End-to-end pipeline tests on the in-memory store
//!
//! Each test seeds a fresh store with the clinical resources one facility
//! needs (facility, measure, bed registry, concept map, code system, totals
//! baseline, census lists, patient data) and drives the full pipeline
//! through `ReportPipeline::from_config`.

use beacon::adapters::resolve::ReportStore;
use beacon::adapters::store::{MemoryStore, QueryFilter, ResourceKind, ResourceStore};
use beacon::config::{BeaconConfig, FileSenderConfig, SenderKind, WorklistSource};
use beacon::core::pipeline::identity;
use beacon::core::pipeline::ReportPipeline;
use beacon::domain::manifest::DocumentStatus;
use beacon::domain::report::ReportStatus;
use beacon::domain::{FacilityId, Job, JobStatus, MeasureId, ReportCriteria};
use chrono::{TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::watch;

const BED_TYPES: &str = "urn:example:bed-types";
const MEASURED: &str = "urn:example:measured-values";

fn criteria() -> ReportCriteria {
    ReportCriteria::new(
        FacilityId::new("loc-1").unwrap(),
        MeasureId::new("bed-availability").unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 59).unwrap(),
    )
    .unwrap()
}

fn shutdown() -> watch::Receiver<bool> {
    let (_tx, rx) = watch::channel(false);
    rx
}

fn config() -> BeaconConfig {
    let mut config = BeaconConfig::default();
    config.evaluation.worklist = WorklistSource::Census;
    config.reporting.sender = SenderKind::File;
    config
        .reporting
        .totals
        .insert("bed-availability".to_string(), "totals-1".to_string());
    config
}

/// Seeds everything a clean generation run resolves, except census lists
/// and patient data
async fn seed_clinical_resources(store: &ReportStore) {
    let raw = store.inner();
    raw.write(
        ResourceKind::Facility,
        "loc-1",
        &json!({
            "id": "loc-1",
            "name": "General",
            "position": {"latitude": 29.76, "longitude": -95.36}
        }),
    )
    .await
    .unwrap();
    raw.write(
        ResourceKind::Measure,
        "bed-availability",
        &json!({"id": "bed-availability", "title": "Bed Availability"}),
    )
    .await
    .unwrap();
    raw.write(
        ResourceKind::BedRegistry,
        "bed-registry",
        &json!({
            "id": "bed-registry",
            "entries": [
                {"unit": "ICU West", "code": "icu-w", "category": "CC"},
                {"unit": "Medical East", "code": "med-e", "category": "MC"},
                {"unit": "Psych North", "code": "psy-n", "category": "NPU"}
            ]
        }),
    )
    .await
    .unwrap();
    raw.write(
        ResourceKind::ConceptMap,
        "bed-types-to-tally-codes",
        &json!({
            "id": "bed-types-to-tally-codes",
            "groups": [
                {
                    "role": "occupied",
                    "source_system": BED_TYPES,
                    "target_system": MEASURED,
                    "elements": [
                        {"source": "CC", "target": "numCCBedsOcc"},
                        {"source": "MC", "target": "numMCBedsOcc"},
                        {"source": "Beds", "target": "numTotBedsOcc"}
                    ]
                },
                {
                    "role": "available",
                    "source_system": BED_TYPES,
                    "target_system": MEASURED,
                    "elements": [
                        {"source": "CC", "target": "numCCBedsAvail"},
                        {"source": "MC", "target": "numMCBedsAvail"},
                        {"source": "Beds", "target": "numTotBedsAvail"}
                    ]
                }
            ]
        }),
    )
    .await
    .unwrap();
    raw.write(
        ResourceKind::CodeSystem,
        "bed-type-categories",
        &json!({
            "id": "bed-type-categories",
            "system": BED_TYPES,
            "concepts": [
                {"code": "CC", "display": "Critical Care"},
                {"code": "MC", "display": "Medical Care"},
                {"code": "NPU", "display": "Non-acute"}
            ]
        }),
    )
    .await
    .unwrap();
}

async fn seed_baseline(store: &ReportStore, cc_total: i64, mc_total: i64, overall_total: i64) {
    store
        .inner()
        .write(
            ResourceKind::TotalsBaseline,
            "totals-1",
            &json!({
                "id": "totals-1",
                "entries": [
                    {
                        "category": {"system": BED_TYPES, "code": "CC"},
                        "total": {"code": {"system": MEASURED, "code": "numCCBeds"}, "count": cc_total}
                    },
                    {
                        "category": {"system": BED_TYPES, "code": "MC"},
                        "total": {"code": {"system": MEASURED, "code": "numMCBeds"}, "count": mc_total}
                    },
                    {
                        "category": {"system": BED_TYPES, "code": "Beds"},
                        "total": {"code": {"system": MEASURED, "code": "numTotBeds"}, "count": overall_total}
                    }
                ]
            }),
        )
        .await
        .unwrap();
}

async fn seed_census(store: &ReportStore, id: &str, references: &[&str]) {
    let entries: Vec<serde_json::Value> =
        references.iter().map(|r| json!({"reference": r})).collect();
    store
        .inner()
        .write(
            ResourceKind::CensusList,
            id,
            &json!({
                "id": id,
                "facility": "loc-1",
                "period": {"start": "2024-01-10T00:00:00Z", "end": "2024-01-10T23:59:59Z"},
                "entries": entries
            }),
        )
        .await
        .unwrap();
}

/// Patient data with one covering stay per unit
async fn seed_patient(store: &ReportStore, patient: &str, units: &[&str]) {
    let stays: Vec<serde_json::Value> = units
        .iter()
        .map(|u| json!({"unit": u, "start": "2024-01-09T08:00:00Z"}))
        .collect();
    store
        .inner()
        .write(
            ResourceKind::PatientData,
            patient,
            &json!({"id": patient, "patient": patient, "stays": stays}),
        )
        .await
        .unwrap();
}

fn store() -> ReportStore {
    ReportStore::new(Arc::new(MemoryStore::new()))
}

async fn job_notes(store: &ReportStore, status: JobStatus) -> String {
    let documents = store
        .inner()
        .query(ResourceKind::Job, &QueryFilter::new())
        .await
        .unwrap();
    documents
        .into_iter()
        .map(|d| serde_json::from_value::<Job>(d).unwrap())
        .filter(|j| j.status == status)
        .flat_map(|j| j.notes.into_iter().map(|n| n.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[tokio::test]
async fn test_occupied_beds_tallied_against_baseline() {
    let store = store();
    seed_clinical_resources(&store).await;
    seed_baseline(&store, 10, 5, 15).await;
    seed_census(&store, "census-1", &["Patient/p1", "Patient/p2", "Patient/p3"]).await;
    seed_patient(&store, "p1", &["icu-w"]).await;
    seed_patient(&store, "p2", &["icu-w"]).await;
    seed_patient(&store, "p3", &["icu-w"]).await;

    let pipeline = ReportPipeline::from_config(&config(), store.clone()).unwrap();
    let summary = pipeline.generate(criteria(), false, shutdown()).await.unwrap();

    assert_eq!(summary.attempted, 3);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.groups, 3);
    assert!(!summary.regenerated);
    assert_eq!(summary.version.to_string(), "0.1");

    let report = store
        .aggregate_report(&summary.report_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.status, ReportStatus::Complete);
    assert_eq!(report.version.to_string(), "0.1");

    let cc = report.group("CC").unwrap();
    assert_eq!(cc.population("numCCBeds").unwrap().count, 10);
    assert_eq!(cc.population("numCCBedsOcc").unwrap().count, 3);
    assert_eq!(cc.population("numCCBedsAvail").unwrap().count, 7);

    // No patient touched MC, so it zero-fills and derives from the baseline
    let mc = report.group("MC").unwrap();
    assert_eq!(mc.population("numMCBedsOcc").unwrap().count, 0);
    assert_eq!(mc.population("numMCBedsAvail").unwrap().count, 5);

    let overall = report.group("Beds").unwrap();
    assert_eq!(overall.population("numTotBedsOcc").unwrap().count, 3);
    assert_eq!(overall.population("numTotBedsAvail").unwrap().count, 12);

    // Manifest persisted alongside the report, still unpublished
    let manifest = store.manifest(&summary.report_id).await.unwrap().unwrap();
    assert_eq!(manifest.status, DocumentStatus::Preliminary);
    assert_eq!(manifest.census_lists, vec!["census-1".to_string()]);

    // Each patient left an audit document under the master id
    for patient in ["p1", "p2", "p3"] {
        let doc_id = identity::patient_result_id(
            &summary.report_id,
            &beacon::domain::PatientId::new(patient).unwrap(),
        );
        let stored = store
            .inner()
            .read(ResourceKind::PatientReport, &doc_id)
            .await
            .unwrap();
        assert!(stored.is_some(), "missing audit result for {patient}");
    }

    let notes = job_notes(&store, JobStatus::Completed).await;
    assert!(notes.contains("3 of 3 patients evaluated"));
    assert!(notes.contains("stored at version 0.1"));
}

#[tokio::test]
async fn test_no_patient_data_reports_full_availability() {
    let store = store();
    seed_clinical_resources(&store).await;
    seed_baseline(&store, 10, 5, 15).await;
    seed_census(&store, "census-1", &["Patient/p1", "Patient/p2"]).await;
    // Neither patient has stored data

    let pipeline = ReportPipeline::from_config(&config(), store.clone()).unwrap();
    let summary = pipeline.generate(criteria(), false, shutdown()).await.unwrap();
    assert_eq!(summary.succeeded, 2);

    let report = store
        .aggregate_report(&summary.report_id)
        .await
        .unwrap()
        .unwrap();
    let cc = report.group("CC").unwrap();
    assert_eq!(cc.population("numCCBedsOcc").unwrap().count, 0);
    assert_eq!(cc.population("numCCBedsAvail").unwrap().count, 10);
    let overall = report.group("Beds").unwrap();
    assert_eq!(overall.population("numTotBedsAvail").unwrap().count, 15);
}

#[tokio::test]
async fn test_duplicate_census_entries_evaluate_once() {
    let store = store();
    seed_clinical_resources(&store).await;
    seed_baseline(&store, 10, 5, 15).await;
    // Two lists naming the same patient must not double-count the bed
    seed_census(&store, "census-1", &["Patient/p1"]).await;
    seed_census(&store, "census-2", &["Patient/p1", "Patient/p2"]).await;
    seed_patient(&store, "p1", &["icu-w"]).await;
    seed_patient(&store, "p2", &["icu-w"]).await;

    let pipeline = ReportPipeline::from_config(&config(), store.clone()).unwrap();
    let summary = pipeline.generate(criteria(), false, shutdown()).await.unwrap();
    assert_eq!(summary.attempted, 2);

    let report = store
        .aggregate_report(&summary.report_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        report.group("CC").unwrap().population("numCCBedsOcc").unwrap().count,
        2
    );

    let manifest = store.manifest(&summary.report_id).await.unwrap().unwrap();
    let mut lists = manifest.census_lists.clone();
    lists.sort();
    assert_eq!(lists, vec!["census-1".to_string(), "census-2".to_string()]);
}

#[tokio::test]
async fn test_repeat_generation_without_regenerate_conflicts() {
    let store = store();
    seed_clinical_resources(&store).await;
    seed_baseline(&store, 10, 5, 15).await;
    seed_census(&store, "census-1", &["Patient/p1"]).await;
    seed_patient(&store, "p1", &["icu-w"]).await;

    let pipeline = ReportPipeline::from_config(&config(), store.clone()).unwrap();
    let first = pipeline.generate(criteria(), false, shutdown()).await.unwrap();

    let err = pipeline
        .generate(criteria(), false, shutdown())
        .await
        .unwrap_err();
    assert!(err.is_conflict());
    assert!(err
        .to_string()
        .contains("A report has already been generated"));

    // The stored report is untouched by the rejected run
    let manifest = store.manifest(&first.report_id).await.unwrap().unwrap();
    assert_eq!(manifest.version.to_string(), "0.1");
}

#[tokio::test]
async fn test_concurrent_identical_runs_store_exactly_one_report() {
    let store = store();
    seed_clinical_resources(&store).await;
    seed_baseline(&store, 10, 5, 15).await;
    seed_census(&store, "census-1", &["Patient/p1", "Patient/p2"]).await;
    seed_patient(&store, "p1", &["icu-w"]).await;
    seed_patient(&store, "p2", &["icu-w"]).await;

    // Both runs start before either has persisted, so neither sees the
    // other's manifest up front
    let pipeline = Arc::new(ReportPipeline::from_config(&config(), store.clone()).unwrap());
    let first = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.generate(criteria(), false, shutdown()).await }
    });
    let second = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.generate(criteria(), false, shutdown()).await }
    });

    let results = [first.await.unwrap(), second.await.unwrap()];
    let succeeded = results.iter().filter(|r| r.is_ok()).count();
    let conflicted = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.is_conflict()))
        .count();
    assert_eq!(
        (succeeded, conflicted),
        (1, 1),
        "one run must win and one must be rejected: {results:?}"
    );

    // Only the winner's documents exist, at the initial version
    let manifests = store
        .inner()
        .query(ResourceKind::ReportManifest, &QueryFilter::new())
        .await
        .unwrap();
    assert_eq!(manifests.len(), 1);
    assert_eq!(manifests[0]["version"], "0.1");
    let reports = store
        .inner()
        .query(ResourceKind::AggregateReport, &QueryFilter::new())
        .await
        .unwrap();
    assert_eq!(reports.len(), 1);
}

#[tokio::test]
async fn test_regeneration_updates_in_place_and_bumps_minor() {
    let store = store();
    seed_clinical_resources(&store).await;
    seed_baseline(&store, 10, 5, 15).await;
    seed_census(&store, "census-1", &["Patient/p1"]).await;
    seed_patient(&store, "p1", &["icu-w"]).await;

    let pipeline = ReportPipeline::from_config(&config(), store.clone()).unwrap();
    let first = pipeline.generate(criteria(), false, shutdown()).await.unwrap();

    // The world changed between runs: a second patient was admitted
    seed_census(&store, "census-1", &["Patient/p1", "Patient/p2"]).await;
    seed_patient(&store, "p2", &["icu-w"]).await;

    let second = pipeline.generate(criteria(), true, shutdown()).await.unwrap();
    assert!(second.regenerated);
    assert_eq!(second.report_id, first.report_id);
    assert_eq!(second.version.to_string(), "0.2");

    // Regeneration replaced the body under the same id
    let reports = store
        .inner()
        .query(ResourceKind::AggregateReport, &QueryFilter::new())
        .await
        .unwrap();
    assert_eq!(reports.len(), 1);

    let report = store
        .aggregate_report(&second.report_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        report.group("CC").unwrap().population("numCCBedsOcc").unwrap().count,
        2
    );
}

#[tokio::test]
async fn test_report_id_is_deterministic_for_criteria() {
    let store = store();
    seed_clinical_resources(&store).await;
    seed_baseline(&store, 10, 5, 15).await;
    seed_census(&store, "census-1", &["Patient/p1"]).await;
    seed_patient(&store, "p1", &["icu-w"]).await;

    let pipeline = ReportPipeline::from_config(&config(), store).unwrap();
    let summary = pipeline.generate(criteria(), false, shutdown()).await.unwrap();

    assert_eq!(summary.report_id, identity::master_report_id(&criteria()).unwrap());
}

#[tokio::test]
async fn test_failed_patient_is_excluded_and_recorded() {
    let store = store();
    seed_clinical_resources(&store).await;
    seed_baseline(&store, 10, 5, 15).await;
    seed_census(
        &store,
        "census-1",
        &["Patient/p1", "Patient/p2", "Patient/p3", "Patient/p4", "Patient/p5"],
    )
    .await;
    for patient in ["p1", "p2", "p4", "p5"] {
        seed_patient(&store, patient, &["icu-w"]).await;
    }
    // p3's stored data does not decode, so its evaluation fails
    store
        .inner()
        .write(
            ResourceKind::PatientData,
            "p3",
            &json!({"id": "p3", "patient": "p3", "stays": "broken"}),
        )
        .await
        .unwrap();

    let pipeline = ReportPipeline::from_config(&config(), store.clone()).unwrap();
    let summary = pipeline.generate(criteria(), false, shutdown()).await.unwrap();

    assert_eq!(summary.attempted, 5);
    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.failed, 1);

    // The failure excludes only that patient's contribution and downgrades
    // the report to pending
    let report = store
        .aggregate_report(&summary.report_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.status, ReportStatus::Pending);
    assert_eq!(
        report.group("CC").unwrap().population("numCCBedsOcc").unwrap().count,
        4
    );

    // The run itself still completes; the loss lives in the job notes
    let notes = job_notes(&store, JobStatus::Completed).await;
    assert!(notes.contains("Evaluation failed for patient p3"));
    assert!(notes.contains("4 of 5 patients evaluated"));
}

#[tokio::test]
async fn test_unmapped_category_recorded_on_job() {
    let store = store();
    seed_clinical_resources(&store).await;
    // Baseline carries NPU, which the concept map does not cover
    store
        .inner()
        .write(
            ResourceKind::TotalsBaseline,
            "totals-1",
            &json!({
                "id": "totals-1",
                "entries": [
                    {
                        "category": {"system": BED_TYPES, "code": "NPU"},
                        "total": {"code": {"system": MEASURED, "code": "numNPUBeds"}, "count": 4}
                    },
                    {
                        "category": {"system": BED_TYPES, "code": "Beds"},
                        "total": {"code": {"system": MEASURED, "code": "numTotBeds"}, "count": 4}
                    }
                ]
            }),
        )
        .await
        .unwrap();
    seed_census(&store, "census-1", &["Patient/p1"]).await;

    let pipeline = ReportPipeline::from_config(&config(), store.clone()).unwrap();
    let summary = pipeline.generate(criteria(), false, shutdown()).await.unwrap();

    // The NPU group keeps its total even though no tally code maps
    let report = store
        .aggregate_report(&summary.report_id)
        .await
        .unwrap()
        .unwrap();
    let npu = report.group("NPU").unwrap();
    assert_eq!(npu.population("numNPUBeds").unwrap().count, 4);
    assert!(npu.population("numNPUBedsOcc").is_none());

    let notes = job_notes(&store, JobStatus::Completed).await;
    assert!(notes.contains("No tally code mapped for NPU/occupied"));
    assert!(notes.contains("No tally code mapped for NPU/available"));
}

#[tokio::test]
async fn test_dropped_patient_contributions_noted_on_job() {
    let store = store();
    seed_clinical_resources(&store).await;
    seed_baseline(&store, 10, 5, 15).await;
    seed_census(&store, "census-1", &["Patient/p1", "Patient/p2"]).await;
    // Psych North maps to NPU, which has no occupied tally code
    seed_patient(&store, "p1", &["psy-n"]).await;
    seed_patient(&store, "p2", &["psy-n"]).await;

    let pipeline = ReportPipeline::from_config(&config(), store.clone()).unwrap();
    let summary = pipeline.generate(criteria(), false, shutdown()).await.unwrap();

    // The patients still evaluate cleanly; only their contribution is lost
    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 0);

    let notes = job_notes(&store, JobStatus::Completed).await;
    assert!(notes.contains(
        "No occupied tally code for category NPU; 2 patient contribution(s) dropped"
    ));
}

#[tokio::test]
async fn test_overcount_clamps_available_and_notes_it() {
    let store = store();
    seed_clinical_resources(&store).await;
    seed_baseline(&store, 2, 5, 7).await;
    seed_census(&store, "census-1", &["Patient/p1", "Patient/p2", "Patient/p3"]).await;
    for patient in ["p1", "p2", "p3"] {
        seed_patient(&store, patient, &["icu-w"]).await;
    }

    let pipeline = ReportPipeline::from_config(&config(), store.clone()).unwrap();
    let summary = pipeline.generate(criteria(), false, shutdown()).await.unwrap();

    let report = store
        .aggregate_report(&summary.report_id)
        .await
        .unwrap()
        .unwrap();
    let cc = report.group("CC").unwrap();
    assert_eq!(cc.population("numCCBedsOcc").unwrap().count, 3);
    assert_eq!(cc.population("numCCBedsAvail").unwrap().count, 0);

    let notes = job_notes(&store, JobStatus::Completed).await;
    assert!(notes.contains("Available count clamped for CC"));
}

#[tokio::test]
async fn test_missing_census_fails_worklist_stage() {
    let store = store();
    seed_clinical_resources(&store).await;
    seed_baseline(&store, 10, 5, 15).await;

    let pipeline = ReportPipeline::from_config(&config(), store.clone()).unwrap();
    let err = pipeline
        .generate(criteria(), false, shutdown())
        .await
        .unwrap_err();
    assert!(err
        .to_string()
        .contains("A census for the specified criteria was not found"));

    let notes = job_notes(&store, JobStatus::Failed).await;
    assert!(notes.contains("failed during worklist resolution"));
}

#[tokio::test]
async fn test_dry_run_persists_nothing() {
    let store = store();
    seed_clinical_resources(&store).await;
    seed_baseline(&store, 10, 5, 15).await;
    seed_census(&store, "census-1", &["Patient/p1"]).await;
    seed_patient(&store, "p1", &["icu-w"]).await;

    let mut config = config();
    config.application.dry_run = true;
    let pipeline = ReportPipeline::from_config(&config, store.clone()).unwrap();

    let summary = pipeline.generate(criteria(), false, shutdown()).await.unwrap();
    assert!(summary.dry_run);
    assert_eq!(summary.groups, 3);

    assert!(store
        .aggregate_report(&summary.report_id)
        .await
        .unwrap()
        .is_none());
    assert!(store.manifest(&summary.report_id).await.unwrap().is_none());
    let audits = store
        .inner()
        .query(ResourceKind::PatientReport, &QueryFilter::new())
        .await
        .unwrap();
    assert!(audits.is_empty());
}

#[tokio::test]
async fn test_send_publishes_and_bumps_major_version() {
    let store = store();
    seed_clinical_resources(&store).await;
    seed_baseline(&store, 10, 5, 15).await;
    seed_census(&store, "census-1", &["Patient/p1"]).await;
    seed_patient(&store, "p1", &["icu-w"]).await;

    let outbox = tempfile::tempdir().unwrap();
    let mut config = config();
    config.reporting.file_sender = Some(FileSenderConfig {
        directory: outbox.path().to_string_lossy().into_owned(),
    });
    let pipeline = ReportPipeline::from_config(&config, store.clone()).unwrap();

    let generated = pipeline.generate(criteria(), false, shutdown()).await.unwrap();
    let sent = pipeline.send(&generated.report_id).await.unwrap();

    assert_eq!(sent.version.to_string(), "1.0");
    let location = sent.location.unwrap();
    assert!(location.ends_with(&format!("{}-v1.0.json", generated.report_id)));
    assert!(std::path::Path::new(&location).exists());

    // Publish is recorded on both documents
    let manifest = store.manifest(&generated.report_id).await.unwrap().unwrap();
    assert_eq!(manifest.status, DocumentStatus::Final);
    assert_eq!(manifest.version.to_string(), "1.0");
    assert_eq!(manifest.submitted_location.as_deref(), Some(location.as_str()));
    assert!(manifest.submitted_at.is_some());
    let report = store
        .aggregate_report(&generated.report_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.version.to_string(), "1.0");

    // Resending is allowed and starts a new publish generation
    let resent = pipeline.send(&generated.report_id).await.unwrap();
    assert_eq!(resent.version.to_string(), "2.0");
}

#[tokio::test]
async fn test_send_unknown_report_fails() {
    let store = store();
    let pipeline = ReportPipeline::from_config(&config(), store.clone()).unwrap();

    let missing = beacon::domain::ReportId::new("deadbeef").unwrap();
    let err = pipeline.send(&missing).await.unwrap_err();
    assert!(err.to_string().contains("not found"));

    let notes = job_notes(&store, JobStatus::Failed).await;
    assert!(notes.contains("Report submission failed"));
}
