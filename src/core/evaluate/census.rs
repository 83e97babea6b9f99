//! Census-driven evaluation
//!
//! Counts the bed stays that span the whole reporting window, resolves
//! each stay's unit through the facility bed registry, and emits one
//! occupied-tally group per category the patient's stays landed in.

use crate::adapters::resolve::ReportStore;
use crate::config::EvaluationConfig;
use crate::core::evaluate::PatientEvaluator;
use crate::core::translate::{CachedTable, CodeTranslator, Translation};
use crate::domain::{
    BedRegistry, BedStay, PartialResult, PatientId, ReportGroup, ReportPeriod, Result, TallyRole,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Evaluates patients against their stored bed stay data
pub struct CensusEvaluator {
    store: ReportStore,
    translator: Arc<CodeTranslator>,
    registry_id: String,
    period: ReportPeriod,
    registry: CachedTable<BedRegistry>,
}

impl CensusEvaluator {
    /// Creates an evaluator for one reporting window
    pub fn new(
        store: ReportStore,
        translator: Arc<CodeTranslator>,
        config: &EvaluationConfig,
        period: ReportPeriod,
    ) -> Self {
        Self {
            store,
            translator,
            registry_id: config.bed_registry_id.clone(),
            period,
            registry: CachedTable::new(),
        }
    }

    /// The bed registry, loaded once and shared across concurrent patients
    async fn registry(&self) -> Result<Arc<BedRegistry>> {
        self.registry
            .get_or_load(|| async { self.store.bed_registry(&self.registry_id).await })
            .await
    }

    /// Covering stays counted per category source code
    fn count_stays(
        &self,
        patient: &PatientId,
        registry: &BedRegistry,
        stays: &[BedStay],
    ) -> BTreeMap<String, i64> {
        let mut counts: BTreeMap<String, i64> = BTreeMap::new();
        for stay in stays.iter().filter(|s| s.covers(&self.period)) {
            match registry.find(&stay.unit) {
                Some(entry) => {
                    *counts.entry(entry.category.clone()).or_insert(0) += 1;
                }
                None => {
                    tracing::warn!(
                        patient = %patient,
                        unit = %stay.unit,
                        "Stay unit not in bed registry; stay skipped"
                    );
                }
            }
        }
        counts
    }
}

#[async_trait]
impl PatientEvaluator for CensusEvaluator {
    async fn evaluate(&self, patient: &PatientId) -> Result<PartialResult> {
        let data = match self.store.patient_data(patient).await? {
            Some(data) => data,
            None => {
                tracing::debug!(
                    patient = %patient,
                    "No stored data for patient; contributing no tallies"
                );
                return Ok(PartialResult::evaluated(patient.clone(), Vec::new()));
            }
        };

        let registry = self.registry().await?;
        let counts = self.count_stays(patient, &registry, &data.stays);

        let mut groups = Vec::new();
        let mut unmapped = Vec::new();
        for (category_code, count) in counts {
            match self
                .translator
                .translate(&category_code, TallyRole::Occupied)
                .await?
            {
                Translation::Mapped(coding) => {
                    let category = self.translator.category(&category_code).await?;
                    let mut group = ReportGroup::new(category);
                    group.add_population(coding, count);
                    groups.push(group);
                }
                Translation::Unmapped => {
                    tracing::warn!(
                        patient = %patient,
                        category = %category_code,
                        "No occupied tally code for category; contribution dropped"
                    );
                    unmapped.push(category_code);
                }
            }
        }

        Ok(PartialResult::evaluated(patient.clone(), groups).with_unmapped(unmapped))
    }

    fn name(&self) -> &str {
        "census"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::store::{MemoryStore, ResourceKind, ResourceStore};
    use crate::config::ReportingConfig;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    const BED_TYPES: &str = "urn:example:bed-types";
    const MEASURED: &str = "urn:example:measured-values";

    fn period() -> ReportPeriod {
        ReportPeriod::new(
            Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 59).unwrap(),
        )
        .unwrap()
    }

    async fn seeded_store() -> ReportStore {
        let raw = Arc::new(MemoryStore::new());
        raw.write(
            ResourceKind::BedRegistry,
            "bed-registry",
            &json!({
                "id": "bed-registry",
                "entries": [
                    {"unit": "ICU West", "code": "icu-w", "category": "CC"},
                    {"unit": "ICU East", "code": "icu-e", "category": "CC"},
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
                            {"source": "MC", "target": "numMCBedsOcc"}
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
                    {"code": "MC", "display": "Medical Care"}
                ]
            }),
        )
        .await
        .unwrap();
        ReportStore::new(raw)
    }

    async fn put_patient(store: &ReportStore, patient: &str, stays: serde_json::Value) {
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

    fn evaluator(store: ReportStore) -> CensusEvaluator {
        let translator = Arc::new(CodeTranslator::new(
            store.clone(),
            &ReportingConfig::default(),
        ));
        CensusEvaluator::new(store, translator, &EvaluationConfig::default(), period())
    }

    #[tokio::test]
    async fn test_covering_stay_counts_once() {
        let store = seeded_store().await;
        put_patient(
            &store,
            "p1",
            json!([{"unit": "icu-w", "start": "2024-01-09T08:00:00Z"}]),
        )
        .await;

        let result = evaluator(store)
            .evaluate(&PatientId::new("p1").unwrap())
            .await
            .unwrap();

        assert!(!result.is_failed());
        assert_eq!(result.groups.len(), 1);
        let group = &result.groups[0];
        assert_eq!(group.category.code, "CC");
        assert_eq!(group.category.display.as_deref(), Some("Critical Care"));
        assert_eq!(group.population("numCCBedsOcc").unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_stays_in_same_category_accumulate() {
        let store = seeded_store().await;
        put_patient(
            &store,
            "p1",
            json!([
                {"unit": "icu-w", "start": "2024-01-09T08:00:00Z"},
                {"unit": "ICU East", "start": "2024-01-08T08:00:00Z"}
            ]),
        )
        .await;

        let result = evaluator(store)
            .evaluate(&PatientId::new("p1").unwrap())
            .await
            .unwrap();
        assert_eq!(result.groups[0].population("numCCBedsOcc").unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_stay_inside_window_does_not_cover() {
        let store = seeded_store().await;
        // Starts after the window opens, so the bed was not held throughout
        put_patient(
            &store,
            "p1",
            json!([{"unit": "icu-w", "start": "2024-01-10T12:00:00Z"}]),
        )
        .await;

        let result = evaluator(store)
            .evaluate(&PatientId::new("p1").unwrap())
            .await
            .unwrap();
        assert!(result.groups.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_unit_skipped_others_counted() {
        let store = seeded_store().await;
        put_patient(
            &store,
            "p1",
            json!([
                {"unit": "helipad", "start": "2024-01-09T08:00:00Z"},
                {"unit": "med-e", "start": "2024-01-09T08:00:00Z"}
            ]),
        )
        .await;

        let result = evaluator(store)
            .evaluate(&PatientId::new("p1").unwrap())
            .await
            .unwrap();
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].category.code, "MC");
    }

    #[tokio::test]
    async fn test_missing_patient_data_contributes_nothing() {
        let store = seeded_store().await;

        let result = evaluator(store)
            .evaluate(&PatientId::new("ghost").unwrap())
            .await
            .unwrap();
        assert!(!result.is_failed());
        assert!(result.groups.is_empty());
    }

    #[tokio::test]
    async fn test_category_without_occupied_mapping_dropped() {
        let store = seeded_store().await;
        put_patient(
            &store,
            "p1",
            json!([{"unit": "psy-n", "start": "2024-01-09T08:00:00Z"}]),
        )
        .await;

        let result = evaluator(store)
            .evaluate(&PatientId::new("p1").unwrap())
            .await
            .unwrap();
        assert!(result.groups.is_empty());
        // The drop is carried on the result, not just logged
        assert_eq!(result.unmapped, vec!["NPU".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_registry_is_an_error() {
        let raw = Arc::new(MemoryStore::new());
        let store = ReportStore::new(raw);
        put_patient(
            &store,
            "p1",
            json!([{"unit": "icu-w", "start": "2024-01-09T08:00:00Z"}]),
        )
        .await;

        let err = evaluator(store)
            .evaluate(&PatientId::new("p1").unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("bed-registry"));
    }
}
