//! Typed resource access
//!
//! [`ReportStore`] wraps the raw document store with typed read and write
//! operations for every resource the pipeline touches. Reads that the
//! pipeline cannot proceed without turn absence into
//! [`StoreError::ResourceMissing`]; reads where absence is an ordinary
//! outcome return `Option`.

use crate::adapters::store::{QueryFilter, ResourceKind, ResourceStore, StoreOp};
use crate::domain::ids::{FacilityId, JobId, MeasureId, PatientId, ReportId};
use crate::domain::{
    AggregateReport, BeaconError, BedRegistry, CensusList, CodeSystem, ConceptMap, Facility, Job,
    MeasureDefinition, PartialResult, PatientData, ReportManifest, ReportPeriod, Result,
    StoreError, TotalsBaseline,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

fn missing(kind: ResourceKind, id: &str) -> BeaconError {
    BeaconError::Store(StoreError::ResourceMissing {
        kind: kind.to_string(),
        id: id.to_string(),
    })
}

fn decode<T: DeserializeOwned>(
    kind: ResourceKind,
    id: &str,
    document: serde_json::Value,
) -> Result<T> {
    serde_json::from_value(document)
        .map_err(|e| BeaconError::Store(StoreError::InvalidFormat(format!("{kind}/{id}: {e}"))))
}

/// Typed facade over the resource store
#[derive(Clone)]
pub struct ReportStore {
    store: Arc<dyn ResourceStore>,
}

impl ReportStore {
    /// Wraps a raw store
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// The underlying raw store
    pub fn inner(&self) -> Arc<dyn ResourceStore> {
        Arc::clone(&self.store)
    }

    async fn read_required<T: DeserializeOwned>(&self, kind: ResourceKind, id: &str) -> Result<T> {
        let document = self
            .store
            .read(kind, id)
            .await?
            .ok_or_else(|| missing(kind, id))?;
        decode(kind, id, document)
    }

    async fn read_optional<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        id: &str,
    ) -> Result<Option<T>> {
        match self.store.read(kind, id).await? {
            Some(document) => Ok(Some(decode(kind, id, document)?)),
            None => Ok(None),
        }
    }

    async fn put<T: Serialize>(&self, kind: ResourceKind, id: &str, value: &T) -> Result<()> {
        let document = serde_json::to_value(value)?;
        self.store.write(kind, id, &document).await
    }

    /// Resolves a facility; absence is an error
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ResourceMissing`] when the facility does not
    /// exist, or a store error when the read fails.
    pub async fn facility(&self, id: &FacilityId) -> Result<Facility> {
        self.read_required(ResourceKind::Facility, id.as_str()).await
    }

    /// Resolves a measure definition; absence is an error
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ResourceMissing`] when the measure does not
    /// exist, or a store error when the read fails.
    pub async fn measure(&self, id: &MeasureId) -> Result<MeasureDefinition> {
        self.read_required(ResourceKind::Measure, id.as_str()).await
    }

    /// Loads a concept map by document id
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ResourceMissing`] when absent.
    pub async fn concept_map(&self, id: &str) -> Result<ConceptMap> {
        self.read_required(ResourceKind::ConceptMap, id).await
    }

    /// Loads a code system by document id
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ResourceMissing`] when absent.
    pub async fn code_system(&self, id: &str) -> Result<CodeSystem> {
        self.read_required(ResourceKind::CodeSystem, id).await
    }

    /// Loads the facility bed registry
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ResourceMissing`] when absent.
    pub async fn bed_registry(&self, id: &str) -> Result<BedRegistry> {
        self.read_required(ResourceKind::BedRegistry, id).await
    }

    /// Loads a totals baseline by document id
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ResourceMissing`] when absent.
    pub async fn totals_baseline(&self, id: &str) -> Result<TotalsBaseline> {
        self.read_required(ResourceKind::TotalsBaseline, id).await
    }

    /// Census lists for a facility whose period intersects the window
    ///
    /// Documents that do not decode as census lists are skipped with a
    /// warning rather than failing the whole query.
    ///
    /// # Errors
    ///
    /// Returns a store error when the query itself fails.
    pub async fn census_lists(
        &self,
        facility: &FacilityId,
        period: &ReportPeriod,
    ) -> Result<Vec<CensusList>> {
        let filter = QueryFilter::new()
            .field("facility", facility.as_str())
            .overlapping(period.start, period.end);
        let documents = self.store.query(ResourceKind::CensusList, &filter).await?;

        let mut lists = Vec::new();
        for document in documents {
            match serde_json::from_value::<CensusList>(document) {
                Ok(list) => lists.push(list),
                Err(e) => {
                    tracing::warn!(
                        facility = %facility,
                        error = %e,
                        "Skipping census list that does not decode"
                    );
                }
            }
        }
        Ok(lists)
    }

    /// Source data for one patient, when any has been recorded
    ///
    /// # Errors
    ///
    /// Returns a store error when the read fails.
    pub async fn patient_data(&self, patient: &PatientId) -> Result<Option<PatientData>> {
        self.read_optional(ResourceKind::PatientData, patient.as_str())
            .await
    }

    /// Stores source data under its patient id
    ///
    /// # Errors
    ///
    /// Returns a store error when the write fails.
    pub async fn put_patient_data(&self, data: &PatientData) -> Result<()> {
        self.put(ResourceKind::PatientData, data.patient.as_str(), data)
            .await
    }

    /// Stores one patient's evaluation result under the given audit id
    ///
    /// # Errors
    ///
    /// Returns a store error when the write fails.
    pub async fn put_partial_result(&self, document_id: &str, result: &PartialResult) -> Result<()> {
        self.put(ResourceKind::PatientReport, document_id, result)
            .await
    }

    /// Manifest for a report, when one exists
    ///
    /// # Errors
    ///
    /// Returns a store error when the read fails.
    pub async fn manifest(&self, id: &ReportId) -> Result<Option<ReportManifest>> {
        self.read_optional(ResourceKind::ReportManifest, id.as_str())
            .await
    }

    /// Stores a manifest under its master report id
    ///
    /// # Errors
    ///
    /// Returns a store error when the write fails.
    pub async fn put_manifest(&self, manifest: &ReportManifest) -> Result<()> {
        self.put(
            ResourceKind::ReportManifest,
            manifest.master_id.as_str(),
            manifest,
        )
        .await
    }

    /// Aggregate report body, when one exists
    ///
    /// # Errors
    ///
    /// Returns a store error when the read fails.
    pub async fn aggregate_report(&self, id: &ReportId) -> Result<Option<AggregateReport>> {
        self.read_optional(ResourceKind::AggregateReport, id.as_str())
            .await
    }

    /// Stores an aggregate report under its id
    ///
    /// # Errors
    ///
    /// Returns a store error when the write fails.
    pub async fn put_aggregate_report(&self, report: &AggregateReport) -> Result<()> {
        self.put(ResourceKind::AggregateReport, report.id.as_str(), report)
            .await
    }

    /// Job record, when one exists
    ///
    /// # Errors
    ///
    /// Returns a store error when the read fails.
    pub async fn job(&self, id: &JobId) -> Result<Option<Job>> {
        self.read_optional(ResourceKind::Job, id.as_str()).await
    }

    /// Stores a job record under its id
    ///
    /// # Errors
    ///
    /// Returns a store error when the write fails.
    pub async fn put_job(&self, job: &Job) -> Result<()> {
        self.put(ResourceKind::Job, job.id.as_str(), job).await
    }

    /// Persists a report and its manifest in one transaction
    ///
    /// A reader never observes the report without its manifest or the other
    /// way round.
    ///
    /// # Errors
    ///
    /// Returns a store error when the transaction fails; neither document
    /// is written in that case.
    pub async fn store_report_with_manifest(
        &self,
        report: &AggregateReport,
        manifest: &ReportManifest,
    ) -> Result<()> {
        let operations = vec![
            StoreOp::Put {
                kind: ResourceKind::AggregateReport,
                id: report.id.as_str().to_string(),
                document: serde_json::to_value(report)?,
            },
            StoreOp::Put {
                kind: ResourceKind::ReportManifest,
                id: manifest.master_id.as_str().to_string(),
                document: serde_json::to_value(manifest)?,
            },
        ];
        self.store.transaction(operations).await
    }

    /// Persists a first-time report and its manifest in one transaction
    ///
    /// The manifest doubles as the creation guard: when two runs race on the
    /// same report id, the store admits exactly one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DocumentExists`] when a manifest is already
    /// stored under the report id; other store failures propagate. Nothing
    /// is written on failure.
    pub async fn create_report_with_manifest(
        &self,
        report: &AggregateReport,
        manifest: &ReportManifest,
    ) -> Result<()> {
        let operations = vec![
            StoreOp::Put {
                kind: ResourceKind::AggregateReport,
                id: report.id.as_str().to_string(),
                document: serde_json::to_value(report)?,
            },
            StoreOp::Create {
                kind: ResourceKind::ReportManifest,
                id: manifest.master_id.as_str().to_string(),
                document: serde_json::to_value(manifest)?,
            },
        ];
        self.store.transaction(operations).await
    }
}
