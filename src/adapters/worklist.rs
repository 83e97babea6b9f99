//! Worklist resolution
//!
//! A worklist is the set of patients a report run evaluates. The primary
//! source is precomputed census lists stored for the facility and period;
//! a fixed list from configuration exists for smoke tests and replays.

use crate::adapters::resolve::ReportStore;
use crate::config::{EvaluationConfig, WorklistSource};
use crate::domain::{BeaconError, PatientOfInterest, ReportCriteria, Result};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

/// Message returned when no census covers the requested criteria
pub const NO_CENSUS_FOUND: &str = "A census for the specified criteria was not found.";

/// Patients selected for one report run, with their census provenance
#[derive(Debug, Clone, Default)]
pub struct Worklist {
    /// Ids of the census lists the patients came from
    pub census_lists: Vec<String>,

    /// Patients to evaluate, in first-seen order
    pub patients: Vec<PatientOfInterest>,
}

/// Source of patients for a report run
#[async_trait]
pub trait WorklistResolver: Send + Sync {
    /// Resolves the worklist for the given criteria
    ///
    /// # Errors
    ///
    /// Returns an error when the source cannot produce a worklist at all;
    /// individual unresolvable patients are not an error here.
    async fn resolve(&self, criteria: &ReportCriteria) -> Result<Worklist>;

    /// Name of the source for log output
    fn source_name(&self) -> &str;
}

/// Resolves patients from stored census lists
pub struct CensusWorklistResolver {
    store: ReportStore,
}

impl CensusWorklistResolver {
    pub fn new(store: ReportStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl WorklistResolver for CensusWorklistResolver {
    async fn resolve(&self, criteria: &ReportCriteria) -> Result<Worklist> {
        let lists = self
            .store
            .census_lists(criteria.facility(), criteria.period())
            .await?;

        if lists.is_empty() {
            return Err(BeaconError::Census(NO_CENSUS_FOUND.to_string()));
        }

        // The same patient can appear on several overlapping lists; keep the
        // first occurrence only
        let mut seen: HashSet<&str> = HashSet::new();
        let mut patients = Vec::new();
        for list in &lists {
            for entry in &list.entries {
                if seen.insert(entry.reference.as_str()) {
                    patients.push(PatientOfInterest::from_reference(entry.reference.as_str()));
                }
            }
        }

        let census_lists: Vec<String> = lists.iter().map(|l| l.id.clone()).collect();

        tracing::info!(
            facility = %criteria.facility(),
            census_lists = census_lists.len(),
            patients = patients.len(),
            "Resolved worklist from census lists"
        );

        Ok(Worklist {
            census_lists,
            patients,
        })
    }

    fn source_name(&self) -> &str {
        "census"
    }
}

/// Resolves a fixed patient list taken from configuration
pub struct FixedWorklistResolver {
    references: Vec<String>,
}

impl FixedWorklistResolver {
    pub fn new(references: Vec<String>) -> Self {
        Self { references }
    }
}

#[async_trait]
impl WorklistResolver for FixedWorklistResolver {
    async fn resolve(&self, criteria: &ReportCriteria) -> Result<Worklist> {
        let mut patients = Vec::with_capacity(self.references.len());
        for reference in &self.references {
            let patient = PatientOfInterest::from_reference(reference.as_str());
            // Configured references are operator input; a bad one is a
            // configuration problem, not a per-patient skip
            if patient.id.is_none() {
                return Err(BeaconError::Validation(format!(
                    "Invalid patient reference '{reference}' in evaluation.patients"
                )));
            }
            patients.push(patient);
        }

        tracing::info!(
            facility = %criteria.facility(),
            patients = patients.len(),
            "Using fixed worklist from configuration"
        );

        Ok(Worklist {
            census_lists: Vec::new(),
            patients,
        })
    }

    fn source_name(&self) -> &str {
        "fixed"
    }
}

/// Create the configured worklist resolver
pub fn create_worklist_resolver(
    config: &EvaluationConfig,
    store: ReportStore,
) -> Arc<dyn WorklistResolver> {
    match config.worklist {
        WorklistSource::Census => Arc::new(CensusWorklistResolver::new(store)),
        WorklistSource::Fixed => Arc::new(FixedWorklistResolver::new(config.patients.clone())),
    }
}
