//! Report output shapes
//!
//! The aggregate report is the final output of a run: ordered category
//! groups, each holding role-coded populations. Partial results are the
//! per-patient intermediate shape the coordinator collects and the
//! aggregator consumes; the totals baseline is the previously persisted
//! ceiling record "available" is derived from.

use crate::domain::codes::Coding;
use crate::domain::criteria::ReportPeriod;
use crate::domain::ids::{FacilityId, PatientId, ReportId};
use crate::domain::manifest::ReportVersion;
use serde::{Deserialize, Serialize};

/// Completion status of a generated report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// All data for the period was evaluated
    Complete,
    /// Data collection is still underway
    Pending,
    /// Generation hit an unrecoverable data problem
    Error,
}

/// One role-coded count inside a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Population {
    /// Role coding (occupied/available/total in some code system)
    pub code: Coding,

    /// Tallied count
    pub count: i64,
}

impl Population {
    /// Creates a population
    pub fn new(code: Coding, count: i64) -> Self {
        Self { code, count }
    }
}

/// One category group of an aggregate or partial report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportGroup {
    /// Category coding (a bed type, or the reserved overall category)
    pub category: Coding,

    /// Role-coded populations
    #[serde(default)]
    pub populations: Vec<Population>,
}

impl ReportGroup {
    /// Creates an empty group for a category
    pub fn new(category: Coding) -> Self {
        Self {
            category,
            populations: Vec::new(),
        }
    }

    /// Appends a population
    pub fn add_population(&mut self, code: Coding, count: i64) {
        self.populations.push(Population::new(code, count));
    }

    /// Finds a population by role code value
    pub fn population(&self, code: &str) -> Option<&Population> {
        self.populations.iter().find(|p| p.code.code == code)
    }
}

/// Final facility-level output of a report run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Master report identifier (deterministic from criteria)
    pub id: ReportId,

    /// Completion status
    pub status: ReportStatus,

    /// Measure reference (canonical URL or id)
    pub measure: String,

    /// Facility the report covers
    pub facility: FacilityId,

    /// Reporting period
    pub period: ReportPeriod,

    /// Version marker mirrored from the manifest
    pub version: ReportVersion,

    /// Ordered category groups
    #[serde(default)]
    pub groups: Vec<ReportGroup>,
}

impl AggregateReport {
    /// Finds a group by category code value
    pub fn group(&self, category_code: &str) -> Option<&ReportGroup> {
        self.groups.iter().find(|g| g.category.code == category_code)
    }
}

/// Outcome of evaluating one patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EvaluationOutcome {
    /// Evaluation produced (possibly zero) tally groups
    Evaluated,
    /// Evaluation failed; the result carries no tallies
    Failed {
        /// Why the evaluation failed
        reason: String,
    },
}

/// One patient's evaluated tallies
///
/// Always produced, even on failure, so "N of M" bookkeeping and the
/// per-patient audit trail stay consistent. A failed result is empty, never
/// omitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartialResult {
    /// Patient the result belongs to
    pub patient: PatientId,

    /// Evaluated tally groups; empty when the evaluation failed
    #[serde(default)]
    pub groups: Vec<ReportGroup>,

    /// Categories whose contribution was dropped for want of a tally code
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unmapped: Vec<String>,

    /// Whether evaluation succeeded
    pub outcome: EvaluationOutcome,
}

impl PartialResult {
    /// Successful evaluation with the given groups
    pub fn evaluated(patient: PatientId, groups: Vec<ReportGroup>) -> Self {
        Self {
            patient,
            groups,
            unmapped: Vec::new(),
            outcome: EvaluationOutcome::Evaluated,
        }
    }

    /// Records categories whose contribution could not be coded
    pub fn with_unmapped(mut self, categories: Vec<String>) -> Self {
        self.unmapped = categories;
        self
    }

    /// Failed evaluation; the result is empty but still tagged and kept
    pub fn failed(patient: PatientId, reason: impl Into<String>) -> Self {
        Self {
            patient,
            groups: Vec::new(),
            unmapped: Vec::new(),
            outcome: EvaluationOutcome::Failed {
                reason: reason.into(),
            },
        }
    }

    /// True when the evaluation failed
    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, EvaluationOutcome::Failed { .. })
    }
}

/// One category's ceiling in the totals baseline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalsEntry {
    /// Category the ceiling applies to
    pub category: Coding,

    /// The total population, with its own role coding
    pub total: Population,
}

/// Previously persisted per-category ceiling record
///
/// Authoritative for which categories appear in the output: partial-result
/// categories missing from the baseline are not emitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalsBaseline {
    /// Baseline document identifier
    pub id: String,

    /// Per-category entries, including the reserved overall category
    #[serde(default)]
    pub entries: Vec<TotalsEntry>,
}

impl TotalsBaseline {
    /// The reserved overall entry, when present
    pub fn overall(&self, overall_code: &str) -> Option<&TotalsEntry> {
        self.entries
            .iter()
            .find(|e| e.category.code == overall_code)
    }

    /// Per-category entries excluding the reserved overall category
    pub fn categories<'a>(
        &'a self,
        overall_code: &'a str,
    ) -> impl Iterator<Item = &'a TotalsEntry> {
        self.entries
            .iter()
            .filter(move |e| e.category.code != overall_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coding(code: &str) -> Coding {
        Coding::new("urn:example:bed-types", code)
    }

    #[test]
    fn test_group_population_lookup() {
        let mut group = ReportGroup::new(coding("CC"));
        group.add_population(Coding::new("urn:example:values", "numCCBedsOcc"), 3);

        assert_eq!(group.population("numCCBedsOcc").unwrap().count, 3);
        assert!(group.population("numCCBedsAvail").is_none());
    }

    #[test]
    fn test_failed_partial_result_is_empty() {
        let result = PartialResult::failed(
            PatientId::new("p3").unwrap(),
            "patient data missing",
        );
        assert!(result.is_failed());
        assert!(result.groups.is_empty());
        match &result.outcome {
            EvaluationOutcome::Failed { reason } => {
                assert!(reason.contains("missing"))
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_baseline_overall_split() {
        let baseline = TotalsBaseline {
            id: "totals-1".to_string(),
            entries: vec![
                TotalsEntry {
                    category: coding("CC"),
                    total: Population::new(coding("numTotCC"), 10),
                },
                TotalsEntry {
                    category: coding("Beds"),
                    total: Population::new(coding("numTotBeds"), 40),
                },
            ],
        };

        assert_eq!(baseline.overall("Beds").unwrap().total.count, 40);
        let categories: Vec<&str> = baseline
            .categories("Beds")
            .map(|e| e.category.code.as_str())
            .collect();
        assert_eq!(categories, vec!["CC"]);
    }

    #[test]
    fn test_aggregate_report_serialization_round_trip() {
        let report = AggregateReport {
            id: ReportId::new("abc123").unwrap(),
            status: ReportStatus::Complete,
            measure: "m1".to_string(),
            facility: FacilityId::new("loc-1").unwrap(),
            period: ReportPeriod::new(
                chrono::Utc::now(),
                chrono::Utc::now() + chrono::Duration::hours(1),
            )
            .unwrap(),
            version: ReportVersion::INITIAL,
            groups: vec![ReportGroup::new(coding("CC"))],
        };

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["version"], "0.1");
        assert_eq!(json["status"], "complete");

        let back: AggregateReport = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, report.id);
        assert_eq!(back.groups.len(), 1);
    }
}
