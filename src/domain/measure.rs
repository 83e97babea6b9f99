//! Input resource models for a report run
//!
//! These are the resources the pipeline reads: the measure definition, the
//! facility (entity group), census lists of patients of interest, per-patient
//! bed-stay data, and the facility bed registry that maps units to tally
//! categories. Shapes are conceptual JSON documents, not a byte-exact wire
//! format.

use crate::domain::criteria::ReportPeriod;
use crate::domain::ids::{FacilityId, MeasureId, PatientId};
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Measure definition resolved for a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureDefinition {
    /// Measure identifier
    pub id: MeasureId,

    /// Canonical URL, when the measure publishes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Human-readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Resource types the measure wants queried for each patient
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_requirements: Vec<String>,
}

impl MeasureDefinition {
    /// Reference string recorded on generated reports
    ///
    /// Prefers the canonical URL when present, otherwise the id.
    pub fn reference(&self) -> String {
        self.url
            .clone()
            .unwrap_or_else(|| self.id.as_str().to_string())
    }
}

/// Geographic position of a facility
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geolocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Facility (entity group) metadata
///
/// Downstream consumers require a geographic position on every reported
/// facility, so resolution fails loudly when it is absent rather than
/// producing a report that will be rejected later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    /// Facility identifier
    pub id: FacilityId,

    /// Facility name
    pub name: String,

    /// Geographic position; mandatory for reporting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Geolocation>,
}

impl Facility {
    /// Returns the geolocation or an error naming the missing field
    pub fn geolocation(&self) -> Result<Geolocation, String> {
        self.position.ok_or_else(|| {
            format!(
                "Facility {} has no geolocation; latitude/longitude are required",
                self.id
            )
        })
    }
}

/// One entry of a census list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CensusEntry {
    /// Patient reference, e.g. `Patient/abc`
    pub reference: String,
}

/// Precomputed census of patients present at a facility during a period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CensusList {
    /// Census list identifier
    pub id: String,

    /// Facility the census covers
    pub facility: FacilityId,

    /// Period the census covers
    pub period: ReportPeriod,

    /// Patient entries
    #[serde(default)]
    pub entries: Vec<CensusEntry>,
}

/// A patient selected for evaluation
///
/// Carries the raw reference from the worklist source plus the resolved
/// local identifier, if the reference yielded one. Entries without a
/// resolvable identifier are skipped (and recorded) by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientOfInterest {
    /// Reference as found in the worklist source
    pub reference: String,

    /// Resolved local patient id, when the reference yields one
    pub id: Option<PatientId>,
}

impl PatientOfInterest {
    /// Builds an entry from a raw reference, resolving the local id
    pub fn from_reference(reference: impl Into<String>) -> Self {
        let reference = reference.into();
        let id = PatientId::from_reference(&reference).ok();
        Self { reference, id }
    }
}

/// One bed stay inside a patient's data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedStay {
    /// Unit code or label, matched against the bed registry
    #[serde(default)]
    pub unit: String,

    /// Stay start, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<DateTime<Utc>>,

    /// Stay end, if known (open-ended stays omit it)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<DateTime<Utc>>,
}

impl BedStay {
    /// True when the stay occupies a bed for the whole reporting window
    ///
    /// A stay with no recorded start and no recorded end is never counted.
    /// Otherwise a missing start means "began before the window" and a
    /// missing end means "still ongoing", both of which satisfy coverage.
    pub fn covers(&self, period: &ReportPeriod) -> bool {
        if self.start.is_none() && self.end.is_none() {
            return false;
        }
        let starts_in_time = match self.start {
            Some(start) => start <= period.start,
            None => true,
        };
        let ends_in_time = match self.end {
            Some(end) => end >= period.end,
            None => true,
        };
        starts_in_time && ends_in_time
    }
}

/// Per-patient data prepared for evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientData {
    /// Document identifier
    pub id: String,

    /// Patient the data belongs to
    pub patient: PatientId,

    /// Bed stays observed for the patient
    #[serde(default)]
    pub stays: Vec<BedStay>,
}

/// One row of the facility bed registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BedRegistryEntry {
    /// Unit label, e.g. "ICU West"
    pub unit: String,

    /// Unit code, e.g. "icu-w"
    pub code: String,

    /// Tally category source code this unit's beds count toward
    pub category: String,
}

/// Facility bed inventory mapping units to tally categories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedRegistry {
    /// Registry document identifier
    pub id: String,

    /// Registry rows
    #[serde(default)]
    pub entries: Vec<BedRegistryEntry>,
}

impl BedRegistry {
    /// Finds the registry row for a stay's unit
    ///
    /// Unit codes are checked before unit labels, so a label that happens
    /// to collide with another row's code resolves to the code match.
    pub fn find(&self, unit: &str) -> Option<&BedRegistryEntry> {
        self.entries
            .iter()
            .find(|e| e.code == unit)
            .or_else(|| self.entries.iter().find(|e| e.unit == unit))
    }
}
