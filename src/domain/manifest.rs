//! Report manifest and version marker
//!
//! The manifest is the artifact wrapper persisted next to each aggregate
//! report: it carries the version marker, the document status, and the
//! provenance a regeneration or publish needs. Conflict detection operates
//! on the manifest, never on the report body.

use crate::domain::criteria::ReportPeriod;
use crate::domain::ids::{FacilityId, MeasureId, ReportId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Two-part report version, rendered as `major.minor`
///
/// A fresh report starts at 0.1. Edits and regenerations bump the minor
/// part; only the explicit publish/send transition bumps the major part.
/// Versions never decrement.
///
/// # Examples
///
/// ```
/// use beacon::domain::manifest::ReportVersion;
///
/// let v = ReportVersion::INITIAL;
/// assert_eq!(v.to_string(), "0.1");
/// assert_eq!(v.bump_minor().to_string(), "0.2");
/// assert_eq!(v.bump_major().to_string(), "1.0");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReportVersion {
    /// Publish generation
    pub major: u32,

    /// Edit/regeneration counter within a generation
    pub minor: u32,
}

impl ReportVersion {
    /// Version assigned to a freshly generated report
    pub const INITIAL: ReportVersion = ReportVersion { major: 0, minor: 1 };

    /// Next minor version (content edit or regeneration)
    pub fn bump_minor(self) -> Self {
        Self {
            major: self.major,
            minor: self.minor + 1,
        }
    }

    /// Next major version (publish/send), resetting minor
    pub fn bump_major(self) -> Self {
        Self {
            major: self.major + 1,
            minor: 0,
        }
    }

    /// True once the report has been published at least once
    pub fn is_published(&self) -> bool {
        self.major >= 1
    }
}

impl fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ReportVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| format!("Invalid version '{s}', expected 'major.minor'"))?;
        let major = major
            .parse::<u32>()
            .map_err(|e| format!("Invalid major version in '{s}': {e}"))?;
        let minor = minor
            .parse::<u32>()
            .map_err(|e| format!("Invalid minor version in '{s}': {e}"))?;
        Ok(Self { major, minor })
    }
}

// Persisted as the "major.minor" string callers already know
impl Serialize for ReportVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ReportVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Lifecycle status of the persisted artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Generated but not yet published
    Preliminary,
    /// Published through a sender at least once
    Final,
}

/// Artifact wrapper persisted with each aggregate report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportManifest {
    /// Master report identifier (also the manifest's own document id)
    pub master_id: ReportId,

    /// Measure the report was generated for
    pub measure: MeasureId,

    /// Facility the report covers
    pub facility: FacilityId,

    /// Reporting period
    pub period: ReportPeriod,

    /// Document status
    pub status: DocumentStatus,

    /// Version marker
    pub version: ReportVersion,

    /// Census list ids consumed by the generating run
    #[serde(default)]
    pub census_lists: Vec<String>,

    /// When the manifest was first created
    pub created_at: DateTime<Utc>,

    /// When the manifest last changed
    pub updated_at: DateTime<Utc>,

    /// When the report was last submitted, if ever
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,

    /// Location string returned by the sender on the last submission
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_location: Option<String>,
}

impl ReportManifest {
    /// Creates a Preliminary manifest at the initial version
    pub fn new(
        master_id: ReportId,
        measure: MeasureId,
        facility: FacilityId,
        period: ReportPeriod,
        census_lists: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            master_id,
            measure,
            facility,
            period,
            status: DocumentStatus::Preliminary,
            version: ReportVersion::INITIAL,
            census_lists,
            created_at: now,
            updated_at: now,
            submitted_at: None,
            submitted_location: None,
        }
    }

    /// Records a regeneration: minor version bump, fresh census provenance
    pub fn mark_regenerated(&mut self, census_lists: Vec<String>) {
        self.version = self.version.bump_minor();
        self.census_lists = census_lists;
        self.updated_at = Utc::now();
    }

    /// Records a publish: Final status, major version bump, sender location
    pub fn mark_submitted(&mut self, location: Option<String>) {
        let now = Utc::now();
        self.status = DocumentStatus::Final;
        self.version = self.version.bump_major();
        self.submitted_at = Some(now);
        self.submitted_location = location;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use test_case::test_case;

    fn manifest() -> ReportManifest {
        ReportManifest::new(
            ReportId::new("abc123").unwrap(),
            MeasureId::new("m1").unwrap(),
            FacilityId::new("loc-1").unwrap(),
            ReportPeriod::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap(),
            )
            .unwrap(),
            vec!["census-1".to_string()],
        )
    }

    #[test]
    fn test_initial_version_renders_as_zero_one() {
        assert_eq!(ReportVersion::INITIAL.to_string(), "0.1");
        assert!(!ReportVersion::INITIAL.is_published());
    }

    #[test_case("0.1", 0, 1; "initial")]
    #[test_case("1.0", 1, 0; "first published")]
    #[test_case("3.12", 3, 12; "double digit minor")]
    fn test_version_parses(s: &str, major: u32, minor: u32) {
        let v: ReportVersion = s.parse().unwrap();
        assert_eq!(v, ReportVersion { major, minor });
    }

    #[test]
    fn test_version_parse_rejects_garbage() {
        assert!("1".parse::<ReportVersion>().is_err());
        assert!("a.b".parse::<ReportVersion>().is_err());
        assert!("".parse::<ReportVersion>().is_err());
    }

    #[test]
    fn test_version_ordering_never_decrements() {
        let v = ReportVersion::INITIAL;
        assert!(v.bump_minor() > v);
        assert!(v.bump_major() > v.bump_minor());
    }

    #[test]
    fn test_version_serializes_as_string() {
        let json = serde_json::to_string(&ReportVersion { major: 1, minor: 2 }).unwrap();
        assert_eq!(json, "\"1.2\"");
        let back: ReportVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ReportVersion { major: 1, minor: 2 });
    }

    #[test]
    fn test_new_manifest_is_preliminary_initial() {
        let m = manifest();
        assert_eq!(m.status, DocumentStatus::Preliminary);
        assert_eq!(m.version, ReportVersion::INITIAL);
        assert!(m.submitted_at.is_none());
    }

    #[test]
    fn test_regeneration_bumps_minor_and_replaces_census() {
        let mut m = manifest();
        m.mark_regenerated(vec!["census-2".to_string()]);

        assert_eq!(m.version.to_string(), "0.2");
        assert_eq!(m.census_lists, vec!["census-2".to_string()]);
        assert_eq!(m.status, DocumentStatus::Preliminary);
    }

    #[test]
    fn test_submission_bumps_major_and_finalizes() {
        let mut m = manifest();
        m.mark_regenerated(vec!["census-2".to_string()]);
        m.mark_submitted(Some("inbox/report-1".to_string()));

        assert_eq!(m.status, DocumentStatus::Final);
        assert_eq!(m.version.to_string(), "1.0");
        assert!(m.version.is_published());
        assert_eq!(m.submitted_location.as_deref(), Some("inbox/report-1"));
        assert!(m.submitted_at.is_some());
    }

    #[test]
    fn test_resubmission_bumps_major_again() {
        let mut m = manifest();
        m.mark_submitted(None);
        m.mark_submitted(Some("inbox/report-1".to_string()));
        assert_eq!(m.version.to_string(), "2.0");
    }
}
