//! Report criteria and reporting period
//!
//! The criteria are the identity-defining input of a report run: two
//! invocations with identical criteria resolve to the same report unless
//! regeneration is requested explicitly.

use crate::domain::ids::{FacilityId, MeasureId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open-free reporting window; both endpoints are inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// Period start (inclusive)
    pub start: DateTime<Utc>,

    /// Period end (inclusive)
    pub end: DateTime<Utc>,
}

impl ReportPeriod {
    /// Creates a period, rejecting end-before-start
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, String> {
        if end < start {
            return Err(format!(
                "Period end {end} is before period start {start}"
            ));
        }
        Ok(Self { start, end })
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Immutable criteria for one report invocation
///
/// # Examples
///
/// ```
/// use beacon::domain::criteria::ReportCriteria;
/// use beacon::domain::ids::{FacilityId, MeasureId};
/// use chrono::{TimeZone, Utc};
///
/// let criteria = ReportCriteria::new(
///     FacilityId::new("loc-1").unwrap(),
///     MeasureId::new("bed-capacity").unwrap(),
///     Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap(),
/// ).unwrap();
/// assert_eq!(criteria.facility().as_str(), "loc-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCriteria {
    facility: FacilityId,
    measure: MeasureId,
    period: ReportPeriod,
}

impl ReportCriteria {
    /// Creates criteria, validating the period
    pub fn new(
        facility: FacilityId,
        measure: MeasureId,
        period_start: DateTime<Utc>,
        period_end: DateTime<Utc>,
    ) -> Result<Self, String> {
        let period = ReportPeriod::new(period_start, period_end)?;
        Ok(Self {
            facility,
            measure,
            period,
        })
    }

    /// The facility the report covers
    pub fn facility(&self) -> &FacilityId {
        &self.facility
    }

    /// The measure being reported
    pub fn measure(&self) -> &MeasureId {
        &self.measure
    }

    /// The reporting period
    pub fn period(&self) -> &ReportPeriod {
        &self.period
    }

    /// Canonical ordered components used to derive the report identity
    ///
    /// Ordering and formatting here are stable across releases; the report
    /// identity hash is computed over exactly this sequence.
    pub fn components(&self) -> Vec<String> {
        vec![
            self.facility.as_str().to_string(),
            self.measure.as_str().to_string(),
            self.period.start.to_rfc3339(),
            self.period.end.to_rfc3339(),
        ]
    }

    /// Human-readable summary recorded as the first job note
    pub fn annotation(&self) -> String {
        format!(
            "Report criteria: facility={}, measure={}, period={}",
            self.facility, self.measure, self.period
        )
    }
}

impl fmt::Display for ReportCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}@{}",
            self.facility, self.measure, self.period
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn criteria() -> ReportCriteria {
        ReportCriteria::new(
            FacilityId::new("loc-1").unwrap(),
            MeasureId::new("m1").unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_period_rejects_end_before_start() {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(ReportPeriod::new(start, end).is_err());
    }

    #[test]
    fn test_period_allows_point_in_time() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(ReportPeriod::new(at, at).is_ok());
    }

    #[test]
    fn test_components_are_stable() {
        let c = criteria();
        assert_eq!(c.components(), c.components());
        assert_eq!(
            c.components(),
            vec![
                "loc-1".to_string(),
                "m1".to_string(),
                "2024-01-01T00:00:00+00:00".to_string(),
                "2024-01-01T23:59:59+00:00".to_string(),
            ]
        );
    }

    #[test]
    fn test_annotation_mentions_all_fields() {
        let note = criteria().annotation();
        assert!(note.contains("loc-1"));
        assert!(note.contains("m1"));
        assert!(note.contains("2024-01-01"));
    }
}
