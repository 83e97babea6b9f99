//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers that flow through the reporting
//! pipeline. Each type validates on construction so downstream code can
//! assume a well-formed value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Facility identifier newtype wrapper
///
/// Identifies the entity group (facility/location) a report is generated
/// for.
///
/// # Examples
///
/// ```
/// use beacon::domain::ids::FacilityId;
/// use std::str::FromStr;
///
/// let facility = FacilityId::from_str("loc-1").unwrap();
/// assert_eq!(facility.as_str(), "loc-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FacilityId(String);

impl FacilityId {
    /// Creates a new FacilityId from a string
    ///
    /// # Returns
    ///
    /// Returns `Ok(FacilityId)` if the ID is non-empty, `Err` otherwise
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Facility ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the facility ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for FacilityId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for FacilityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Measure identifier newtype wrapper
///
/// Identifies the measure definition a report run evaluates against.
///
/// # Examples
///
/// ```
/// use beacon::domain::ids::MeasureId;
/// use std::str::FromStr;
///
/// let measure = MeasureId::from_str("bed-capacity").unwrap();
/// assert_eq!(measure.as_str(), "bed-capacity");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeasureId(String);

impl MeasureId {
    /// Creates a new MeasureId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Measure ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the measure ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MeasureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MeasureId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for MeasureId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Patient identifier newtype wrapper
///
/// Worklist sources hand back patient references in `Patient/{id}` form;
/// [`PatientId::from_reference`] strips the resource-type prefix so the
/// pipeline works with the bare local identifier throughout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatientId(String);

impl PatientId {
    /// Creates a new PatientId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Patient ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Creates a PatientId from a resource reference such as `Patient/abc`
    ///
    /// A bare identifier without a type prefix is accepted as-is.
    pub fn from_reference(reference: &str) -> Result<Self, String> {
        let local = match reference.split_once('/') {
            Some((_, id)) => id,
            None => reference,
        };
        Self::new(local)
    }

    /// Returns the patient ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PatientId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for PatientId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Report identifier newtype wrapper
///
/// The master identifier of a generated report. Derived deterministically
/// from the report criteria (see the identity module), so the same criteria
/// always resolve to the same ReportId.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportId(String);

impl ReportId {
    /// Creates a new ReportId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Report ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the report ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ReportId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for ReportId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Job identifier newtype wrapper
///
/// Random per-invocation identifier for the job record a caller polls.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Creates a new JobId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Job ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Generates a fresh random JobId
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Returns the job ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes self and returns the inner String
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for JobId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facility_id_creation() {
        let id = FacilityId::new("loc-1").unwrap();
        assert_eq!(id.as_str(), "loc-1");
    }

    #[test]
    fn test_facility_id_empty_fails() {
        assert!(FacilityId::new("").is_err());
        assert!(FacilityId::new("   ").is_err());
    }

    #[test]
    fn test_facility_id_display() {
        let id = FacilityId::new("loc-1").unwrap();
        assert_eq!(format!("{}", id), "loc-1");
    }

    #[test]
    fn test_measure_id_from_str() {
        let id: MeasureId = "bed-capacity".parse().unwrap();
        assert_eq!(id.as_str(), "bed-capacity");
    }

    #[test]
    fn test_patient_id_from_reference_strips_prefix() {
        let id = PatientId::from_reference("Patient/abc-123").unwrap();
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn test_patient_id_from_reference_bare() {
        let id = PatientId::from_reference("abc-123").unwrap();
        assert_eq!(id.as_str(), "abc-123");
    }

    #[test]
    fn test_patient_id_from_reference_empty_local_part_fails() {
        assert!(PatientId::from_reference("Patient/").is_err());
        assert!(PatientId::from_reference("").is_err());
    }

    #[test]
    fn test_job_id_generate_unique() {
        let a = JobId::generate();
        let b = JobId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_report_id_serialization() {
        let id = ReportId::new("a1b2c3d4e5f60718").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: ReportId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }
}
