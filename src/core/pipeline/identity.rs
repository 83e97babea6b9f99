//! Deterministic report identity
//!
//! A report's master id is derived from its criteria, never minted, so
//! repeated generation requests for the same facility, measure, and period
//! land on the same documents. Conflict detection is a manifest lookup
//! under that derived id.

use crate::adapters::resolve::ReportStore;
use crate::domain::{BeaconError, PatientId, ReportCriteria, ReportId, ReportManifest, Result};
use sha2::{Digest, Sha256};

/// Message returned when generation would overwrite an existing report
pub const REPORT_EXISTS: &str = "A report has already been generated for the specified measure and reporting period. To regenerate the report, submit the request with regenerate enabled.";

const ID_DIGEST_LEN: usize = 16;

/// Derives the master report id from the report criteria
///
/// The id is a truncated hex SHA-256 digest over the criteria components,
/// so identical criteria always derive the identical id.
pub fn master_report_id(criteria: &ReportCriteria) -> Result<ReportId> {
    let digest = digest_hex(&criteria.components().join("\n"));
    ReportId::new(&digest[..ID_DIGEST_LEN]).map_err(BeaconError::Validation)
}

/// Document id for one patient's partial result under a master report
pub fn patient_result_id(master: &ReportId, patient: &PatientId) -> String {
    let digest = digest_hex(patient.as_str());
    format!("{}-{}", master, &digest[..ID_DIGEST_LEN])
}

fn digest_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

/// Looks up prior generations of the report and checks regeneration intent
///
/// Returns the existing manifest when regeneration was requested, or `None`
/// when the report has never been generated.
///
/// # Errors
///
/// Returns [`BeaconError::Conflict`] when a manifest exists and `regenerate`
/// was not requested. Store failures propagate as-is.
pub async fn existing_manifest(
    store: &ReportStore,
    id: &ReportId,
    regenerate: bool,
) -> Result<Option<ReportManifest>> {
    match store.manifest(id).await? {
        Some(manifest) if regenerate => Ok(Some(manifest)),
        Some(_) => Err(BeaconError::Conflict(REPORT_EXISTS.to_string())),
        None => Ok(None),
    }
}
