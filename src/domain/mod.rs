//! Domain models and types for Beacon.
//!
//! This module contains the core domain models, types, and business rules
//! for the reporting pipeline: type-safe identifiers, coded values, the job
//! state machine, report criteria and output shapes, and the error
//! hierarchy.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`FacilityId`], [`MeasureId`],
//!   [`PatientId`], [`ReportId`], [`JobId`])
//! - **Coded values and tally keys** ([`Coding`], [`TallyRole`],
//!   [`BedTallyKey`])
//! - **Run inputs** ([`ReportCriteria`], [`MeasureDefinition`],
//!   [`Facility`], [`CensusList`], [`PatientData`], [`BedRegistry`],
//!   [`TotalsBaseline`])
//! - **Run outputs** ([`PartialResult`], [`AggregateReport`],
//!   [`ReportManifest`], [`ReportVersion`])
//! - **The job record** ([`Job`], [`JobStatus`], [`JobKind`])
//! - **Error types** ([`BeaconError`], [`StoreError`]) and the [`Result`]
//!   alias
//!
//! # Type Safety
//!
//! Beacon uses the newtype pattern for identifiers to prevent mixing
//! different ID types:
//!
//! ```rust
//! use beacon::domain::{FacilityId, MeasureId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let facility = FacilityId::new("loc-1")?;
//! let measure = MeasureId::new("bed-capacity")?;
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: FacilityId = measure;  // Compile error!
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, BeaconError>`]:
//!
//! ```rust,no_run
//! use beacon::domain::Result;
//!
//! fn example() -> Result<()> {
//!     // Errors are automatically converted using the ? operator
//!     let config = beacon::config::load_config("beacon.toml")?;
//!     Ok(())
//! }
//! ```

pub mod codes;
pub mod criteria;
pub mod errors;
pub mod ids;
pub mod job;
pub mod manifest;
pub mod measure;
pub mod report;
pub mod result;
pub mod translation;

// Re-export commonly used types for convenience
pub use codes::{BedTallyKey, Coding, TallyRole};
pub use criteria::{ReportCriteria, ReportPeriod};
pub use errors::{BeaconError, HookError, StoreError};
pub use ids::{FacilityId, JobId, MeasureId, PatientId, ReportId};
pub use job::{Job, JobKind, JobNote, JobStatus};
pub use manifest::{DocumentStatus, ReportManifest, ReportVersion};
pub use measure::{
    BedRegistry, BedRegistryEntry, BedStay, CensusEntry, CensusList, Facility, Geolocation,
    MeasureDefinition, PatientData, PatientOfInterest,
};
pub use report::{
    AggregateReport, EvaluationOutcome, PartialResult, Population, ReportGroup, ReportStatus,
    TotalsBaseline, TotalsEntry,
};
pub use result::Result;
pub use translation::{CodeSystem, CodeSystemConcept, ConceptMap, ConceptMapElement, ConceptMapGroup};
