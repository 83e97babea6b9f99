//! Resource store abstraction
//!
//! This module defines the trait that storage backends must implement to
//! work with Beacon. Documents are stored as JSON values addressed by
//! (kind, id); the typed view over them lives in
//! [`resolve`](crate::adapters::resolve).

use crate::domain::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of documents the pipeline reads and persists
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Reporting facility with identity and geolocation
    Facility,
    /// Measure definition the pipeline evaluates
    Measure,
    /// Code translation map
    ConceptMap,
    /// Category code system
    CodeSystem,
    /// Unit-to-category bed registry
    BedRegistry,
    /// Patient census list for a facility and period
    CensusList,
    /// Per-patient source data (bed stays)
    PatientData,
    /// Per-patient evaluation result kept for audit
    PatientReport,
    /// Aggregated facility report
    AggregateReport,
    /// Facility totals baseline
    TotalsBaseline,
    /// Report manifest carrying version and status
    ReportManifest,
    /// Pipeline job record
    Job,
}

impl ResourceKind {
    /// Returns the kind as its wire/path segment
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Facility => "facility",
            ResourceKind::Measure => "measure",
            ResourceKind::ConceptMap => "concept-map",
            ResourceKind::CodeSystem => "code-system",
            ResourceKind::BedRegistry => "bed-registry",
            ResourceKind::CensusList => "census-list",
            ResourceKind::PatientData => "patient-data",
            ResourceKind::PatientReport => "patient-report",
            ResourceKind::AggregateReport => "aggregate-report",
            ResourceKind::TotalsBaseline => "totals-baseline",
            ResourceKind::ReportManifest => "report-manifest",
            ResourceKind::Job => "job",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filter for document queries
///
/// Matching semantics, shared by every backend:
/// - each `field` constraint matches documents whose top-level string field
///   equals the given value;
/// - `overlapping` matches documents carrying a `period` object whose
///   `[start, end]` range intersects the window. Documents without a
///   parseable period never match a window constraint.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    field_equals: Vec<(String, String)>,
    window: Option<(DateTime<Utc>, DateTime<Utc>)>,
}

impl QueryFilter {
    /// Creates an empty filter matching every document of the kind
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a top-level string field equality constraint
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.field_equals.push((name.into(), value.into()));
        self
    }

    /// Constrains matches to documents whose period intersects the window
    pub fn overlapping(mut self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        self.window = Some((start, end));
        self
    }

    /// The field equality constraints
    pub fn fields(&self) -> &[(String, String)] {
        &self.field_equals
    }

    /// The period window constraint, if any
    pub fn window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        self.window
    }

    /// Applies the filter to a document
    pub fn matches(&self, document: &serde_json::Value) -> bool {
        for (name, value) in &self.field_equals {
            if document.get(name).and_then(|v| v.as_str()) != Some(value.as_str()) {
                return false;
            }
        }

        if let Some((window_start, window_end)) = self.window {
            let period = match document.get("period") {
                Some(p) => p,
                None => return false,
            };
            let start = period
                .get("start")
                .and_then(|v| v.as_str())
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc));
            let end = period
                .get("end")
                .and_then(|v| v.as_str())
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|t| t.with_timezone(&Utc));
            match (start, end) {
                (Some(start), Some(end)) => {
                    if start > window_end || end < window_start {
                        return false;
                    }
                }
                _ => return false,
            }
        }

        true
    }
}

/// One operation inside a transactional batch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum StoreOp {
    /// Create or replace a document
    Put {
        kind: ResourceKind,
        id: String,
        document: serde_json::Value,
    },
    /// Create a document; the whole batch fails with
    /// [`StoreError::DocumentExists`](crate::domain::StoreError::DocumentExists)
    /// when the id is already taken
    Create {
        kind: ResourceKind,
        id: String,
        document: serde_json::Value,
    },
    /// Remove a document (absent documents are not an error)
    Delete { kind: ResourceKind, id: String },
}

/// Resource store trait
///
/// All implementations share the same read semantics: `read` returns
/// `Ok(None)` for a document that is absent or was deleted, and errors only
/// for store-level failures. Higher layers decide whether absence is fatal.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Reads a document
    ///
    /// # Errors
    ///
    /// Returns an error only for store-level failures; absence is `Ok(None)`.
    async fn read(&self, kind: ResourceKind, id: &str) -> Result<Option<serde_json::Value>>;

    /// Creates or replaces a document
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn write(&self, kind: ResourceKind, id: &str, document: &serde_json::Value)
        -> Result<()>;

    /// Removes a document; removing an absent document is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<()>;

    /// Returns all documents of a kind matching the filter
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    async fn query(&self, kind: ResourceKind, filter: &QueryFilter)
        -> Result<Vec<serde_json::Value>>;

    /// Applies a batch of operations atomically
    ///
    /// # Errors
    ///
    /// Returns an error if any operation fails; no operation is applied in
    /// that case.
    async fn transaction(&self, operations: Vec<StoreOp>) -> Result<()>;

    /// Tests connectivity to the store
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    async fn test_connection(&self) -> Result<()>;

    /// Name of the backend for log output
    fn backend_name(&self) -> &str;
}
