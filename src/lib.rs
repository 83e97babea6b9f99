// Beacon - Facility bed-capacity reporting engine
// Copyright (c) 2025 Beacon Contributors
// Licensed under the MIT License

//! # Beacon - Facility Bed-Capacity Reporting
//!
//! Beacon is a reporting engine built in Rust that evaluates per-patient
//! clinical data against a capacity measure, aggregates the results into a
//! facility-level bed tally report, and persists the report with
//! deterministic identity and versioning.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Resolving** the measure, facility, and patient worklist for a period
//! - **Evaluating** each patient in parallel with isolated failure handling
//! - **Aggregating** per-patient tallies against a facility totals baseline
//! - **Persisting** versioned reports with conflict detection, tracked as
//!   pollable jobs
//!
//! ## Architecture
//!
//! Beacon follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (pipeline, evaluate, aggregate, translate)
//! - [`adapters`] - External integrations (resource store, worklists, senders)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beacon::adapters::resolve::ReportStore;
//! use beacon::adapters::store::create_resource_store;
//! use beacon::config::load_config;
//! use beacon::core::pipeline::ReportPipeline;
//! use beacon::domain::{FacilityId, MeasureId, ReportCriteria};
//! use chrono::{TimeZone, Utc};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Load configuration
//!     let config = load_config("beacon.toml")?;
//!
//!     // Wire the store and pipeline
//!     let store = ReportStore::new(create_resource_store(&config.store)?);
//!     let pipeline = ReportPipeline::from_config(&config, store)?;
//!
//!     // Describe the report
//!     let criteria = ReportCriteria::new(
//!         FacilityId::new("loc-1")?,
//!         MeasureId::new("bed-availability")?,
//!         Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
//!         Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 59).unwrap(),
//!     )?;
//!
//!     // Generate the report
//!     let (_tx, shutdown) = tokio::sync::watch::channel(false);
//!     let summary = pipeline.generate(criteria, false, shutdown).await?;
//!
//!     println!("Report {} stored at version {}", summary.report_id, summary.version);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! ### Deterministic Report Identity
//!
//! The same criteria always resolve to the same report identifier, so a
//! repeated run either regenerates the existing report (when asked to) or
//! is rejected with a conflict:
//!
//! ```rust,no_run
//! use beacon::core::pipeline::identity;
//! use beacon::domain::{FacilityId, MeasureId, ReportCriteria};
//! use chrono::{TimeZone, Utc};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let criteria = ReportCriteria::new(
//!     FacilityId::new("loc-1")?,
//!     MeasureId::new("bed-availability")?,
//!     Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 59).unwrap(),
//! )?;
//!
//! let id = identity::master_report_id(&criteria)?;
//! assert_eq!(id, identity::master_report_id(&criteria)?);
//! # Ok(())
//! # }
//! ```
//!
//! ### Isolated Parallel Evaluation
//!
//! Patients are evaluated on a bounded worker pool; one patient's failure
//! is recorded on the job and yields an empty partial result instead of
//! aborting the batch.
//!
//! ### Job Tracking
//!
//! Every run is tracked as a job a caller can poll:
//!
//! ```rust,no_run
//! use beacon::domain::{Job, JobKind, JobStatus};
//!
//! let mut job = Job::new(JobKind::GenerateReport);
//! job.add_note("Worklist resolved: 42 patients");
//! job.finish(JobStatus::Completed).unwrap();
//!
//! // Terminal states accept no further transition
//! assert!(job.finish(JobStatus::Failed).is_err());
//! ```
//!
//! ## Error Handling
//!
//! Beacon uses the [`domain::BeaconError`] type for all errors, following
//! Rust best practices:
//!
//! ```rust,no_run
//! use beacon::domain::BeaconError;
//!
//! fn example() -> Result<(), BeaconError> {
//!     // Errors are automatically converted using the ? operator
//!     let config = beacon::config::load_config("beacon.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Beacon uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn, error};
//!
//! info!("Starting report generation");
//! warn!(category = "ICU", "No tally code mapped for category");
//! error!(error = "connection refused", "Store read failed");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
