//! Core business logic for Beacon.
//!
//! This module contains the report generation logic and orchestration.
//!
//! # Modules
//!
//! - [`translate`] - Code translation via cached concept map and code system tables
//! - [`evaluate`] - Per-patient evaluation with bounded parallelism
//! - [`aggregate`] - Tally aggregation against the facility totals baseline
//! - [`pipeline`] - Orchestration, report identity, job tracking, and event hooks
//!
//! # Generation Workflow
//!
//! The typical generation workflow:
//!
//! 1. **Identity**: Derive the deterministic report id and detect conflicts
//! 2. **Resolve**: Load the measure, facility, and totals baseline
//! 3. **Worklist**: Collect the patients of interest from census lists
//! 4. **Evaluate**: Produce one partial result per patient, failures isolated
//! 5. **Aggregate**: Merge tallies, zero-fill, and derive available counts
//! 6. **Persist**: Store the report and its manifest in one transaction
//! 7. **Track**: Record progress and losses as job notes throughout
//!
//! # Example
//!
//! ```rust,no_run
//! use beacon::adapters::resolve::ReportStore;
//! use beacon::adapters::store::create_resource_store;
//! use beacon::config::load_config;
//! use beacon::core::pipeline::ReportPipeline;
//! use beacon::domain::{FacilityId, MeasureId, ReportCriteria};
//! use chrono::{TimeZone, Utc};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration and build the pipeline
//! let config = load_config("beacon.toml")?;
//! let store = ReportStore::new(create_resource_store(&config.store)?);
//! let pipeline = ReportPipeline::from_config(&config, store)?;
//!
//! let criteria = ReportCriteria::new(
//!     FacilityId::new("loc-1")?,
//!     MeasureId::new("bed-availability")?,
//!     Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
//!     Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 59).unwrap(),
//! )?;
//!
//! // Create shutdown signal
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!
//! // Generate the report
//! let summary = pipeline.generate(criteria, false, shutdown_rx).await?;
//!
//! println!("Report: {} v{}", summary.report_id, summary.version);
//! println!("Evaluated: {} of {}", summary.succeeded, summary.attempted);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod evaluate;
pub mod pipeline;
pub mod translate;
