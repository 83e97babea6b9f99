//! Generate command implementation
//!
//! This module implements the `generate` command that runs the report
//! pipeline for one facility, measure, and period.

use crate::adapters::resolve::ReportStore;
use crate::adapters::store::create_resource_store;
use crate::config::load_config;
use crate::core::pipeline::ReportPipeline;
use crate::domain::{FacilityId, MeasureId, ReportCriteria};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Args;
use tokio::sync::watch;

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Facility (entity group) the report covers
    #[arg(long)]
    pub facility: String,

    /// Measure to evaluate
    #[arg(long)]
    pub measure: String,

    /// Period start (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub start: String,

    /// Period end (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub end: String,

    /// Regenerate an existing report for the same criteria
    #[arg(long)]
    pub regenerate: bool,

    /// Dry run mode - evaluate and aggregate without persisting
    #[arg(long)]
    pub dry_run: bool,
}

impl GenerateArgs {
    /// Execute the generate command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting generate command");

        // Load configuration
        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Apply dry-run flag from CLI
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        // Validate configuration
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        // Build criteria from the CLI arguments
        let criteria = match self.criteria() {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Invalid report criteria: {e}");
                return Ok(2);
            }
        };

        if config.application.dry_run {
            tracing::info!("Dry run mode enabled - report will not be persisted");
            println!("🔍 DRY RUN MODE - Report and manifest will not be persisted");
            println!();
        }

        // Wire the store and pipeline
        let store = match create_resource_store(&config.store) {
            Ok(s) => ReportStore::new(s),
            Err(e) => {
                tracing::error!(error = %e, "Failed to create resource store");
                eprintln!("Failed to connect to resource store: {e}");
                return Ok(4); // Connection error exit code
            }
        };
        let pipeline = match ReportPipeline::from_config(&config, store) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build report pipeline");
                eprintln!("Failed to build report pipeline: {e}");
                return Ok(2);
            }
        };

        println!("🚀 Generating report...");
        println!("  Facility: {}", criteria.facility());
        println!("  Measure: {}", criteria.measure());
        println!("  Period: {}", criteria.period());
        println!();

        let interrupted = shutdown_signal.clone();
        let summary = match pipeline
            .generate(criteria, self.regenerate, shutdown_signal)
            .await
        {
            Ok(s) => s,
            Err(e) if e.is_conflict() => {
                tracing::warn!(error = %e, "Report already exists");
                eprintln!("Report already exists for these criteria: {e}");
                eprintln!("Use --regenerate to replace it.");
                return Ok(4); // Non-retryable rejection exit code
            }
            Err(e) => {
                if *interrupted.borrow() {
                    tracing::info!("Generation interrupted by user signal");
                    println!();
                    println!("⚠️  Generation interrupted. The job record holds the detail.");
                    return Ok(130); // SIGINT exit code
                }
                tracing::error!(error = %e, "Report generation failed");
                eprintln!("Report generation failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        // Display summary
        println!();
        println!("📊 Generation Summary:");
        println!("  Job: {}", summary.job_id);
        println!("  Report: {} (version {})", summary.report_id, summary.version);
        if summary.regenerated {
            println!("  Regenerated: yes");
        }
        println!("  Patients attempted: {}", summary.attempted);
        println!("  Succeeded: {}", summary.succeeded);
        println!("  Failed: {}", summary.failed);
        println!("  Skipped: {}", summary.skipped);
        println!("  Report groups: {}", summary.groups);
        println!();

        let exit_code = if summary.dry_run {
            println!("✅ Dry run completed. Nothing was persisted.");
            0
        } else if summary.failed > 0 || summary.skipped > 0 {
            println!("⚠️  Report generated with losses; see the job notes.");
            1 // Partial success
        } else {
            println!("✅ Report generated successfully!");
            0
        };

        Ok(exit_code)
    }

    fn criteria(&self) -> Result<ReportCriteria, String> {
        let facility = FacilityId::new(self.facility.trim())?;
        let measure = MeasureId::new(self.measure.trim())?;
        let start = parse_period_bound(&self.start, false)?;
        let end = parse_period_bound(&self.end, true)?;
        ReportCriteria::new(facility, measure, start, end)
    }
}

/// Parses a period bound as RFC 3339, or as a bare date expanded to the
/// start or end of that day in UTC
fn parse_period_bound(value: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
    let value = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Ok(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("'{value}' is not a date (YYYY-MM-DD) or an RFC 3339 timestamp"))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };
    Ok(DateTime::from_naive_utc_and_offset(
        time.ok_or_else(|| format!("'{value}' is out of range"))?,
        Utc,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn args(start: &str, end: &str) -> GenerateArgs {
        GenerateArgs {
            facility: "loc-1".to_string(),
            measure: "bed-availability".to_string(),
            start: start.to_string(),
            end: end.to_string(),
            regenerate: false,
            dry_run: false,
        }
    }

    #[test]
    fn test_bare_date_expands_to_full_day() {
        let criteria = args("2024-01-10", "2024-01-10").criteria().unwrap();
        assert_eq!(criteria.period().start.hour(), 0);
        assert_eq!(criteria.period().end.hour(), 23);
        assert_eq!(criteria.period().end.second(), 59);
    }

    #[test]
    fn test_rfc3339_bounds_are_kept_exact() {
        let criteria = args("2024-01-10T06:00:00Z", "2024-01-10T18:00:00Z")
            .criteria()
            .unwrap();
        assert_eq!(criteria.period().start.hour(), 6);
        assert_eq!(criteria.period().end.hour(), 18);
    }

    #[test]
    fn test_invalid_date_is_rejected() {
        let err = args("January 10", "2024-01-10").criteria().unwrap_err();
        assert!(err.contains("not a date"));
    }

    #[test]
    fn test_inverted_period_is_rejected() {
        assert!(args("2024-01-11", "2024-01-10").criteria().is_err());
    }
}
