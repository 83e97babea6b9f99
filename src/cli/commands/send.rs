//! Send command implementation
//!
//! This module implements the `send` command that submits a stored report
//! to the configured destination and records the publish on its manifest.

use crate::adapters::resolve::ReportStore;
use crate::adapters::store::create_resource_store;
use crate::config::load_config;
use crate::core::pipeline::ReportPipeline;
use crate::domain::ReportId;
use clap::Args;

/// Arguments for the send command
#[derive(Args, Debug)]
pub struct SendArgs {
    /// Identifier of the stored report to submit
    pub report_id: String,

    /// Dry run mode - resolve the report without submitting it
    #[arg(long)]
    pub dry_run: bool,
}

impl SendArgs {
    /// Execute the send command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(report_id = %self.report_id, "Starting send command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let report_id = match ReportId::new(self.report_id.trim()) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Invalid report id: {e}");
                return Ok(2);
            }
        };

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

        println!("🚀 Submitting report {report_id}...");
        println!();

        let summary = match pipeline.send(&report_id).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Report submission failed");
                eprintln!("Report submission failed: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        println!("📊 Submission Summary:");
        println!("  Job: {}", summary.job_id);
        println!("  Report: {} (version {})", summary.report_id, summary.version);
        match &summary.location {
            Some(location) => println!("  Delivered to: {location}"),
            None => println!("  Delivered to: (dry run, not submitted)"),
        }
        println!();

        if summary.dry_run {
            println!("✅ Dry run completed. Nothing was submitted.");
        } else {
            println!("✅ Report submitted successfully!");
        }
        Ok(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_args_shape() {
        let args = SendArgs {
            report_id: "5f3a9c01d2e4b876".to_string(),
            dry_run: false,
        };
        assert_eq!(args.report_id, "5f3a9c01d2e4b876");
        assert!(!args.dry_run);
    }
}
