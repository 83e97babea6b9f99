//! Status command implementation
//!
//! This module implements the `status` command for displaying job records
//! with their progress notes, and report manifests.

use crate::adapters::resolve::ReportStore;
use crate::adapters::store::{create_resource_store, QueryFilter, ResourceKind};
use crate::config::load_config;
use crate::domain::{DocumentStatus, Job, JobId, JobStatus, ReportId};
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show one job in full, including its notes
    #[arg(long, conflicts_with = "report_id")]
    pub job_id: Option<String>,

    /// Show the manifest of one report
    #[arg(long)]
    pub report_id: Option<String>,

    /// Only show failed jobs
    #[arg(long)]
    pub failed: bool,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking job status");

        println!("📊 Job Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        let store = match create_resource_store(&config.store) {
            Ok(s) => ReportStore::new(s),
            Err(e) => {
                println!("❌ Failed to connect to resource store");
                println!("   Error: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        if let Some(raw_id) = &self.job_id {
            return self.show_one(&store, raw_id).await;
        }
        if let Some(raw_id) = &self.report_id {
            return self.show_manifest(&store, raw_id).await;
        }

        let documents = match store
            .inner()
            .query(ResourceKind::Job, &QueryFilter::new())
            .await
        {
            Ok(d) => d,
            Err(e) => {
                println!("❌ Failed to query jobs");
                println!("   Error: {e}");
                return Ok(5); // Fatal error exit code
            }
        };

        let mut jobs: Vec<Job> = documents
            .into_iter()
            .filter_map(|doc| serde_json::from_value(doc).ok())
            .filter(|job: &Job| !self.failed || job.is_failed())
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if jobs.is_empty() {
            println!("No jobs found.");
            println!("Run 'beacon generate' to start a report run.");
            return Ok(0);
        }

        println!("Found {} job(s):", jobs.len());
        println!();
        println!(
            "{:<38} {:<18} {:<16} {:<7} {:<20}",
            "Job ID", "Kind", "Status", "Notes", "Last Update"
        );
        println!("{}", "-".repeat(100));

        for job in &jobs {
            println!(
                "{:<38} {:<18} {:<16} {:<7} {:<20}",
                job.id.as_str(),
                job.kind.to_string(),
                status_marker(job.status),
                job.notes.len(),
                job.last_updated.format("%Y-%m-%d %H:%M:%S")
            );
        }

        println!();
        Ok(0)
    }

    async fn show_one(&self, store: &ReportStore, raw_id: &str) -> anyhow::Result<i32> {
        let id = match JobId::new(raw_id) {
            Ok(id) => id,
            Err(e) => {
                println!("❌ Invalid job id: {e}");
                return Ok(2);
            }
        };

        let job = match store.job(&id).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                println!("No job found with id {id}.");
                return Ok(1);
            }
            Err(e) => {
                println!("❌ Failed to load job");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        println!("Job {}", job.id);
        println!("  Kind: {}", job.kind);
        println!("  Status: {}", status_marker(job.status));
        println!("  Created: {}", job.created_at.format("%Y-%m-%d %H:%M:%S"));
        println!("  Updated: {}", job.last_updated.format("%Y-%m-%d %H:%M:%S"));
        println!();

        if job.notes.is_empty() {
            println!("  (no notes)");
        } else {
            println!("  Notes:");
            for note in &job.notes {
                println!("    [{}] {}", note.at.format("%H:%M:%S"), note.text);
            }
        }

        println!();
        Ok(0)
    }

    async fn show_manifest(&self, store: &ReportStore, raw_id: &str) -> anyhow::Result<i32> {
        let id = match ReportId::new(raw_id) {
            Ok(id) => id,
            Err(e) => {
                println!("❌ Invalid report id: {e}");
                return Ok(2);
            }
        };

        let manifest = match store.manifest(&id).await {
            Ok(Some(manifest)) => manifest,
            Ok(None) => {
                println!("No report found with id {id}.");
                return Ok(1);
            }
            Err(e) => {
                println!("❌ Failed to load report manifest");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        println!("Report {}", manifest.master_id);
        println!("  Measure: {}", manifest.measure);
        println!("  Facility: {}", manifest.facility);
        println!(
            "  Period: {} .. {}",
            manifest.period.start.format("%Y-%m-%d %H:%M:%S"),
            manifest.period.end.format("%Y-%m-%d %H:%M:%S")
        );
        println!("  Status: {}", document_status_marker(manifest.status));
        println!("  Version: {}", manifest.version);
        println!("  Census lists: {}", manifest.census_lists.join(", "));
        println!(
            "  Updated: {}",
            manifest.updated_at.format("%Y-%m-%d %H:%M:%S")
        );
        if let Some(at) = manifest.submitted_at {
            println!("  Submitted: {}", at.format("%Y-%m-%d %H:%M:%S"));
        }
        if let Some(ref location) = manifest.submitted_location {
            println!("  Location: {location}");
        }

        println!();
        Ok(0)
    }
}

fn document_status_marker(status: DocumentStatus) -> &'static str {
    match status {
        DocumentStatus::Preliminary => "📝 Preliminary",
        DocumentStatus::Final => "📤 Final",
    }
}

fn status_marker(status: JobStatus) -> &'static str {
    match status {
        JobStatus::InProgress => "🔄 In Progress",
        JobStatus::Completed => "✅ Completed",
        JobStatus::Failed => "❌ Failed",
    }
}
