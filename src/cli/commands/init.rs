//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "beacon.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Beacon configuration");
        println!();

        // Check if file already exists
        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        // Generate configuration content
        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        // Write to file
        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Point [store] at your resource server");
                println!("  3. Create a .env file with your credentials:");
                println!("     - Set BEACON_STORE_USERNAME and BEACON_STORE_PASSWORD");
                println!("  4. Bind each measure to its totals baseline in [reporting.totals]");
                println!("  5. Validate configuration: beacon validate-config");
                println!("  6. Generate a report: beacon generate");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5) // Fatal error exit code
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Beacon Configuration File
# Facility bed-capacity measure reporting engine

[application]
name = "beacon"
log_level = "info"
dry_run = false

[store]
# Resource store backend (memory or http)
backend = "http"
base_url = "https://resources.example.com/fhir"

# Authentication
username = "${BEACON_STORE_USERNAME}"
password = "${BEACON_STORE_PASSWORD}"

# TLS settings
tls_verify = true
timeout_seconds = 30

[evaluation]
# Parallel patient evaluations (0 = host parallelism)
concurrency = 0
bed_registry_id = "bed-registry"
worklist = "census"

[reporting]
concept_map_id = "bed-types-to-tally-codes"
category_code_system_id = "bed-type-categories"
overall_category = "Beds"
category_order = ["CC", "MC", "NPU", "Beds"]
sender = "file"

[reporting.totals]
bed-availability = "totals-baseline"

[reporting.file_sender]
directory = "reports/outbound"

[logging]
format = "text"
file_enabled = false
directory = "/var/log/beacon"
rotation = "daily"
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Beacon Configuration File
# Facility bed-capacity measure reporting engine
#
# This file contains all configuration options with examples and explanations.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Application name (used in logging and report provenance)
name = "beacon"

# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run mode (evaluate and aggregate without persisting)
dry_run = false

# ============================================================================
# Resource Store Configuration
# ============================================================================
[store]
# Store backend: "memory" or "http"
# - memory: in-process store, non-durable; for tests and local development
# - http: a resource server speaking JSON over REST
backend = "http"

# Base URL of the resource server (required when backend = "http")
base_url = "https://resources.example.com/fhir"

# Basic authentication (use environment variables)
username = "${BEACON_STORE_USERNAME}"
password = "${BEACON_STORE_PASSWORD}"

# TLS/SSL verification
tls_verify = true

# Request timeout in seconds
timeout_seconds = 30

# Retry policy for transient store failures
[store.retry]
max_retries = 3
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

# ============================================================================
# Evaluation Configuration
# ============================================================================
[evaluation]
# Number of parallel patient evaluations (0 = host parallelism, max 100)
concurrency = 8

# Stored bed registry used to classify stays into tally categories
bed_registry_id = "bed-registry"

# Worklist source: "census" or "fixed"
# - census: patients of interest come from stored census lists in the period
# - fixed: the patients list below is used as-is
worklist = "census"

# Patient references used when worklist = "fixed"
# patients = ["patient/p1", "patient/p2"]

# ============================================================================
# Reporting Configuration
# ============================================================================
[reporting]
# Concept map translating bed categories into occupied/available tally codes
concept_map_id = "bed-types-to-tally-codes"

# Code system defining the bed categories the facility reports
category_code_system_id = "bed-type-categories"

# Category code of the facility-wide totals group
overall_category = "Beds"

# Category display order for report groups; codes not listed sort last
category_order = ["CC", "MC", "NPU", "Beds"]

# Report sender: "file" or "http"
sender = "file"

# Totals baseline bindings: measure identifier -> stored totals report
[reporting.totals]
bed-availability = "totals-baseline"

# File drop sender (required when sender = "file")
[reporting.file_sender]
directory = "reports/outbound"

# HTTP sender (required when sender = "http")
# [reporting.http_sender]
# endpoint = "https://submissions.example.com/reports"
# timeout_seconds = 30

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Log output format: "text" or "json"
format = "text"

# Enable local file logging
file_enabled = false

# Local log directory
directory = "/var/log/beacon"

# Log rotation (daily, hourly or never)
rotation = "daily"
"#
        .to_string()
    }
}
