//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Beacon configuration file.

use crate::config::load_config;
use crate::config::schema::{SenderKind, StoreBackend, WorklistSource};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Load configuration
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2); // Configuration error exit code
            }
        };

        // Validate configuration, reporting every problem rather than the
        // first one
        let problems = config.validate_all();
        if !problems.is_empty() {
            println!("❌ Configuration validation failed");
            for problem in &problems {
                println!("   Error: {problem}");
            }
            println!();
            return Ok(2);
        }

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Application: {}", config.application.name);
        println!("  Log Level: {}", config.application.log_level);

        match config.store.backend {
            StoreBackend::Memory => println!("  Store Backend: memory (non-durable)"),
            StoreBackend::Http => {
                println!("  Store Backend: http");
                println!(
                    "  Store URL: {}",
                    config.store.base_url.as_deref().unwrap_or("(unset)")
                );
            }
        }

        println!(
            "  Evaluation Concurrency: {}",
            if config.evaluation.concurrency == 0 {
                "host parallelism".to_string()
            } else {
                config.evaluation.concurrency.to_string()
            }
        );
        println!("  Bed Registry: {}", config.evaluation.bed_registry_id);
        match config.evaluation.worklist {
            WorklistSource::Census => println!("  Worklist Source: census"),
            WorklistSource::Fixed => println!(
                "  Worklist Source: fixed ({} patients)",
                config.evaluation.patients.len()
            ),
        }

        println!("  Concept Map: {}", config.reporting.concept_map_id);
        println!(
            "  Category Code System: {}",
            config.reporting.category_code_system_id
        );
        println!("  Category Order: {:?}", config.reporting.category_order);
        println!("  Totals Bindings: {}", config.reporting.totals.len());

        match config.reporting.sender {
            SenderKind::File => {
                if let Some(ref sender) = config.reporting.file_sender {
                    println!("  Sender: file ({})", sender.directory);
                }
            }
            SenderKind::Http => {
                if let Some(ref sender) = config.reporting.http_sender {
                    println!("  Sender: http ({})", sender.endpoint);
                }
            }
        }

        println!();
        Ok(0)
    }
}
