//! Configuration management for Beacon.
//!
//! This module provides TOML-based configuration loading, parsing, and
//! validation.
//!
//! # Overview
//!
//! Beacon uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - Environment variable overrides (`BEACON_*` prefix)
//! - Default values for optional settings
//! - Comprehensive validation
//! - Type-safe configuration structs
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use beacon::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // Load configuration from file
//! let config = load_config("beacon.toml")?;
//!
//! // Access configuration sections
//! println!("Store backend: {:?}", config.store.backend);
//! println!("Concept map: {}", config.reporting.concept_map_id);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! The configuration is organized into sections:
//!
//! - [`ApplicationConfig`] - Application settings (name, log level, dry run)
//! - [`StoreConfig`] - Resource store backend, credentials and retry policy
//! - [`EvaluationConfig`] - Worker pool size, bed registry, worklist source
//! - [`ReportingConfig`] - Concept map, category ordering, totals bindings,
//!   report sender
//! - [`LoggingConfig`] - Log format and optional file output
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! name = "beacon"
//! log_level = "info"
//!
//! [store]
//! backend = "http"
//! base_url = "https://resources.example.com/fhir"
//! username = "beacon_user"
//! password = "${BEACON_STORE_PASSWORD}"
//!
//! [evaluation]
//! concurrency = 8
//! bed_registry_id = "bed-registry"
//!
//! [reporting]
//! concept_map_id = "bed-types-to-tally-codes"
//!
//! [reporting.totals]
//! bed-availability = "totals-houston"
//! ```
//!
//! # Environment Variables
//!
//! Use `${VAR_NAME}` syntax for environment variable substitution:
//!
//! ```bash
//! export BEACON_STORE_PASSWORD="secret-password"
//! ```
//!
//! # Validation
//!
//! Configuration is validated on load:
//!
//! ```rust,no_run
//! use beacon::config::load_config;
//!
//! # fn example() {
//! match load_config("beacon.toml") {
//!     Ok(config) => println!("Configuration valid"),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! # }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, BeaconConfig, EvaluationConfig, FileSenderConfig, HttpSenderConfig,
    LoggingConfig, ReportingConfig, RetryConfig, SenderKind, StoreBackend, StoreConfig,
    WorklistSource,
};
pub use secret::{secret_string, SecretString, SecretValue};
