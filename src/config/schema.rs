//! Configuration schema types
//!
//! This module defines the configuration structure for Beacon.

use crate::config::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Resource store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-memory store, non-durable
    #[default]
    Memory,
    /// HTTP resource server
    Http,
}

/// Worklist source selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WorklistSource {
    /// Resolve patients from stored census lists
    #[default]
    Census,
    /// Fixed patient list from configuration
    Fixed,
}

/// Report sender selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SenderKind {
    /// Write the report as JSON into a drop directory
    #[default]
    File,
    /// POST the report to an HTTP endpoint
    Http,
}

/// Main Beacon configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BeaconConfig {
    /// Application-level settings
    pub application: ApplicationConfig,

    /// Resource store configuration
    pub store: StoreConfig,

    /// Evaluation settings
    #[serde(default)]
    pub evaluation: EvaluationConfig,

    /// Report composition and submission settings
    #[serde(default)]
    pub reporting: ReportingConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl BeaconConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns the first validation error encountered
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.store.validate()?;
        self.evaluation.validate()?;
        self.reporting.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Validates every section and collects all errors
    ///
    /// Unlike [`validate`](Self::validate), this does not stop at the first
    /// failure. Used by `beacon validate-config` to report everything at once.
    pub fn validate_all(&self) -> Vec<String> {
        let mut errors = Vec::new();
        for result in [
            self.application.validate(),
            self.store.validate(),
            self.evaluation.validate(),
            self.reporting.validate(),
            self.logging.validate(),
        ] {
            if let Err(e) = result {
                errors.push(e);
            }
        }
        errors
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name used in log output and report provenance
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Dry run mode (evaluate and aggregate without persisting)
    #[serde(default)]
    pub dry_run: bool,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("application.name cannot be empty".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
            dry_run: false,
        }
    }
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_delay_ms < self.initial_delay_ms {
            return Err(format!(
                "store.retry.max_delay_ms ({}) must be >= initial_delay_ms ({})",
                self.max_delay_ms, self.initial_delay_ms
            ));
        }
        if self.backoff_multiplier < 1.0 {
            return Err(format!(
                "store.retry.backoff_multiplier must be >= 1.0, got {}",
                self.backoff_multiplier
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Resource store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store backend (memory or http)
    #[serde(default)]
    pub backend: StoreBackend,

    /// Base URL of the resource server (required when backend = http)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Username for basic authentication (optional)
    #[serde(default)]
    pub username: Option<String>,

    /// Password for basic authentication (optional)
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// TLS certificate verification enabled
    ///
    /// **SECURITY WARNING**: Disabling TLS verification (setting to `false`)
    /// exposes the application to man-in-the-middle attacks and should ONLY be
    /// used in development/testing environments.
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl StoreConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.backend == StoreBackend::Http {
            match self.base_url {
                Some(ref url) if !url.is_empty() => {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        return Err(
                            "store.base_url must start with http:// or https://".to_string()
                        );
                    }
                }
                _ => {
                    return Err(
                        "store.base_url is required when store.backend = 'http'".to_string()
                    );
                }
            }
        }

        // Credentials come as a pair
        let has_username = self
            .username
            .as_ref()
            .map(|s| !s.is_empty())
            .unwrap_or(false);
        let has_password = self
            .password
            .as_ref()
            .map(|s| !s.expose_secret().is_empty())
            .unwrap_or(false);
        if has_username != has_password {
            return Err(
                "store.username and store.password must be provided together".to_string(),
            );
        }

        if self.timeout_seconds == 0 {
            return Err("store.timeout_seconds must be > 0".to_string());
        }

        self.retry.validate()?;
        Ok(())
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            base_url: None,
            username: None,
            password: None,
            tls_verify: true,
            timeout_seconds: default_timeout_seconds(),
            retry: RetryConfig::default(),
        }
    }
}

/// Evaluation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Number of parallel patient evaluations (0 = host parallelism)
    #[serde(default)]
    pub concurrency: usize,

    /// Identifier of the stored bed registry used to classify stays
    #[serde(default = "default_bed_registry_id")]
    pub bed_registry_id: String,

    /// Worklist source (census or fixed)
    #[serde(default)]
    pub worklist: WorklistSource,

    /// Patient references used when worklist = fixed
    #[serde(default)]
    pub patients: Vec<String>,
}

impl EvaluationConfig {
    fn validate(&self) -> Result<(), String> {
        if self.concurrency > 100 {
            return Err(format!(
                "evaluation.concurrency must be <= 100 (0 selects host parallelism), got {}",
                self.concurrency
            ));
        }

        if self.bed_registry_id.is_empty() {
            return Err("evaluation.bed_registry_id cannot be empty".to_string());
        }

        if self.worklist == WorklistSource::Fixed && self.patients.is_empty() {
            return Err(
                "evaluation.patients cannot be empty when worklist = 'fixed'".to_string(),
            );
        }

        Ok(())
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            concurrency: 0,
            bed_registry_id: default_bed_registry_id(),
            worklist: WorklistSource::Census,
            patients: vec![],
        }
    }
}

/// Report composition and submission settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Identifier of the stored concept map translating bed categories into
    /// occupied/available tally codes
    #[serde(default = "default_concept_map_id")]
    pub concept_map_id: String,

    /// Identifier of the stored code system defining bed categories
    #[serde(default = "default_category_code_system_id")]
    pub category_code_system_id: String,

    /// Category code of the facility-wide totals group
    #[serde(default = "default_overall_category")]
    pub overall_category: String,

    /// Category display order for report groups; codes not listed sort last
    #[serde(default = "default_category_order")]
    pub category_order: Vec<String>,

    /// Totals baseline bindings: measure identifier to stored report identifier
    #[serde(default)]
    pub totals: HashMap<String, String>,

    /// Report sender (file or http)
    #[serde(default)]
    pub sender: SenderKind,

    /// File sender configuration (required if sender = file)
    #[serde(default = "default_file_sender", skip_serializing_if = "Option::is_none")]
    pub file_sender: Option<FileSenderConfig>,

    /// HTTP sender configuration (required if sender = http)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_sender: Option<HttpSenderConfig>,
}

impl ReportingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.concept_map_id.is_empty() {
            return Err("reporting.concept_map_id cannot be empty".to_string());
        }

        if self.category_code_system_id.is_empty() {
            return Err("reporting.category_code_system_id cannot be empty".to_string());
        }

        if self.overall_category.is_empty() {
            return Err("reporting.overall_category cannot be empty".to_string());
        }

        for (measure, report_id) in &self.totals {
            if measure.is_empty() || report_id.is_empty() {
                return Err(
                    "reporting.totals entries must map a measure id to a report id".to_string(),
                );
            }
        }

        // Validate that the correct sender config is present and valid
        // Note: Both sender configurations can be present in the TOML file,
        // but only the active one (based on sender) is validated
        match self.sender {
            SenderKind::File => {
                if let Some(ref config) = self.file_sender {
                    config.validate()?;
                } else {
                    return Err(
                        "reporting.file_sender configuration is required when sender = 'file'"
                            .to_string(),
                    );
                }
            }
            SenderKind::Http => {
                if let Some(ref config) = self.http_sender {
                    config.validate()?;
                } else {
                    return Err(
                        "reporting.http_sender configuration is required when sender = 'http'"
                            .to_string(),
                    );
                }
            }
        }

        Ok(())
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            concept_map_id: default_concept_map_id(),
            category_code_system_id: default_category_code_system_id(),
            overall_category: default_overall_category(),
            category_order: default_category_order(),
            totals: HashMap::new(),
            sender: SenderKind::File,
            file_sender: default_file_sender(),
            http_sender: None,
        }
    }
}

/// File drop sender configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSenderConfig {
    /// Directory receiving submitted report JSON files
    #[serde(default = "default_drop_directory")]
    pub directory: String,
}

impl FileSenderConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.is_empty() {
            return Err("reporting.file_sender.directory cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for FileSenderConfig {
    fn default() -> Self {
        Self {
            directory: default_drop_directory(),
        }
    }
}

/// HTTP sender configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSenderConfig {
    /// Endpoint URL receiving submitted reports
    pub endpoint: String,

    /// Request timeout in seconds
    #[serde(default = "default_send_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl HttpSenderConfig {
    fn validate(&self) -> Result<(), String> {
        if self.endpoint.is_empty() {
            return Err("reporting.http_sender.endpoint cannot be empty".to_string());
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(
                "reporting.http_sender.endpoint must start with http:// or https://".to_string(),
            );
        }

        if self.timeout_seconds == 0 {
            return Err("reporting.http_sender.timeout_seconds must be > 0".to_string());
        }

        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log output format (text or json)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Enable local file logging
    #[serde(default)]
    pub file_enabled: bool,

    /// Local log directory
    #[serde(default = "default_log_directory")]
    pub directory: String,

    /// Log rotation strategy (daily, hourly or never)
    #[serde(default = "default_log_rotation")]
    pub rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(format!(
                "Invalid logging.format '{}'. Must be one of: {}",
                self.format,
                valid_formats.join(", ")
            ));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.rotation.as_str()) {
            return Err(format!(
                "Invalid logging.rotation '{}'. Must be one of: {}",
                self.rotation,
                valid_rotations.join(", ")
            ));
        }

        if self.file_enabled && self.directory.is_empty() {
            return Err(
                "logging.directory cannot be empty when file logging is enabled".to_string(),
            );
        }

        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: default_log_format(),
            file_enabled: false,
            directory: default_log_directory(),
            rotation: default_log_rotation(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "beacon".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_send_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    30000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_bed_registry_id() -> String {
    "bed-registry".to_string()
}

fn default_concept_map_id() -> String {
    "bed-types-to-tally-codes".to_string()
}

fn default_category_code_system_id() -> String {
    "bed-type-categories".to_string()
}

fn default_overall_category() -> String {
    "Beds".to_string()
}

fn default_category_order() -> Vec<String> {
    ["CC", "MM-SS", "MP", "SBN", "MC", "PICU", "NPU", "Beds"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_file_sender() -> Option<FileSenderConfig> {
    Some(FileSenderConfig::default())
}

fn default_drop_directory() -> String {
    "reports".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_directory() -> String {
    "logs".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}
