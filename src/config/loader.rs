//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::{BeaconConfig, StoreBackend};
use crate::config::secret_string;
use crate::domain::errors::BeaconError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into BeaconConfig
/// 4. Applies environment variable overrides (BEACON_* prefix)
/// 5. Validates the configuration
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - Environment variable substitution fails
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use beacon::config::loader::load_config;
///
/// let config = load_config("beacon.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<BeaconConfig> {
    let path = path.as_ref();

    // Check if file exists
    if !path.exists() {
        return Err(BeaconError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    // Read file contents
    let contents = fs::read_to_string(path).map_err(|e| {
        BeaconError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    // Perform environment variable substitution
    let contents = substitute_env_vars(&contents)?;

    // Parse TOML
    let mut config: BeaconConfig = toml::from_str(&contents)
        .map_err(|e| BeaconError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    // Apply environment variable overrides
    apply_env_overrides(&mut config);

    // Validate configuration
    config.validate().map_err(|e| {
        BeaconError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are passed through untouched so documentation examples do
/// not trigger substitution failures.
///
/// # Errors
///
/// Returns an error if a referenced environment variable is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = match Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") {
        Ok(re) => re,
        Err(e) => {
            return Err(BeaconError::Configuration(format!(
                "Invalid substitution pattern: {}",
                e
            )))
        }
    };
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    // Process line by line to skip comments
    for line in input.lines() {
        let trimmed = line.trim_start();

        // Skip comment lines - don't process env vars in comments
        if trimmed.starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        // Process non-comment lines for env var substitution
        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(BeaconError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the BEACON_* prefix
///
/// Overrides are applied after file parsing, so they win over file values.
/// For example: BEACON_STORE_URL, BEACON_LOG_LEVEL.
fn apply_env_overrides(config: &mut BeaconConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("BEACON_LOG_LEVEL") {
        config.application.log_level = val;
    }
    if let Ok(val) = std::env::var("BEACON_DRY_RUN") {
        config.application.dry_run = val.parse().unwrap_or(false);
    }

    // Store overrides
    if let Ok(val) = std::env::var("BEACON_STORE_BACKEND") {
        match val.to_lowercase().as_str() {
            "memory" => config.store.backend = StoreBackend::Memory,
            "http" => config.store.backend = StoreBackend::Http,
            _ => {}
        }
    }
    if let Ok(val) = std::env::var("BEACON_STORE_URL") {
        config.store.base_url = Some(val);
    }
    if let Ok(val) = std::env::var("BEACON_STORE_USERNAME") {
        config.store.username = Some(val);
    }
    if let Ok(val) = std::env::var("BEACON_STORE_PASSWORD") {
        config.store.password = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("BEACON_STORE_TLS_VERIFY") {
        config.store.tls_verify = val.parse().unwrap_or(true);
    }

    // Evaluation overrides
    if let Ok(val) = std::env::var("BEACON_EVAL_CONCURRENCY") {
        if let Ok(concurrency) = val.parse() {
            config.evaluation.concurrency = concurrency;
        }
    }
    if let Ok(val) = std::env::var("BEACON_EVAL_BED_REGISTRY") {
        config.evaluation.bed_registry_id = val;
    }

    // Reporting overrides
    if let Ok(val) = std::env::var("BEACON_REPORTING_CONCEPT_MAP") {
        config.reporting.concept_map_id = val;
    }
    if let Ok(val) = std::env::var("BEACON_REPORTING_OVERALL_CATEGORY") {
        config.reporting.overall_category = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("BEACON_LOG_FORMAT") {
        config.logging.format = val;
    }
}
