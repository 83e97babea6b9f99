//! Report submission
//!
//! A sender publishes a finished report together with its manifest and
//! returns a location string recorded on the manifest. The file sender
//! drops a JSON envelope into a directory; the HTTP sender posts the same
//! envelope to a receiving endpoint.

use crate::config::{FileSenderConfig, HttpSenderConfig, ReportingConfig, SenderKind};
use crate::domain::{AggregateReport, BeaconError, ReportManifest, Result};
use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Publishes an aggregate report to a destination
#[async_trait]
pub trait ReportSender: Send + Sync + std::fmt::Debug {
    /// Sends the report and returns the destination location
    ///
    /// # Errors
    ///
    /// Returns an error when the destination rejects or cannot receive the
    /// report. The report itself is not modified either way.
    async fn send(&self, report: &AggregateReport, manifest: &ReportManifest) -> Result<String>;

    /// Name of the sender for log output
    fn name(&self) -> &str;
}

fn envelope(report: &AggregateReport, manifest: &ReportManifest) -> Result<serde_json::Value> {
    Ok(serde_json::json!({
        "manifest": serde_json::to_value(manifest)?,
        "report": serde_json::to_value(report)?,
    }))
}

/// Writes report envelopes into a drop directory
#[derive(Debug)]
pub struct FileSender {
    directory: PathBuf,
}

impl FileSender {
    pub fn new(config: &FileSenderConfig) -> Self {
        Self {
            directory: PathBuf::from(&config.directory),
        }
    }
}

#[async_trait]
impl ReportSender for FileSender {
    async fn send(&self, report: &AggregateReport, manifest: &ReportManifest) -> Result<String> {
        tokio::fs::create_dir_all(&self.directory).await.map_err(|e| {
            BeaconError::Send(format!(
                "Failed to create report directory {}: {e}",
                self.directory.display()
            ))
        })?;

        let filename = format!("{}-v{}.json", report.id, manifest.version);
        let path = self.directory.join(filename);

        let body = envelope(report, manifest)?;
        let bytes = serde_json::to_vec_pretty(&body)?;
        tokio::fs::write(&path, bytes).await.map_err(|e| {
            BeaconError::Send(format!(
                "Failed to write report file {}: {e}",
                path.display()
            ))
        })?;

        let location = path.display().to_string();
        tracing::info!(report_id = %report.id, location = %location, "Report written to file");
        Ok(location)
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Posts report envelopes to an HTTP endpoint
#[derive(Debug)]
pub struct HttpSender {
    endpoint: String,
    client: Client,
}

impl HttpSender {
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: &HttpSenderConfig) -> Result<Self> {
        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| BeaconError::Send(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            client,
        })
    }
}

#[async_trait]
impl ReportSender for HttpSender {
    async fn send(&self, report: &AggregateReport, manifest: &ReportManifest) -> Result<String> {
        let body = envelope(report, manifest)?;

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| BeaconError::Send(format!("Failed to reach {}: {e}", self.endpoint)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(BeaconError::Send(format!(
                "Endpoint {} rejected report with status {status}: {text}",
                self.endpoint
            )));
        }

        let location = resp
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
            .unwrap_or_else(|| self.endpoint.clone());

        tracing::info!(report_id = %report.id, location = %location, "Report accepted by endpoint");
        Ok(location)
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Create the configured report sender
///
/// # Errors
///
/// Returns a configuration error when the section for the selected sender
/// is absent.
pub fn create_report_sender(config: &ReportingConfig) -> Result<Arc<dyn ReportSender>> {
    match config.sender {
        SenderKind::File => {
            let file_config = config.file_sender.as_ref().ok_or_else(|| {
                BeaconError::Configuration(
                    "reporting.file_sender section is required for the file sender".to_string(),
                )
            })?;
            Ok(Arc::new(FileSender::new(file_config)))
        }
        SenderKind::Http => {
            let http_config = config.http_sender.as_ref().ok_or_else(|| {
                BeaconError::Configuration(
                    "reporting.http_sender section is required for the http sender".to_string(),
                )
            })?;
            Ok(Arc::new(HttpSender::new(http_config)?))
        }
    }
}
