//! HTTP resource store
//!
//! Talks to a REST resource server that addresses documents as
//! `{base_url}/{kind}/{id}`. Requests are retried with exponential backoff
//! per the configured retry policy.

use crate::adapters::store::traits::{QueryFilter, ResourceKind, ResourceStore, StoreOp};
use crate::config::StoreConfig;
use crate::domain::{BeaconError, Result, StoreError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

/// Resource store backed by an HTTP resource server
pub struct HttpResourceStore {
    /// Base URL of the resource server, without a trailing slash
    base_url: String,

    /// HTTP client for making requests
    client: Client,

    /// Store configuration, including credentials and retry policy
    config: StoreConfig,
}

impl HttpResourceStore {
    /// Create a new HTTP store from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error when `base_url` is absent or not a
    /// valid URL, and a store error when the HTTP client cannot be built.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let base_url = match &config.base_url {
            Some(value) => value.trim_end_matches('/').to_string(),
            None => {
                return Err(BeaconError::Configuration(
                    "store.base_url is required for the http backend".to_string(),
                ))
            }
        };

        Url::parse(&base_url)
            .map_err(|e| BeaconError::Configuration(format!("Invalid store.base_url: {e}")))?;

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled for the resource store");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            BeaconError::Store(StoreError::ConnectionFailed(format!(
                "Failed to build HTTP client: {e}"
            )))
        })?;

        Ok(Self {
            base_url,
            client,
            config: config.clone(),
        })
    }

    /// Build authorization header value
    fn auth_header_value(&self) -> Option<String> {
        if let (Some(ref username), Some(ref password)) =
            (&self.config.username, &self.config.password)
        {
            let secret: &str = password.expose_secret().as_ref();
            let credentials = format!("{username}:{secret}");
            let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());
            Some(format!("Basic {encoded}"))
        } else {
            None
        }
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, T, Fut>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_retries = self.config.retry.max_retries;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                // A duplicate create stays a duplicate; retrying cannot help
                Err(e) if matches!(e, BeaconError::Store(StoreError::DocumentExists(_))) => {
                    return Err(e);
                }
                Err(e) => {
                    attempt += 1;
                    if attempt >= max_retries {
                        return Err(e);
                    }

                    let delay_ms = self.config.retry.initial_delay_ms
                        * (self
                            .config
                            .retry
                            .backoff_multiplier
                            .powf((attempt - 1) as f64) as u64);
                    let delay_ms = delay_ms.min(self.config.retry.max_delay_ms);

                    tracing::warn!(
                        attempt = attempt,
                        max_retries = max_retries,
                        delay_ms = delay_ms,
                        error = %e,
                        "Retrying store request after error"
                    );

                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
            }
        }
    }
}

/// Map a transport-level failure to a store error
fn transport_error(error: reqwest::Error) -> StoreError {
    if error.is_timeout() {
        StoreError::Timeout(error.to_string())
    } else {
        StoreError::ConnectionFailed(error.to_string())
    }
}

/// Map a non-success status to a store error by class
fn status_class_error(status: StatusCode, message: String) -> StoreError {
    match status.as_u16() {
        408 => StoreError::Timeout(message),
        400..=499 => StoreError::ClientError {
            status: status.as_u16(),
            message,
        },
        500..=599 => StoreError::ServerError {
            status: status.as_u16(),
            message,
        },
        _ => StoreError::InvalidResponse(format!("unexpected status {status}: {message}")),
    }
}

#[async_trait]
impl ResourceStore for HttpResourceStore {
    async fn read(&self, kind: ResourceKind, id: &str) -> Result<Option<serde_json::Value>> {
        let url = format!("{}/{}/{}", self.base_url, kind.as_str(), id);

        self.retry_request(|| async {
            let mut request = self.client.get(&url);
            if let Some(auth) = self.auth_header_value() {
                request = request.header("Authorization", auth);
            }

            let resp = request
                .send()
                .await
                .map_err(|e| BeaconError::Store(transport_error(e)))?;

            let status = resp.status();
            if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
                return Ok(None);
            }
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                let body = resp.text().await.unwrap_or_default();
                return Err(BeaconError::Store(StoreError::AuthenticationFailed(
                    format!("status {status}: {body}"),
                )));
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(BeaconError::Store(status_class_error(status, body)));
            }

            let document = resp
                .json::<serde_json::Value>()
                .await
                .map_err(|e| BeaconError::Store(StoreError::InvalidResponse(e.to_string())))?;
            Ok(Some(document))
        })
        .await
    }

    async fn write(
        &self,
        kind: ResourceKind,
        id: &str,
        document: &serde_json::Value,
    ) -> Result<()> {
        let url = format!("{}/{}/{}", self.base_url, kind.as_str(), id);

        self.retry_request(|| async {
            let mut request = self.client.put(&url).json(document);
            if let Some(auth) = self.auth_header_value() {
                request = request.header("Authorization", auth);
            }

            let resp = request
                .send()
                .await
                .map_err(|e| BeaconError::Store(transport_error(e)))?;

            let status = resp.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                let body = resp.text().await.unwrap_or_default();
                return Err(BeaconError::Store(StoreError::AuthenticationFailed(
                    format!("status {status}: {body}"),
                )));
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(BeaconError::Store(StoreError::WriteFailed(format!(
                    "writing {kind}/{id} returned status {status}: {body}"
                ))));
            }

            Ok(())
        })
        .await
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> Result<()> {
        let url = format!("{}/{}/{}", self.base_url, kind.as_str(), id);

        self.retry_request(|| async {
            let mut request = self.client.delete(&url);
            if let Some(auth) = self.auth_header_value() {
                request = request.header("Authorization", auth);
            }

            let resp = request
                .send()
                .await
                .map_err(|e| BeaconError::Store(transport_error(e)))?;

            let status = resp.status();
            // Deleting an absent document is not an error
            if status == StatusCode::NOT_FOUND {
                return Ok(());
            }
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                let body = resp.text().await.unwrap_or_default();
                return Err(BeaconError::Store(StoreError::AuthenticationFailed(
                    format!("status {status}: {body}"),
                )));
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(BeaconError::Store(StoreError::WriteFailed(format!(
                    "deleting {kind}/{id} returned status {status}: {body}"
                ))));
            }

            Ok(())
        })
        .await
    }

    async fn query(
        &self,
        kind: ResourceKind,
        filter: &QueryFilter,
    ) -> Result<Vec<serde_json::Value>> {
        let url = format!("{}/{}", self.base_url, kind.as_str());

        let mut params = filter.fields().to_vec();
        if let Some((start, end)) = filter.window() {
            params.push(("period_start".to_string(), start.to_rfc3339()));
            params.push(("period_end".to_string(), end.to_rfc3339()));
        }

        self.retry_request(|| async {
            let mut request = self.client.get(&url).query(&params);
            if let Some(auth) = self.auth_header_value() {
                request = request.header("Authorization", auth);
            }

            let resp = request
                .send()
                .await
                .map_err(|e| BeaconError::Store(transport_error(e)))?;

            let status = resp.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                let body = resp.text().await.unwrap_or_default();
                return Err(BeaconError::Store(StoreError::AuthenticationFailed(
                    format!("status {status}: {body}"),
                )));
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(BeaconError::Store(StoreError::QueryFailed(format!(
                    "query for {kind} failed with status {status}: {body}"
                ))));
            }

            let body = resp
                .json::<serde_json::Value>()
                .await
                .map_err(|e| BeaconError::Store(StoreError::InvalidResponse(e.to_string())))?;

            let entries = body
                .get("entries")
                .and_then(|v| v.as_array())
                .cloned()
                .ok_or_else(|| {
                    BeaconError::Store(StoreError::InvalidResponse(
                        "query response is missing the entries array".to_string(),
                    ))
                })?;

            Ok(entries)
        })
        .await
    }

    async fn transaction(&self, operations: Vec<StoreOp>) -> Result<()> {
        let url = format!("{}/batch", self.base_url);
        let count = operations.len();
        let payload = serde_json::json!({ "operations": operations });

        self.retry_request(|| async {
            let mut request = self.client.post(&url).json(&payload);
            if let Some(auth) = self.auth_header_value() {
                request = request.header("Authorization", auth);
            }

            let resp = request
                .send()
                .await
                .map_err(|e| BeaconError::Store(transport_error(e)))?;

            let status = resp.status();
            if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                let body = resp.text().await.unwrap_or_default();
                return Err(BeaconError::Store(StoreError::AuthenticationFailed(
                    format!("status {status}: {body}"),
                )));
            }
            // The server rejects a create whose id is taken with 409
            if status == StatusCode::CONFLICT {
                let body = resp.text().await.unwrap_or_default();
                return Err(BeaconError::Store(StoreError::DocumentExists(body)));
            }
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(BeaconError::Store(StoreError::TransactionFailed(format!(
                    "batch of {count} operations returned status {status}: {body}"
                ))));
            }

            Ok(())
        })
        .await
    }

    async fn test_connection(&self) -> Result<()> {
        let url = format!("{}/health", self.base_url);

        let mut request = self.client.get(&url);
        if let Some(auth) = self.auth_header_value() {
            request = request.header("Authorization", auth);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| BeaconError::Store(transport_error(e)))?;

        if !resp.status().is_success() {
            return Err(BeaconError::Store(StoreError::ConnectionFailed(format!(
                "health check returned status {}",
                resp.status()
            ))));
        }

        tracing::info!(base_url = %self.base_url, "Resource store connection verified");
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "http"
    }
}
