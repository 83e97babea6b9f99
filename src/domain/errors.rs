//! Domain error types
//!
//! Error hierarchy for the reporting pipeline. Variants follow the failure
//! taxonomy: configuration errors abort before work starts, stage errors
//! abort the remaining pipeline, per-entity evaluation failures are values
//! (not errors) and never appear here. All errors are domain-specific and
//! don't expose third-party types.

use thiserror::Error;

/// Main Beacon error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum BeaconError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Resource store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Translation-table load or shape errors
    #[error("Translation error: {0}")]
    Translation(String),

    /// Census/worklist resolution errors
    #[error("Census error: {0}")]
    Census(String),

    /// Evaluation coordination errors (cancellation, pool failures)
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Aggregation errors
    #[error("Aggregation error: {0}")]
    Aggregation(String),

    /// A report already exists for the criteria and regeneration was not
    /// requested; non-retryable
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Job state machine violations
    #[error("Job error: {0}")]
    Job(String),

    /// Sender/publish errors
    #[error("Send error: {0}")]
    Send(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl BeaconError {
    /// True for the non-retryable duplicate-report rejection
    pub fn is_conflict(&self) -> bool {
        matches!(self, BeaconError::Conflict(_))
    }
}

/// Resource-store-specific errors
///
/// Errors raised at the storage adapter boundary. These errors don't expose
/// the underlying HTTP client types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect to the resource store
    #[error("Failed to connect to resource store: {0}")]
    ConnectionFailed(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid response from the store
    #[error("Invalid response from store: {0}")]
    InvalidResponse(String),

    /// A resource the pipeline requires is absent (or previously deleted)
    #[error("Resource {kind}/{id} not found")]
    ResourceMissing { kind: String, id: String },

    /// Query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Write failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Transaction failed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A create-guarded write found the document already present
    #[error("Document already exists: {0}")]
    DocumentExists(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Resource body did not decode into the expected shape
    #[error("Invalid resource format: {0}")]
    InvalidFormat(String),
}

/// Error signalled by a pipeline event hook
///
/// A soft failure is logged and the stage continues; a fatal failure aborts
/// the stage like any other stage error.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HookError {
    /// Human-readable failure description
    pub message: String,

    /// Whether the hook demands the stage abort
    pub fatal: bool,
}

impl HookError {
    /// Creates a soft (non-aborting) hook failure
    pub fn soft(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: false,
        }
    }

    /// Creates a fatal hook failure that aborts the stage
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fatal: true,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for BeaconError {
    fn from(err: std::io::Error) -> Self {
        BeaconError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BeaconError {
    fn from(err: serde_json::Error) -> Self {
        BeaconError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BeaconError {
    fn from(err: toml::de::Error) -> Self {
        BeaconError::Configuration(format!("TOML parse error: {err}"))
    }
}
