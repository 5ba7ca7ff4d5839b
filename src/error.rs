//! Error types for property-sheet generation.

use thiserror::Error;

/// Errors surfaced to the host that owns the orchestrator.
#[derive(Debug, Error)]
pub enum SheetError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Logging setup failed: {0}")]
    LoggingError(String),

    #[error("Failed to spawn generation worker: {0}")]
    WorkerSpawn(std::io::Error),

    #[error("Invalid scene: {0}")]
    InvalidScene(String),

    #[error("Unknown object in selection: {0}")]
    UnknownObject(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Output formatting failed: {0}")]
    OutputError(String),
}

impl From<config::ConfigError> for SheetError {
    fn from(err: config::ConfigError) -> Self {
        SheetError::ConfigError(err.to_string())
    }
}

impl From<toml::de::Error> for SheetError {
    fn from(err: toml::de::Error) -> Self {
        SheetError::InvalidScene(err.to_string())
    }
}

/// Failures raised while a worker builds controls for a bucket.
///
/// These never leave the worker thread; they end the job and are logged.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Control construction failed for bucket {bucket}: {message}")]
    BuildFailed { bucket: String, message: String },

    #[error("Control builder panicked for bucket {0}")]
    BuilderPanicked(String),

    #[error("No schema registered for type {0}")]
    UnknownType(String),
}

/// Failure of a single deferred command during a flush.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Deferred command failed: {0}")]
    Failed(String),

    #[error("Deferred command panicked: {0}")]
    Panicked(String),
}
