//! Error types for the monitoring engine.
//!
//! [`MonitorError`] covers every failure surfaced to the caller of a store,
//! log or session operation. Location provider failures have their own type,
//! [`crate::provider::ProviderError`], because the sampling loop tolerates
//! them instead of propagating them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for monitoring engine operations.
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Errors that can occur in the monitoring engine.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Geofence parameters are invalid. Never retried automatically.
    #[error("Invalid geofence: {0}")]
    Validation(String),

    /// No geofence exists with the given id.
    #[error("Geofence not found: {0}")]
    NotFound(String),

    /// `start` was called on a session that is already running.
    #[error("Tracking session is already running")]
    AlreadyRunning,

    /// `stop` was called on a session that is not running.
    #[error("Tracking session is not running")]
    NotRunning,

    /// The permission gate refused location sampling.
    #[error("Location permission denied")]
    PermissionDenied,

    /// A durable write or read failed.
    #[error("Storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MonitorError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        MonitorError::Storage {
            path: path.into(),
            source,
        }
    }

    /// Whether this error was caused by invalid caller input.
    pub fn is_validation(&self) -> bool {
        matches!(self, MonitorError::Validation(_))
    }

    /// Whether this error refers to an unknown geofence id.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MonitorError::NotFound(_))
    }
}
