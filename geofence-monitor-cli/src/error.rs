//! CLI error types.

use std::fmt;

use geofence_monitor::config::ConfigError;
use geofence_monitor::error::MonitorError;

/// Errors surfaced by CLI commands.
#[derive(Debug)]
pub enum CliError {
    /// Configuration could not be loaded, saved or changed.
    Config(String),

    /// Invalid command-line input.
    InvalidInput(String),

    /// A store, log or session operation failed.
    Monitor(MonitorError),

    /// Logging could not be installed.
    Logging(std::io::Error),

    /// Failed to create the Tokio runtime.
    RuntimeCreation(std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidInput(_) => 2,
            CliError::Monitor(e) if e.is_validation() || e.is_not_found() => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::InvalidInput(msg) => write!(f, "{}", msg),
            CliError::Monitor(e) => write!(f, "{}", e),
            CliError::Logging(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::RuntimeCreation(e) => write!(f, "Failed to create Tokio runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Monitor(e) => Some(e),
            CliError::Logging(e) | CliError::RuntimeCreation(e) => Some(e),
            CliError::Config(_) | CliError::InvalidInput(_) => None,
        }
    }
}

impl From<MonitorError> for CliError {
    fn from(e: MonitorError) -> Self {
        CliError::Monitor(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}
