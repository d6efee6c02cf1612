//! Shared setup for commands that touch stored data.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use geofence_monitor::config::{default_config_path, ConfigFile};
use geofence_monitor::history::EventLog;
use geofence_monitor::logging::{init_logging, LoggingConfig, LoggingGuard};
use geofence_monitor::store::GeofenceStore;
use tracing::info;

use crate::error::CliError;

/// Loaded configuration plus the logging guard for one CLI invocation.
pub struct CliRunner {
    config: ConfigFile,
    config_path: PathBuf,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load configuration from `config_path` (or the default location) and
    /// install logging into the configured data directory.
    pub fn new(config_path: Option<PathBuf>, verbose: bool) -> Result<Self, CliError> {
        let config_path = config_path.unwrap_or_else(default_config_path);
        let config = ConfigFile::load_from(&config_path)?;

        let logging = init_logging(
            LoggingConfig::default()
                .verbose(verbose)
                .with_log_dir(&config.storage.data_dir),
        )
        .map_err(CliError::Logging)?;

        Ok(Self {
            config,
            config_path,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = geofence_monitor::VERSION,
            command,
            config = %self.config_path.display(),
            data_dir = %self.config.storage.data_dir.display(),
            "geofence-monitor starting"
        );
    }

    pub fn open_store(&self) -> Result<Arc<GeofenceStore>, CliError> {
        Ok(Arc::new(GeofenceStore::open(self.config.geofences_path())?))
    }

    pub fn open_log(&self) -> Result<Arc<EventLog>, CliError> {
        Ok(Arc::new(EventLog::open(
            self.config.events_path(),
            self.config.event_log_config(),
        )?))
    }
}
