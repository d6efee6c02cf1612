//! Configuration file handling.
//!
//! Settings live in an INI file, by default `~/.geofence-monitor/config.ini`:
//!
//! ```ini
//! [storage]
//! data_dir = ~/.geofence-monitor
//!
//! [tracking]
//! interval_secs = 30
//! provider_timeout_secs = 10
//! sink_timeout_ms = 500
//!
//! [history]
//! max_events = 100
//! ```
//!
//! A missing file, section or key falls back to its default. Values that are
//! present but invalid are errors rather than silently ignored.

mod keys;

pub use keys::ConfigKey;

use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use crate::history::{EventLogConfig, DEFAULT_MAX_EVENTS};
use crate::session::{SessionConfig, DEFAULT_INTERVAL, DEFAULT_PROVIDER_TIMEOUT, DEFAULT_SINK_TIMEOUT};

/// Name of the per-user directory holding config and data.
pub const APP_DIR_NAME: &str = ".geofence-monitor";

/// Config file name inside the app directory.
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// File names inside the data directory.
pub const GEOFENCES_FILE_NAME: &str = "geofences.json";
pub const EVENTS_FILE_NAME: &str = "events.json";
pub const LOG_FILE_NAME: &str = "geofence-monitor.log";

/// Errors loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value '{value}' for [{section}] {key}: {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    /// Directory holding geofences, events and the log file.
    pub data_dir: PathBuf,
}

/// `[tracking]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingSettings {
    pub interval_secs: u64,
    pub provider_timeout_secs: u64,
    pub sink_timeout_ms: u64,
}

/// `[history]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySettings {
    pub max_events: usize,
}

/// Parsed configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub storage: StorageSettings,
    pub tracking: TrackingSettings,
    pub history: HistorySettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            storage: StorageSettings {
                data_dir: default_app_dir(),
            },
            tracking: TrackingSettings {
                interval_secs: DEFAULT_INTERVAL.as_secs(),
                provider_timeout_secs: DEFAULT_PROVIDER_TIMEOUT.as_secs(),
                sink_timeout_ms: DEFAULT_SINK_TIMEOUT.as_millis() as u64,
            },
            history: HistorySettings {
                max_events: DEFAULT_MAX_EVENTS,
            },
        }
    }
}

/// `~/.geofence-monitor`, or a relative directory if there is no home.
pub fn default_app_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(APP_DIR_NAME))
}

/// Default location of the config file.
pub fn default_config_path() -> PathBuf {
    default_app_dir().join(CONFIG_FILE_NAME)
}

/// Expand a leading `~` to the home directory.
fn expand_home(value: &str) -> PathBuf {
    match (value.strip_prefix('~'), dirs::home_dir()) {
        (Some(rest), Some(home)) if rest.is_empty() || rest.starts_with('/') => {
            home.join(rest.trim_start_matches('/'))
        }
        _ => PathBuf::from(value),
    }
}

impl ConfigFile {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini(&ini)
    }

    /// Parse from INI text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigError::Read {
            path: PathBuf::from("<string>"),
            source: ini::Error::Parse(e),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for key in ConfigKey::all() {
            let value = ini
                .section(Some(key.section()))
                .and_then(|section| section.get(key.key_name()));
            if let Some(value) = value {
                key.set(&mut config, value)?;
            }
        }

        Ok(config)
    }

    /// Write the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut ini = Ini::new();
        for key in ConfigKey::all() {
            ini.with_section(Some(key.section()))
                .set(key.key_name(), key.get(self));
        }

        ini.write_to_file(path).map_err(write_err)
    }

    pub fn geofences_path(&self) -> PathBuf {
        self.storage.data_dir.join(GEOFENCES_FILE_NAME)
    }

    pub fn events_path(&self) -> PathBuf {
        self.storage.data_dir.join(EVENTS_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.storage.data_dir.join(LOG_FILE_NAME)
    }

    /// Session settings derived from `[tracking]`.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig::default()
            .with_interval(Duration::from_secs(self.tracking.interval_secs))
            .with_provider_timeout(Duration::from_secs(self.tracking.provider_timeout_secs))
            .with_sink_timeout(Duration::from_millis(self.tracking.sink_timeout_ms))
    }

    /// Event log settings derived from `[history]`.
    pub fn event_log_config(&self) -> EventLogConfig {
        EventLogConfig::default().with_max_events(self.history.max_events)
    }
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ConfigFile::default();
        assert_eq!(config.tracking.interval_secs, 30);
        assert_eq!(config.tracking.provider_timeout_secs, 10);
        assert_eq!(config.tracking.sink_timeout_ms, 500);
        assert_eq!(config.history.max_events, 100);
        assert!(config.storage.data_dir.ends_with(APP_DIR_NAME));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&dir.path().join("config.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_parse_overrides() {
        let config = ConfigFile::parse(
            "[storage]\ndata_dir = /var/lib/geofences\n\
             [tracking]\ninterval_secs = 5\n\
             [history]\nmax_events = 20\n",
        )
        .unwrap();

        assert_eq!(config.storage.data_dir, PathBuf::from("/var/lib/geofences"));
        assert_eq!(config.tracking.interval_secs, 5);
        assert_eq!(config.tracking.provider_timeout_secs, 10);
        assert_eq!(config.history.max_events, 20);
        assert_eq!(
            config.geofences_path(),
            PathBuf::from("/var/lib/geofences/geofences.json")
        );
    }

    #[test]
    fn test_zero_is_rejected() {
        let err = ConfigFile::parse("[history]\nmax_events = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "max_events"));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = ConfigFile::parse("[tracking]\ninterval_secs = soon\n").unwrap_err();
        assert!(err.to_string().contains("interval_secs"));
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.storage.data_dir = dir.path().join("data");
        config.tracking.interval_secs = 15;
        config.history.max_events = 42;
        config.save_to(&path).unwrap();

        assert_eq!(ConfigFile::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_derived_library_configs() {
        let mut config = ConfigFile::default();
        config.tracking.interval_secs = 2;
        config.tracking.sink_timeout_ms = 250;
        config.history.max_events = 7;

        let session = config.session_config();
        assert_eq!(session.interval, Duration::from_secs(2));
        assert_eq!(session.sink_timeout, Duration::from_millis(250));
        assert_eq!(config.event_log_config().max_events, 7);
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/data"), home.join("data"));
            assert_eq!(expand_home("~"), home);
        }
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("~other/x"), PathBuf::from("~other/x"));
    }
}
