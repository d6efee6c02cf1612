//! Addressable configuration settings.
//!
//! Each [`ConfigKey`] names one `section.key` pair in `config.ini` and knows
//! how to read and write it on a [`ConfigFile`], applying the same checks as
//! the loader.

use std::fmt;
use std::str::FromStr;

use super::{expand_home, ConfigError, ConfigFile};

/// A single configuration setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    StorageDataDir,
    TrackingIntervalSecs,
    TrackingProviderTimeoutSecs,
    TrackingSinkTimeoutMs,
    HistoryMaxEvents,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::StorageDataDir,
            ConfigKey::TrackingIntervalSecs,
            ConfigKey::TrackingProviderTimeoutSecs,
            ConfigKey::TrackingSinkTimeoutMs,
            ConfigKey::HistoryMaxEvents,
        ]
    }

    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::StorageDataDir => "storage",
            ConfigKey::TrackingIntervalSecs
            | ConfigKey::TrackingProviderTimeoutSecs
            | ConfigKey::TrackingSinkTimeoutMs => "tracking",
            ConfigKey::HistoryMaxEvents => "history",
        }
    }

    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::StorageDataDir => "data_dir",
            ConfigKey::TrackingIntervalSecs => "interval_secs",
            ConfigKey::TrackingProviderTimeoutSecs => "provider_timeout_secs",
            ConfigKey::TrackingSinkTimeoutMs => "sink_timeout_ms",
            ConfigKey::HistoryMaxEvents => "max_events",
        }
    }

    /// Dotted name, e.g. `tracking.interval_secs`.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value rendered as it would appear in the file.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::StorageDataDir => config.storage.data_dir.display().to_string(),
            ConfigKey::TrackingIntervalSecs => config.tracking.interval_secs.to_string(),
            ConfigKey::TrackingProviderTimeoutSecs => {
                config.tracking.provider_timeout_secs.to_string()
            }
            ConfigKey::TrackingSinkTimeoutMs => config.tracking.sink_timeout_ms.to_string(),
            ConfigKey::HistoryMaxEvents => config.history.max_events.to_string(),
        }
    }

    /// Parse `value` and store it. The config is untouched on error.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::StorageDataDir => {
                if value.is_empty() {
                    return Err(self.invalid(value, "must not be empty"));
                }
                config.storage.data_dir = expand_home(value);
            }
            ConfigKey::TrackingIntervalSecs => {
                config.tracking.interval_secs = self.parse_positive(value)?;
            }
            ConfigKey::TrackingProviderTimeoutSecs => {
                config.tracking.provider_timeout_secs = self.parse_positive(value)?;
            }
            ConfigKey::TrackingSinkTimeoutMs => {
                config.tracking.sink_timeout_ms = self.parse_positive(value)?;
            }
            ConfigKey::HistoryMaxEvents => {
                config.history.max_events = self.parse_positive(value)?;
            }
        }
        Ok(())
    }

    fn parse_positive<T>(&self, value: &str) -> Result<T, ConfigError>
    where
        T: FromStr + PartialOrd + Default,
    {
        match value.parse::<T>() {
            Ok(parsed) if parsed > T::default() => Ok(parsed),
            Ok(_) => Err(self.invalid(value, "must be greater than zero")),
            Err(_) => Err(self.invalid(value, "expected a whole number")),
        }
    }

    fn invalid(&self, value: &str, reason: &str) -> ConfigError {
        super::invalid(self.section(), self.key_name(), value, reason)
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.section(), self.key_name())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| format!("unknown configuration key '{}'", s))
    }
}
