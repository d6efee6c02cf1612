//! Logging setup.
//!
//! Console output goes to stderr. When a log directory is configured, a
//! second non-blocking layer appends plain-text records to
//! `<dir>/geofence-monitor.log`. `RUST_LOG` overrides the default filter.

use std::io;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LOG_FILE_NAME;

/// Logging options.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Enable debug output for this crate.
    pub verbose: bool,
    /// Directory for the log file; `None` logs to stderr only.
    pub log_dir: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    fn default_directive(&self) -> &'static str {
        if self.verbose {
            "info,geofence_monitor=debug"
        } else {
            "info"
        }
    }
}

/// Keeps the file writer flushing. Drop it on shutdown, not before.
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global subscriber.
///
/// Fails if the log directory cannot be created or a global subscriber is
/// already set.
pub fn init_logging(config: LoggingConfig) -> io::Result<LoggingGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    let console = fmt::layer().with_writer(io::stderr).with_target(false);

    let (file_layer, guard) = match &config.log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard { _file: guard })
}
