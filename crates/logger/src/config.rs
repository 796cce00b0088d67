//! Adapter configuration and application identity

use crate::level::Level;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the logging adapter.
///
/// Supplied by the host's configuration loader and read-only for the
/// adapter's lifetime.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Minimum severity that is emitted.
    pub level: Level,
    /// Whether records are written to standard output.
    pub console: bool,
    /// Whether records are written to the rotating log file.
    pub file: bool,
    /// Directory holding the active log file and its backups.
    pub directory: PathBuf,
    /// Size threshold in megabytes before the active file is rotated;
    /// `0` disables size-based rotation.
    pub max_size: u64,
    /// Number of rotated backups to keep; `0` keeps all of them.
    pub max_backups: usize,
    /// Age in days after which backups are deleted; `0` keeps them forever.
    pub max_age: u64,
    /// Whether rotated backups are gzip-compressed.
    pub compress: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::Info,
            console: true,
            file: false,
            directory: PathBuf::from("logs"),
            max_size: 100,
            max_backups: 3,
            max_age: 28,
            compress: false,
        }
    }
}

impl LogConfig {
    /// Creates a builder initialized with the defaults.
    #[must_use]
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`LogConfig`].
#[derive(Clone, Debug)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    /// Sets the minimum severity.
    #[must_use]
    pub fn level(mut self, level: Level) -> Self {
        self.config.level = level;
        self
    }

    /// Enables or disables the console sink.
    #[must_use]
    pub fn console(mut self, console: bool) -> Self {
        self.config.console = console;
        self
    }

    /// Enables or disables the file sink.
    #[must_use]
    pub fn file(mut self, file: bool) -> Self {
        self.config.file = file;
        self
    }

    /// Sets the log directory.
    #[must_use]
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.directory = directory.into();
        self
    }

    /// Sets the rotation size threshold in megabytes.
    #[must_use]
    pub fn max_size(mut self, megabytes: u64) -> Self {
        self.config.max_size = megabytes;
        self
    }

    /// Sets the number of rotated backups to keep.
    #[must_use]
    pub fn max_backups(mut self, max_backups: usize) -> Self {
        self.config.max_backups = max_backups;
        self
    }

    /// Sets the backup retention age in days.
    #[must_use]
    pub fn max_age(mut self, days: u64) -> Self {
        self.config.max_age = days;
        self
    }

    /// Enables or disables gzip compression of rotated backups.
    #[must_use]
    pub fn compress(mut self, compress: bool) -> Self {
        self.config.compress = compress;
        self
    }

    /// Finishes the builder.
    #[must_use]
    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Static application identity embedded in every record.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppIdentity {
    /// Application name.
    pub app_name: String,
    /// Microservice name.
    pub ms_name: String,
}

impl AppIdentity {
    /// Creates a new identity.
    pub fn new(app_name: impl Into<String>, ms_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ms_name: ms_name.into(),
        }
    }
}
