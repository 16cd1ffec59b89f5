//! File logger configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// How records are written to the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    /// `time [LEVEL|tag|thread] (file:line) content`
    #[default]
    Line,
    /// Bordered table
    Table,
    /// One JSON object per line
    Json,
}

/// Configuration for the file logger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggerConfig {
    /// Directory of finished log files
    pub log_dir: PathBuf,
    /// Directory written to first; files move to `log_dir` after
    /// `cache_days`
    pub cache_dir: Option<PathBuf>,
    /// File name prefix
    pub name_prefix: String,
    /// Maximum file size in bytes before rotating (0 = unlimited)
    pub max_file_size: u64,
    /// Rotated files older than this are deleted (zero = keep forever)
    pub max_age: Duration,
    /// Days a file stays in the cache directory
    pub cache_days: u32,
    /// One file per day
    pub daily: bool,
    /// Record format
    pub format: FileFormat,
}

impl Default for FileLoggerConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("logs"),
            cache_dir: None,
            name_prefix: "log".to_string(),
            max_file_size: 10 * 1024 * 1024,
            max_age: Duration::from_secs(10 * SECONDS_PER_DAY),
            cache_days: 0,
            daily: true,
            format: FileFormat::Line,
        }
    }
}

impl FileLoggerConfig {
    /// Create a new configuration builder
    #[must_use]
    pub fn builder() -> FileLoggerConfigBuilder {
        FileLoggerConfigBuilder::default()
    }

    /// How long a file stays in the cache directory.
    #[must_use]
    pub fn cache_age(&self) -> Duration {
        Duration::from_secs(u64::from(self.cache_days) * SECONDS_PER_DAY)
    }

    /// Directory the active file is written to.
    #[must_use]
    pub fn write_dir(&self) -> &PathBuf {
        self.cache_dir.as_ref().unwrap_or(&self.log_dir)
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the prefix is empty or contains a
    /// path separator.
    pub fn validate(&self) -> Result<()> {
        if self.name_prefix.is_empty() {
            return Err(Error::Configuration(
                "name_prefix must not be empty".to_string(),
            ));
        }
        if self.name_prefix.contains(['/', '\\']) {
            return Err(Error::Configuration(format!(
                "name_prefix `{}` must not contain a path separator",
                self.name_prefix
            )));
        }
        Ok(())
    }
}

/// Builder for file logger configuration
#[derive(Debug, Default)]
pub struct FileLoggerConfigBuilder {
    config: FileLoggerConfig,
}

impl FileLoggerConfigBuilder {
    /// Set the log directory
    #[must_use]
    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    /// Set the cache directory
    #[must_use]
    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.cache_dir = Some(dir.into());
        self
    }

    /// Set the file name prefix
    #[must_use]
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.name_prefix = prefix.into();
        self
    }

    /// Set the maximum file size in bytes (0 = unlimited)
    #[must_use]
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    /// Set the retention of rotated files
    #[must_use]
    pub fn max_age(mut self, age: Duration) -> Self {
        self.config.max_age = age;
        self
    }

    /// Set the days a file stays in the cache directory
    #[must_use]
    pub fn cache_days(mut self, days: u32) -> Self {
        self.config.cache_days = days;
        self
    }

    /// Enable or disable one file per day
    #[must_use]
    pub fn daily(mut self, daily: bool) -> Self {
        self.config.daily = daily;
        self
    }

    /// Set the record format
    #[must_use]
    pub fn format(mut self, format: FileFormat) -> Self {
        self.config.format = format;
        self
    }

    /// Validate and build the configuration
    ///
    /// # Errors
    ///
    /// See [`FileLoggerConfig::validate`].
    pub fn build(self) -> Result<FileLoggerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
