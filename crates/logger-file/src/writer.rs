//! Rotating file writer

use crate::{Error, FileFormat, FileLoggerConfig, JsonLineFormat, Result};
use chrono::{Local, NaiveDate};
use logpipe_logger::{LineFormat, LogFormat, LogRecord, LogStore, Logger, TableFormat};
use parking_lot::Mutex;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime};
use tracing::{debug, warn};

struct WriterState {
    writer: Option<BufWriter<File>>,
    path: PathBuf,
    size: u64,
    date: NaiveDate,
    index: u32,
}

/// Appends rendered records to rotating log files.
///
/// Writes are serialized by an internal mutex and flushed after every
/// record. Failures never panic; they are counted and reported through
/// `tracing`.
pub struct FileLogger {
    config: FileLoggerConfig,
    format: Arc<dyn LogFormat>,
    state: Mutex<WriterState>,
    failures: AtomicU64,
}

impl FileLogger {
    /// Opens the current log file, rendering records with the configured
    /// [`FileFormat`].
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, a directory cannot be created
    /// or the file cannot be opened.
    pub fn new(config: FileLoggerConfig) -> Result<Self> {
        let format: Arc<dyn LogFormat> = match config.format {
            FileFormat::Line => Arc::new(LineFormat::plain()),
            FileFormat::Table => Arc::new(TableFormat::default()),
            FileFormat::Json => Arc::new(JsonLineFormat),
        };
        Self::open(config, format)
    }

    /// Like [`FileLogger::new`] with a custom format.
    ///
    /// # Errors
    ///
    /// See [`FileLogger::new`].
    pub fn with_format(config: FileLoggerConfig, format: impl LogFormat) -> Result<Self> {
        Self::open(config, Arc::new(format))
    }

    fn open(config: FileLoggerConfig, format: Arc<dyn LogFormat>) -> Result<Self> {
        config.validate()?;
        create_dir(&config.log_dir)?;
        if let Some(cache_dir) = &config.cache_dir {
            create_dir(cache_dir)?;
        }

        let today = Local::now().date_naive();
        let logger = Self {
            config,
            format,
            state: Mutex::new(WriterState {
                writer: None,
                path: PathBuf::new(),
                size: 0,
                date: today,
                index: 0,
            }),
            failures: AtomicU64::new(0),
        };

        {
            let mut state = logger.state.lock();
            logger.open_latest(&mut state, today)?;
            logger.maintain(&state.path)?;
        }
        Ok(logger)
    }

    /// The configuration
    #[must_use]
    pub const fn config(&self) -> &FileLoggerConfig {
        &self.config
    }

    /// Path of the file currently written to
    #[must_use]
    pub fn current_path(&self) -> PathBuf {
        self.state.lock().path.clone()
    }

    /// Number of records that could not be written
    #[must_use]
    pub fn failure_count(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Appends one record, rotating first if needed.
    ///
    /// # Errors
    ///
    /// Returns the I/O error of the rotation or the write.
    pub fn write(&self, record: &LogRecord) -> Result<()> {
        let mut line = self.format.format(record);
        line.push('\n');
        let bytes = line.len() as u64;

        let mut state = self.state.lock();
        let date = record.time.date_naive();
        if self.config.daily && date != state.date {
            self.close(&mut state)?;
            self.open_latest(&mut state, date)?;
            self.housekeep(&state.path);
        } else if self.config.max_file_size > 0
            && state.size > 0
            && state.size + bytes > self.config.max_file_size
        {
            self.rotate(&mut state)?;
        }

        if state.writer.is_none() {
            self.open_index(&mut state)?;
        }
        if let Some(writer) = state.writer.as_mut() {
            writer.write_all(line.as_bytes())?;
            // Flush after every write for immediate visibility
            writer.flush()?;
        }
        state.size += bytes;
        Ok(())
    }

    /// Flushes the current file.
    ///
    /// # Errors
    ///
    /// Returns the I/O error of the flush.
    pub fn flush(&self) -> Result<()> {
        if let Some(writer) = self.state.lock().writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn record_failure(&self, error: &Error) {
        let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
        warn!(error = %error, failures, "failed to write log file");
    }

    fn base_name(&self, date: NaiveDate) -> String {
        if self.config.daily {
            format!("{}_{}", self.config.name_prefix, date.format("%Y%m%d"))
        } else {
            self.config.name_prefix.clone()
        }
    }

    /// Continues the highest-numbered existing file for `date`.
    fn open_latest(&self, state: &mut WriterState, date: NaiveDate) -> Result<()> {
        let base = self.base_name(date);
        let index = fs::read_dir(self.config.write_dir())?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| parse_index(&entry.file_name().to_string_lossy(), &base))
            .max()
            .unwrap_or(0);

        state.date = date;
        state.index = index;
        self.open_index(state)?;
        if self.config.max_file_size > 0 && state.size >= self.config.max_file_size {
            self.rotate(state)?;
        }
        Ok(())
    }

    fn open_index(&self, state: &mut WriterState) -> Result<()> {
        let name = file_name(&self.base_name(state.date), state.index);
        let path = self.config.write_dir().join(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        state.size = file.metadata()?.len();
        state.writer = Some(BufWriter::new(file));
        debug!(path = %path.display(), size = state.size, "opened log file");
        state.path = path;
        Ok(())
    }

    fn close(&self, state: &mut WriterState) -> Result<()> {
        if let Some(mut writer) = state.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn rotate(&self, state: &mut WriterState) -> Result<()> {
        self.close(state)?;
        state.index += 1;
        self.open_index(state)?;
        self.housekeep(&state.path);
        Ok(())
    }

    /// Runs [`FileLogger::maintain`] without failing the pending write.
    fn housekeep(&self, active: &Path) {
        if let Err(e) = self.maintain(active) {
            let failures = self.failures.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(error = %e, failures, "log file maintenance failed");
        }
    }

    /// Moves expired cache files and deletes files past their retention.
    fn maintain(&self, active: &Path) -> Result<()> {
        if let Some(cache_dir) = &self.config.cache_dir {
            let cache_age = self.config.cache_age();
            for (path, age) in self.log_files(cache_dir)? {
                if path == active || age < cache_age {
                    continue;
                }
                if let Some(name) = path.file_name() {
                    move_file(&path, &self.config.log_dir.join(name))?;
                }
            }
        }

        if self.config.max_age > Duration::ZERO {
            let dirs = std::iter::once(&self.config.log_dir).chain(self.config.cache_dir.as_ref());
            for dir in dirs {
                for (path, age) in self.log_files(dir)? {
                    if path != active && age > self.config.max_age {
                        debug!(path = %path.display(), "removing expired log file");
                        fs::remove_file(&path)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Log files of this logger in `dir`, with their age.
    fn log_files(&self, dir: &Path) -> Result<Vec<(PathBuf, Duration)>> {
        let now = SystemTime::now();
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            if !is_log_file(&name.to_string_lossy(), &self.config.name_prefix) {
                continue;
            }
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }
            let age = now
                .duration_since(metadata.modified()?)
                .unwrap_or_default();
            files.push((entry.path(), age));
        }
        Ok(files)
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|source| Error::CreateDirectory {
        path: path.to_path_buf(),
        source,
    })
}

fn file_name(base: &str, index: u32) -> String {
    if index == 0 {
        format!("{base}.log")
    } else {
        format!("{base}_{index}.log")
    }
}

/// Rotation index of `name` if it is a file of `base`.
fn parse_index(name: &str, base: &str) -> Option<u32> {
    let rest = name.strip_prefix(base)?.strip_suffix(".log")?;
    if rest.is_empty() {
        return Some(0);
    }
    rest.strip_prefix('_')?.parse().ok()
}

/// Whether `name` is one of the files a logger with `prefix` writes:
/// `{prefix}.log`, `{prefix}_{n}.log` or `{prefix}_{yyyymmdd}[_{n}].log`.
fn is_log_file(name: &str, prefix: &str) -> bool {
    if parse_index(name, prefix).is_some() {
        return true;
    }
    name.strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.get(..8))
        .filter(|date| NaiveDate::parse_from_str(date, "%Y%m%d").is_ok())
        .is_some_and(|date| parse_index(name, &format!("{prefix}_{date}")).is_some())
}

/// Moves `from` to `to`, appending to `to` if it already exists.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    let moved = if to.exists() {
        fs::read(from).and_then(|contents| {
            OpenOptions::new()
                .append(true)
                .open(to)?
                .write_all(&contents)?;
            fs::remove_file(from)
        })
    } else {
        // rename fails across file systems
        fs::rename(from, to).or_else(|_| fs::copy(from, to).and_then(|_| fs::remove_file(from)))
    };
    moved.map_err(|e| {
        Error::Rotation(format!(
            "failed to move {} to {}: {e}",
            from.display(),
            to.display()
        ))
    })?;
    debug!(from = %from.display(), to = %to.display(), "moved cached log file");
    Ok(())
}

impl fmt::Debug for FileLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileLogger")
            .field("config", &self.config)
            .field("path", &self.current_path())
            .field("failures", &self.failure_count())
            .finish_non_exhaustive()
    }
}

impl Logger for FileLogger {
    fn log(&self, record: &LogRecord) {
        if let Err(e) = self.write(record) {
            self.record_failure(&e);
        }
    }

    fn log_format(&self) -> &dyn LogFormat {
        self.format.as_ref()
    }

    fn flush(&self) {
        if let Err(e) = Self::flush(self) {
            self.record_failure(&e);
        }
    }
}

impl LogStore for FileLogger {
    fn store(&self, record: &LogRecord) {
        Logger::log(self, record);
    }

    fn flush(&self) {
        Logger::flush(self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_names() {
        assert_eq!(file_name("app", 0), "app.log");
        assert_eq!(file_name("app_20240620", 3), "app_20240620_3.log");
    }

    #[test]
    fn test_parse_index() {
        assert_eq!(parse_index("app.log", "app"), Some(0));
        assert_eq!(parse_index("app_2.log", "app"), Some(2));
        assert_eq!(parse_index("app_20240620_4.log", "app_20240620"), Some(4));
        assert_eq!(parse_index("app_x.log", "app"), None);
        assert_eq!(parse_index("other.log", "app"), None);
        assert_eq!(parse_index("app.txt", "app"), None);
    }

    #[test]
    fn test_is_log_file() {
        for name in ["app.log", "app_3.log", "app_20240620.log", "app_20240620_2.log"] {
            assert!(is_log_file(name, "app"), "{name}");
        }
        for name in [
            "apple.log",
            "app2_20240101.log",
            "app-old.log",
            "app_old.log",
            "app_20241340_1.log",
            "app_20240620_x.log",
            "app.txt",
        ] {
            assert!(!is_log_file(name, "app"), "{name}");
        }
    }
}
