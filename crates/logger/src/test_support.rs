//! In-memory sinks for tests
//!
//! Available with the `test-support` feature.

use crate::{LogFormat, LogRecord, LogStore, Logger, OnlyMsgFormat};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// A logger that keeps every rendered record in memory.
///
/// Clones share the same buffer, so a clone can be installed into a printer
/// while the test keeps the original for assertions.
#[derive(Clone)]
pub struct CaptureLogger {
    lines: Arc<Mutex<Vec<String>>>,
    format: Arc<dyn LogFormat>,
}

impl CaptureLogger {
    /// Capture the content of each record
    #[must_use]
    pub fn new() -> Self {
        Self::with_format(OnlyMsgFormat)
    }

    /// Capture records rendered with `format`
    pub fn with_format(format: impl LogFormat) -> Self {
        Self {
            lines: Arc::new(Mutex::new(Vec::new())),
            format: Arc::new(format),
        }
    }

    /// Rendered records, oldest first
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// All rendered records joined by newlines
    #[must_use]
    pub fn logs(&self) -> String {
        self.lines.lock().join("\n")
    }

    /// Number of logged records
    #[must_use]
    pub fn count(&self) -> usize {
        self.lines.lock().len()
    }

    /// Check if any rendered record contains `text`
    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.lines.lock().iter().any(|line| line.contains(text))
    }

    /// Clear captured records
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Default for CaptureLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CaptureLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureLogger")
            .field("lines", &self.count())
            .finish_non_exhaustive()
    }
}

impl Logger for CaptureLogger {
    fn log(&self, record: &LogRecord) {
        let line = self.format(record);
        self.lines.lock().push(line);
    }

    fn log_format(&self) -> &dyn LogFormat {
        self.format.as_ref()
    }
}

/// A store that keeps clones of every stored record.
#[derive(Debug, Clone, Default)]
pub struct CaptureStore {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl CaptureStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored records, oldest first
    #[must_use]
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().clone()
    }

    /// Number of stored records
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.lock().len()
    }

    /// Clear stored records
    pub fn clear(&self) {
        self.records.lock().clear();
    }
}

impl LogStore for CaptureStore {
    fn store(&self, record: &LogRecord) {
        self.records.lock().push(record.clone());
    }
}
