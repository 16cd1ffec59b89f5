//! Sink traits: loggers print records, stores persist them

use crate::{LogFormat, LogRecord};

/// Receives fully processed records from the output phase.
pub trait Logger: Send + Sync + 'static {
    /// Write a record
    fn log(&self, record: &LogRecord);

    /// The format used to render records
    fn log_format(&self) -> &dyn LogFormat;

    /// Render a record with [`Logger::log_format`]
    fn format(&self, record: &LogRecord) -> String {
        self.log_format().format(record)
    }

    /// Flush any buffered output
    fn flush(&self) {}
}

/// Receives records from the storage phase.
pub trait LogStore: Send + Sync + 'static {
    /// Persist a record
    fn store(&self, record: &LogRecord);

    /// Flush any buffered output
    fn flush(&self) {}
}
