//! Console logger used by the printer plugin by default

use crate::{Level, LogFormat, LogRecord, Logger, TableFormat};
use parking_lot::Mutex;
use std::fmt;
use std::io::Write;
use std::sync::Arc;

#[cfg(feature = "color")]
use termcolor::{ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Writes rendered records to stdout.
///
/// With the `color` feature the whole block is tinted by level when stdout
/// is a terminal.
pub struct StdoutLogger {
    format: Arc<dyn LogFormat>,
    /// Lock for stdout (to prevent interleaving)
    #[cfg(not(feature = "color"))]
    stdout: Arc<Mutex<std::io::Stdout>>,
    #[cfg(feature = "color")]
    stdout: Arc<Mutex<StandardStream>>,
}

impl StdoutLogger {
    /// Create a stdout logger rendering records as tables
    #[must_use]
    pub fn new() -> Self {
        Self::with_format(TableFormat::default())
    }

    /// Create a stdout logger with a specific format
    pub fn with_format(format: impl LogFormat) -> Self {
        Self {
            format: Arc::new(format),
            #[cfg(not(feature = "color"))]
            stdout: Arc::new(Mutex::new(std::io::stdout())),
            #[cfg(feature = "color")]
            stdout: Arc::new(Mutex::new(StandardStream::stdout(ColorChoice::Auto))),
        }
    }

    #[cfg(feature = "color")]
    fn write(&self, level: Level, text: &str) {
        let mut stdout = self.stdout.lock();
        let color = crate::format::level_color(level);
        let _ = stdout.set_color(
            ColorSpec::new()
                .set_fg(Some(color))
                .set_dimmed(level == Level::Verbose),
        );
        let _ = writeln!(stdout, "{text}");
        let _ = stdout.reset();
        let _ = stdout.flush();
    }

    #[cfg(not(feature = "color"))]
    fn write(&self, _level: Level, text: &str) {
        let mut stdout = self.stdout.lock();
        let _ = writeln!(stdout, "{text}");
        let _ = stdout.flush();
    }
}

impl Default for StdoutLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StdoutLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StdoutLogger").finish_non_exhaustive()
    }
}

impl Logger for StdoutLogger {
    fn log(&self, record: &LogRecord) {
        let text = self.format(record);
        self.write(record.level, &text);
    }

    fn log_format(&self) -> &dyn LogFormat {
        self.format.as_ref()
    }

    fn flush(&self) {
        let _ = self.stdout.lock().flush();
    }
}
