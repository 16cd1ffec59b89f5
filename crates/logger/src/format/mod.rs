//! Rendering of records into text

mod line;
mod only_msg;
mod table;

pub use line::LineFormat;
pub use only_msg::OnlyMsgFormat;
pub use table::{
    DEFAULT_MAX_PRINT_TIMES, DEFAULT_MAX_SINGLE_LOG_LENGTH, LogHeader, TableConfig, TableFormat,
};

use crate::LogRecord;

/// `chrono` pattern used for record timestamps.
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Renders a record into text.
pub trait LogFormat: Send + Sync + 'static {
    /// Render `record`
    fn format(&self, record: &LogRecord) -> String;
}

impl<F> LogFormat for F
where
    F: Fn(&LogRecord) -> String + Send + Sync + 'static,
{
    fn format(&self, record: &LogRecord) -> String {
        self(record)
    }
}

pub(crate) fn format_time(record: &LogRecord) -> String {
    record.time.format(TIME_FORMAT).to_string()
}

#[cfg(feature = "color")]
pub(crate) const fn level_color(level: crate::Level) -> termcolor::Color {
    use crate::Level;
    use termcolor::Color;

    match level {
        Level::Verbose => Color::White,
        Level::Debug => Color::Blue,
        Level::Info => Color::Green,
        Level::Warn => Color::Yellow,
        Level::Error => Color::Red,
        Level::Assert => Color::Magenta,
    }
}
