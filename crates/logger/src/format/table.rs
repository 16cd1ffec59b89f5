//! Bordered multi-line format
//!
//! ```text
//! ┌────────────────────
//! │ Thread: main Tag: Http Level: INFO Time: 2024-06-20 22:41:00.000
//! ├┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄
//! │ src/main.rs:12:5
//! ├┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄┄
//! │ request finished
//! └────────────────────
//! ```

use super::{LogFormat, format_time};
use crate::{Error, LogRecord, Result};
use serde::{Deserialize, Serialize};

/// Default maximum number of bytes printed per content segment.
pub const DEFAULT_MAX_SINGLE_LOG_LENGTH: usize = 1000;

/// Default maximum number of printed content segments.
pub const DEFAULT_MAX_PRINT_TIMES: usize = usize::MAX;

const MAX_ELLIPSIS_CHARS: usize = 10;
const MAX_BORDER_WIDTH: usize = 100;

/// Which fields appear in the table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogHeader {
    /// Show the thread name
    pub thread: bool,
    /// Show the tag
    pub tag: bool,
    /// Show the level
    pub level: bool,
    /// Show the time
    pub time: bool,
}

impl Default for LogHeader {
    fn default() -> Self {
        Self {
            thread: true,
            tag: true,
            level: true,
            time: true,
        }
    }
}

/// Configuration of [`TableFormat`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    /// Maximum number of bytes per printed content segment
    pub max_single_log_length: usize,
    /// Maximum number of printed content segments (or lines)
    pub max_print_times: usize,
    /// Header fields
    pub header: LogHeader,
    /// Line printed when content was left out, at most 10 characters
    pub ellipsis: Option<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_single_log_length: DEFAULT_MAX_SINGLE_LOG_LENGTH,
            max_print_times: DEFAULT_MAX_PRINT_TIMES,
            header: LogHeader::default(),
            ellipsis: None,
        }
    }
}

/// Renders a record as a bordered block: header, caller location, content
/// and the attached error.
///
/// Content longer than `max_single_log_length` bytes is cut into segments of
/// exactly that many bytes. The cut ignores character boundaries, so a
/// multi-byte character straddling a boundary is printed as U+FFFD on both
/// sides; segment boundaries therefore depend only on the byte length.
#[derive(Debug, Clone, Default)]
pub struct TableFormat {
    config: TableConfig,
}

impl TableFormat {
    /// Validates `config` and builds the format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEllipsis`] if the ellipsis is longer than 10
    /// characters and [`Error::InvalidConfig`] if `max_single_log_length` is
    /// zero.
    pub fn new(config: TableConfig) -> Result<Self> {
        if let Some(ellipsis) = &config.ellipsis {
            if ellipsis.chars().count() > MAX_ELLIPSIS_CHARS {
                return Err(Error::InvalidEllipsis(ellipsis.clone()));
            }
        }
        if config.max_single_log_length == 0 {
            return Err(Error::InvalidConfig {
                plugin: "TableFormat",
                reason: "max_single_log_length must be positive".to_string(),
            });
        }
        Ok(Self { config })
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &TableConfig {
        &self.config
    }

    fn header(&self, record: &LogRecord) -> String {
        let header = &self.config.header;
        let mut parts = Vec::with_capacity(4);
        if header.thread {
            parts.push(format!("Thread: {}", record.thread_name));
        }
        if header.tag {
            parts.push(format!("Tag: {}", record.tag));
        }
        if header.level {
            parts.push(format!("Level: {}", record.level));
        }
        if header.time {
            parts.push(format!("Time: {}", format_time(record)));
        }
        parts.join(" ")
    }

    fn push_ellipsis(&self, body: &mut String) {
        if let Some(ellipsis) = &self.config.ellipsis {
            push_info(body, ellipsis);
        }
    }

    fn push_lines(&self, body: &mut String, content: &str) {
        for (index, line) in content.lines().enumerate() {
            if index >= self.config.max_print_times {
                self.push_ellipsis(body);
                return;
            }
            push_info(body, line);
        }
    }

    fn push_segments(&self, body: &mut String, content: &str) {
        let max = self.config.max_single_log_length;
        let mut count = 0;
        for line in content.lines() {
            let mut bytes = line.as_bytes();
            loop {
                if count >= self.config.max_print_times {
                    self.push_ellipsis(body);
                    return;
                }
                let cut = bytes.len().min(max);
                push_info(body, &String::from_utf8_lossy(&bytes[..cut]));
                count += 1;
                bytes = &bytes[cut..];
                if bytes.is_empty() {
                    break;
                }
            }
        }
    }
}

impl LogFormat for TableFormat {
    fn format(&self, record: &LogRecord) -> String {
        let content = record.content_text();
        let needs_cut = content.len() > self.config.max_single_log_length;
        let width = if needs_cut {
            self.config.max_single_log_length
        } else {
            content.len()
        }
        .clamp(1, MAX_BORDER_WIDTH);

        let mut body = String::with_capacity(content.len() + 4 * width + 128);
        push_border(&mut body, '┌', '─', width);
        push_info(&mut body, &self.header(record));
        push_border(&mut body, '├', '┄', width);
        push_info(&mut body, &record.location_string());
        push_border(&mut body, '├', '┄', width);

        if needs_cut {
            self.push_segments(&mut body, &content);
        } else {
            self.push_lines(&mut body, &content);
        }

        if let Some(throwable) = &record.throwable {
            push_border(&mut body, '├', '┄', width);
            for line in throwable.render_lines() {
                push_info(&mut body, &line);
            }
        }

        body.push('└');
        body.extend(std::iter::repeat_n('─', width));
        body
    }
}

fn push_border(body: &mut String, corner: char, fill: char, width: usize) {
    body.push(corner);
    body.extend(std::iter::repeat_n(fill, width));
    body.push('\n');
}

fn push_info(body: &mut String, text: &str) {
    body.push_str("│ ");
    body.push_str(text);
    body.push('\n');
}
