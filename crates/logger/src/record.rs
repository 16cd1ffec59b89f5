//! Log record threaded through the pipeline

use crate::Level;
use chrono::{DateTime, Local};
use serde::Serialize;
use serde_json::Value;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::borrow::Cow;
use std::fmt;
use std::panic::Location;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

type LazyText = LazyLock<String, Box<dyn FnOnce() -> String + Send>>;

/// Content of a log record.
#[derive(Debug, Clone)]
pub enum Content {
    /// Structured data that has not been turned into text yet
    Value(Value),
    /// Final text
    Text(String),
    /// Text produced on first read
    Lazy(Arc<LazyText>),
}

impl Content {
    /// Serializes any value into structured content.
    ///
    /// Values that cannot be represented as JSON become text carrying the
    /// serialization error.
    pub fn value<T: Serialize + ?Sized>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::Value(value),
            Err(e) => Self::Text(format!("<unserializable value: {e}>")),
        }
    }

    /// Text computed by `f` the first time a stage reads it.
    pub fn lazy(f: impl FnOnce() -> String + Send + 'static) -> Self {
        let f: Box<dyn FnOnce() -> String + Send> = Box::new(f);
        Self::Lazy(Arc::new(LazyLock::new(f)))
    }

    /// Whether the content is already text (eager or lazy).
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_) | Self::Lazy(_))
    }

    /// The content as text. Structured values are rendered as compact JSON.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Value(value) => Cow::Owned(value.to_string()),
            Self::Text(text) => Cow::Borrowed(text),
            Self::Lazy(lazy) => Cow::Borrowed(LazyLock::force(lazy.as_ref()).as_str()),
        }
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Cow<'_, str>> for Content {
    fn from(text: Cow<'_, str>) -> Self {
        Self::Text(text.into_owned())
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

/// An error attached to a log record, with the stack trace of the logging
/// call.
///
/// The trace is captured as `std::backtrace` does, so it is only recorded
/// when `RUST_BACKTRACE` or `RUST_LIB_BACKTRACE` enables it.
#[derive(Clone)]
pub struct Throwable {
    error: Arc<dyn std::error::Error + Send + Sync + 'static>,
    backtrace: Arc<Backtrace>,
}

impl Throwable {
    /// Wraps an error, capturing the current stack trace.
    pub fn new(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::with_backtrace(error, Backtrace::capture())
    }

    /// Wraps an error with an already captured stack trace.
    pub fn with_backtrace(
        error: impl Into<Box<dyn std::error::Error + Send + Sync>>,
        backtrace: Backtrace,
    ) -> Self {
        Self {
            error: Arc::from(error.into()),
            backtrace: Arc::new(backtrace),
        }
    }

    /// The wrapped error.
    #[must_use]
    pub fn error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.error.as_ref()
    }

    /// Errors in the `source()` chain, nearest cause first.
    pub fn causes(&self) -> impl Iterator<Item = &(dyn std::error::Error + 'static)> {
        std::iter::successors(self.error.source(), |e| e.source())
    }

    /// The stack trace, if one was captured.
    #[must_use]
    pub fn backtrace(&self) -> Option<&Backtrace> {
        (self.backtrace.status() == BacktraceStatus::Captured).then_some(self.backtrace.as_ref())
    }

    /// Message, `caused by:` chain and captured stack trace, one entry per
    /// line.
    #[must_use]
    pub fn render_lines(&self) -> Vec<String> {
        let mut lines = vec![self.error.to_string()];
        lines.extend(self.causes().map(|cause| format!("  caused by: {cause}")));
        if let Some(backtrace) = self.backtrace() {
            lines.push("stack backtrace:".to_string());
            lines.extend(backtrace.to_string().lines().map(str::to_string));
        }
        lines
    }
}

impl fmt::Display for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.error, f)
    }
}

impl fmt::Debug for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.error, f)
    }
}

/// A log event. Created once per logging call and owned by the chain that
/// processes it.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Log level
    pub level: Level,
    /// Tag of the logcat that produced the record
    pub tag: String,
    /// The log content
    pub content: Content,
    /// When the record was created
    pub time: DateTime<Local>,
    /// Name of the thread that produced the record
    pub thread_name: String,
    /// Source location of the logging call
    pub location: Option<&'static Location<'static>>,
    /// Attached error, if any
    pub throwable: Option<Throwable>,
    /// Suppression window for the tag, set by [`crate::LogCat::once`]
    pub once: Option<Duration>,
}

impl LogRecord {
    /// Creates a record stamped with the current time, the current thread
    /// and the caller location.
    #[track_caller]
    pub fn new(level: Level, tag: impl Into<String>, content: impl Into<Content>) -> Self {
        let thread = std::thread::current();
        Self {
            level,
            tag: tag.into(),
            content: content.into(),
            time: Local::now(),
            thread_name: thread.name().unwrap_or("unnamed").to_string(),
            location: Some(Location::caller()),
            throwable: None,
            once: None,
        }
    }

    /// Builder-style method for setting the location
    #[must_use]
    pub const fn with_location(mut self, location: &'static Location<'static>) -> Self {
        self.location = Some(location);
        self
    }

    /// Builder-style method for attaching an error
    #[must_use]
    pub fn with_throwable(mut self, throwable: Throwable) -> Self {
        self.throwable = Some(throwable);
        self
    }

    /// Builder-style method for setting the suppression window
    #[must_use]
    pub const fn with_once(mut self, window: Duration) -> Self {
        self.once = Some(window);
        self
    }

    /// The content as text.
    #[must_use]
    pub fn content_text(&self) -> Cow<'_, str> {
        self.content.as_text()
    }

    /// Replaces the content with final text.
    pub fn set_text_content(&mut self, text: impl Into<String>) {
        self.content = Content::Text(text.into());
    }

    /// UTF-8 byte length of the content text.
    #[must_use]
    pub fn print_bytes_length(&self) -> usize {
        self.content_text().len()
    }

    /// `file:line:column` of the logging call, or `unknown`.
    #[must_use]
    pub fn location_string(&self) -> String {
        self.location.map_or_else(
            || "unknown".to_string(),
            |location| format!("{}:{}:{}", location.file(), location.line(), location.column()),
        )
    }
}
