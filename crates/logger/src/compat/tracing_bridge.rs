//! Bridges between `tracing` and a log factory

use crate::{Level, LogFactory, LogFormat, LogRecord, Logger, OnlyMsgFormat};
use std::fmt::{self, Write};
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Target of the events emitted by [`TracingLogger`].
pub const TRACING_TARGET: &str = "logpipe";

const CRATE_TARGET: &str = "logpipe_logger";

/// A tracing layer that submits events to a [`LogFactory`].
///
/// The event target becomes the tag and enclosing span names prefix the
/// message. Events emitted by this crate itself are skipped.
#[derive(Debug, Clone)]
pub struct TracingBridge {
    factory: LogFactory,
}

impl TracingBridge {
    /// Create a new tracing bridge
    #[must_use]
    pub const fn new(factory: LogFactory) -> Self {
        Self { factory }
    }
}

impl<S> Layer<S> for TracingBridge
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let target = metadata.target();
        if target == TRACING_TARGET || target.starts_with(CRATE_TARGET) {
            return;
        }

        let level = match *metadata.level() {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warn,
            tracing::Level::INFO => Level::Info,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::TRACE => Level::Verbose,
        };

        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let spans: Vec<&str> = ctx
            .event_scope(event)
            .map(|scope| scope.from_root().map(|span| span.name()).collect())
            .unwrap_or_default();

        let message = visitor.finish();
        let message = if spans.is_empty() {
            message
        } else {
            format!("{}: {message}", spans.join("::"))
        };

        let mut record = LogRecord::new(level, target, message);
        record.location = None;
        // Failures are not reported through tracing from inside a layer.
        let _ = self.factory.submit(record);
    }
}

/// Collects the message and the remaining fields of an event.
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn field(&mut self, field: &Field, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{}={value}", field.name());
    }

    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.field(field, format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.field(field, format_args!("{value:?}"));
        }
    }
}

/// Installs a global subscriber whose only layer is a [`TracingBridge`].
///
/// # Example
/// ```no_run
/// use logpipe_logger::{LogFactory, compat::init_tracing_bridge};
///
/// let factory = LogFactory::builder().build();
/// init_tracing_bridge(factory).expect("Failed to set tracing bridge");
/// tracing::info!(target: "Http", "listening");
/// ```
///
/// # Errors
///
/// Fails if a global subscriber is already set.
pub fn init_tracing_bridge(factory: LogFactory) -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::prelude::*;

    tracing_subscriber::registry()
        .with(TracingBridge::new(factory))
        .try_init()?;
    Ok(())
}

/// A [`Logger`] that re-emits printed records as `tracing` events with
/// target [`TRACING_TARGET`].
///
/// [`Level::Verbose`] maps to `TRACE` and [`Level::Assert`] to `ERROR`.
#[derive(Clone)]
pub struct TracingLogger {
    format: Arc<dyn LogFormat>,
}

impl TracingLogger {
    /// Emit the content of each record
    #[must_use]
    pub fn new() -> Self {
        Self::with_format(OnlyMsgFormat)
    }

    /// Emit records rendered with `format`
    pub fn with_format(format: impl LogFormat) -> Self {
        Self {
            format: Arc::new(format),
        }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TracingLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracingLogger").finish_non_exhaustive()
    }
}

impl Logger for TracingLogger {
    fn log(&self, record: &LogRecord) {
        let text = self.format(record);
        let tag = record.tag.as_str();
        let location = record.location_string();
        match record.level {
            Level::Verbose => tracing::trace!(target: TRACING_TARGET, tag, %location, "{text}"),
            Level::Debug => tracing::debug!(target: TRACING_TARGET, tag, %location, "{text}"),
            Level::Info => tracing::info!(target: TRACING_TARGET, tag, %location, "{text}"),
            Level::Warn => tracing::warn!(target: TRACING_TARGET, tag, %location, "{text}"),
            Level::Error => tracing::error!(target: TRACING_TARGET, tag, %location, "{text}"),
            Level::Assert => {
                tracing::error!(target: TRACING_TARGET, tag, %location, assert = true, "{text}");
            }
        }
    }

    fn log_format(&self) -> &dyn LogFormat {
        self.format.as_ref()
    }
}
