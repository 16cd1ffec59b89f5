//! Bridge from the `log` crate into a log factory

use crate::{Level, LogFactory, LogRecord};
use log::{LevelFilter, Log, Metadata};

/// Routes `log` records into a [`LogFactory`]; the record target becomes
/// the tag.
///
/// `log` only exposes a borrowed file name, so bridged records carry no
/// caller location.
#[derive(Debug, Clone)]
pub struct LogBridge {
    factory: LogFactory,
    max_level: LevelFilter,
}

impl LogBridge {
    /// Create a bridge accepting every level
    #[must_use]
    pub const fn new(factory: LogFactory) -> Self {
        Self {
            factory,
            max_level: LevelFilter::Trace,
        }
    }

    /// Drop records above `max_level`
    #[must_use]
    pub fn with_max_level(mut self, max_level: LevelFilter) -> Self {
        self.max_level = max_level;
        self
    }
}

impl Log for LogBridge {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut bridged = LogRecord::new(
            map_level(record.level()),
            record.target(),
            record.args().to_string(),
        );
        bridged.location = None;

        if let Err(e) = self.factory.submit(bridged) {
            tracing::warn!(log_target = record.target(), error = %e, "bridged log record dropped");
        }
    }

    fn flush(&self) {
        self.factory.flush();
    }
}

/// Map `log` levels to ours; `Trace` becomes [`Level::Verbose`]
const fn map_level(level: log::Level) -> Level {
    match level {
        log::Level::Error => Level::Error,
        log::Level::Warn => Level::Warn,
        log::Level::Info => Level::Info,
        log::Level::Debug => Level::Debug,
        log::Level::Trace => Level::Verbose,
    }
}

/// Installs a [`LogBridge`] as the global `log` logger.
///
/// # Example
/// ```no_run
/// use logpipe_logger::{LogFactory, compat::init_log_bridge};
///
/// let factory = LogFactory::builder().build();
/// init_log_bridge(factory, log::LevelFilter::Info).expect("Failed to set log bridge");
/// log::info!(target: "Http", "listening");
/// ```
///
/// # Errors
///
/// Fails if a global `log` logger is already set.
pub fn init_log_bridge(
    factory: LogFactory,
    max_level: LevelFilter,
) -> Result<(), log::SetLoggerError> {
    // log::set_logger requires 'static
    let bridge = Box::leak(Box::new(LogBridge::new(factory).with_max_level(max_level)));
    log::set_logger(bridge)?;
    log::set_max_level(max_level);
    Ok(())
}
