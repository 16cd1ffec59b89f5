use super::LevelFilter;
use crate::{Level, Logger, Pipeline, Plugin, PluginScope, Result, StdoutLogger};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Configuration of [`LogPrinter`].
#[derive(Clone)]
pub struct LogPrinterConfig {
    /// Lowest printed level, used when `level_set` is empty
    pub level: Level,
    /// Exact set of printed levels
    pub level_set: BTreeSet<Level>,
    /// Sink receiving printed records
    pub logger: Arc<dyn Logger>,
}

impl Default for LogPrinterConfig {
    fn default() -> Self {
        Self {
            level: Level::Verbose,
            level_set: BTreeSet::new(),
            logger: Arc::new(StdoutLogger::new()),
        }
    }
}

impl LogPrinterConfig {
    /// Print exactly the given levels
    pub fn levels(&mut self, levels: impl IntoIterator<Item = Level>) -> &mut Self {
        self.level_set = levels.into_iter().collect();
        self
    }

    /// Send records to `logger`
    pub fn logger(&mut self, logger: impl Logger) -> &mut Self {
        self.logger = Arc::new(logger);
        self
    }
}

impl fmt::Debug for LogPrinterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogPrinterConfig")
            .field("level", &self.level)
            .field("level_set", &self.level_set)
            .finish_non_exhaustive()
    }
}

/// Hands records to a [`Logger`] in the `Output` phase.
///
/// Records whose level is not allowed halt here, so later phases do not see
/// them either.
pub struct LogPrinter {
    filter: LevelFilter,
    logger: Arc<dyn Logger>,
}

impl LogPrinter {
    /// Whether records of `level` are printed.
    #[must_use]
    pub fn allows(&self, level: Level) -> bool {
        self.filter.allows(level)
    }

    /// The sink records are printed to.
    #[must_use]
    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }
}

impl fmt::Debug for LogPrinter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogPrinter")
            .field("levels", self.filter.levels())
            .finish_non_exhaustive()
    }
}

impl Plugin for LogPrinter {
    const KEY: &'static str = "LogPrinter";
    type Config = LogPrinterConfig;

    fn from_config(config: Self::Config) -> Result<Self> {
        Ok(Self {
            filter: LevelFilter::new(config.level, &config.level_set),
            logger: config.logger,
        })
    }

    fn install(plugin: Arc<Self>, scope: &mut PluginScope<'_>) -> Result<()> {
        scope.intercept(&Pipeline::OUTPUT, move |chain| {
            if !plugin.filter.allows(chain.subject().level) {
                return chain.finish();
            }
            plugin.logger.log(chain.subject());
            chain.proceed()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CaptureLogger;
    use crate::{LogRecord, PluginRegistry};

    fn pipeline(config: LogPrinterConfig) -> Pipeline {
        let mut pipeline = Pipeline::logging();
        PluginRegistry::new()
            .install::<LogPrinter>(&mut pipeline, config)
            .unwrap();
        pipeline
    }

    #[test]
    fn test_level_set_filters_records() {
        let capture = CaptureLogger::new();
        let mut config = LogPrinterConfig::default();
        config
            .levels([Level::Warn, Level::Error])
            .logger(capture.clone());
        let pipeline = pipeline(config);

        for level in Level::ALL {
            let _ = pipeline.execute(LogRecord::new(level, "tag", level.as_str()));
        }

        assert_eq!(capture.lines(), vec!["WARN".to_string(), "ERROR".to_string()]);
    }

    #[test]
    fn test_threshold_used_without_level_set() {
        let capture = CaptureLogger::new();
        let mut config = LogPrinterConfig {
            level: Level::Error,
            ..LogPrinterConfig::default()
        };
        config.logger(capture.clone());
        let pipeline = pipeline(config);

        let dropped = pipeline.execute(LogRecord::new(Level::Info, "tag", "info")).unwrap();
        assert!(dropped.is_none());
        let delivered = pipeline.execute(LogRecord::new(Level::Assert, "tag", "boom")).unwrap();
        assert!(delivered.is_some());
        assert_eq!(capture.count(), 1);
    }
}
