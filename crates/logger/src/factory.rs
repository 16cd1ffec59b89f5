//! Log factory: owns the frozen pipeline and hands out logcats

use crate::{
    LogCat, LogPrinter, LogRecord, LogStorage, OnceTable, Pipeline, Plugin, PluginRegistry,
    Result,
};
use std::sync::Arc;
use std::time::Instant;

/// Tag used by [`LogFactory::default_logcat`] unless configured otherwise.
pub const DEFAULT_TAG: &str = "Default";

#[derive(Debug)]
struct Shared {
    pipeline: Pipeline,
    plugins: PluginRegistry,
    once: OnceTable,
    default_tag: String,
}

/// Configured logging pipeline shared by every [`LogCat`] it creates.
///
/// The pipeline is frozen when the factory is built, so a factory can be
/// cloned and used from any number of threads.
#[derive(Debug, Clone)]
pub struct LogFactory {
    shared: Arc<Shared>,
}

impl LogFactory {
    /// Starts configuring a factory over the standard logging phases.
    #[must_use]
    pub fn builder() -> LogFactoryBuilder {
        LogFactoryBuilder::new()
    }

    /// A logcat for `tag`.
    pub fn logcat(&self, tag: impl Into<String>) -> LogCat {
        LogCat::new(self.clone(), tag.into())
    }

    /// A logcat for the configured default tag.
    #[must_use]
    pub fn default_logcat(&self) -> LogCat {
        self.logcat(self.shared.default_tag.clone())
    }

    /// A logcat tagged with the short name of `T`.
    #[must_use]
    pub fn logcat_for<T: ?Sized>(&self) -> LogCat {
        self.logcat(short_type_name::<T>())
    }

    /// The configured default tag.
    #[must_use]
    pub fn default_tag(&self) -> &str {
        &self.shared.default_tag
    }

    /// The installed instance of `P`, if any.
    #[must_use]
    pub fn plugin<P: Plugin>(&self) -> Option<Arc<P>> {
        self.shared.plugins.get::<P>()
    }

    /// The frozen pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.shared.pipeline
    }

    /// Runs `record` through once-per-tag suppression and the pipeline.
    ///
    /// Returns whether the record reached the end of the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing interceptor.
    pub fn submit(&self, record: LogRecord) -> Result<bool> {
        if let Some(window) = record.once {
            if !self.shared.once.check(&record.tag, window, Instant::now()) {
                return Ok(false);
            }
        }
        Ok(self.shared.pipeline.execute(record)?.is_some())
    }

    /// Flushes the printer's logger and the storage's store.
    pub fn flush(&self) {
        if let Some(printer) = self.plugin::<LogPrinter>() {
            printer.logger().flush();
        }
        if let Some(storage) = self.plugin::<LogStorage>() {
            storage.store().flush();
        }
    }
}

/// Builder for [`LogFactory`].
#[derive(Debug)]
pub struct LogFactoryBuilder {
    pipeline: Pipeline,
    plugins: PluginRegistry,
    default_tag: String,
}

impl Default for LogFactoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LogFactoryBuilder {
    /// Builder over [`Pipeline::logging`] with no plugin installed.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pipeline: Pipeline::logging(),
            plugins: PluginRegistry::new(),
            default_tag: DEFAULT_TAG.to_string(),
        }
    }

    /// Sets the tag of [`LogFactory::default_logcat`].
    #[must_use]
    pub fn default_tag(mut self, tag: impl Into<String>) -> Self {
        self.default_tag = tag.into();
        self
    }

    /// Installs `P` with `config`, replacing any earlier install of `P`.
    ///
    /// # Errors
    ///
    /// Returns the plugin's validation or registration error.
    pub fn install<P: Plugin>(mut self, config: P::Config) -> Result<Self> {
        self.plugins.install::<P>(&mut self.pipeline, config)?;
        Ok(self)
    }

    /// Installs `P` with a default config adjusted by `configure`.
    ///
    /// # Errors
    ///
    /// Returns the plugin's validation or registration error.
    pub fn install_with<P: Plugin>(self, configure: impl FnOnce(&mut P::Config)) -> Result<Self> {
        let mut config = P::Config::default();
        configure(&mut config);
        self.install::<P>(config)
    }

    /// The pipeline, for custom phases and ad-hoc interceptors.
    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    /// Freezes the pipeline and builds the factory.
    #[must_use]
    pub fn build(self) -> LogFactory {
        tracing::debug!(
            plugins = ?self.plugins,
            interceptors = self.pipeline.interceptor_count(),
            "log factory built"
        );
        LogFactory {
            shared: Arc::new(Shared {
                pipeline: self.pipeline,
                plugins: self.plugins,
                once: OnceTable::new(),
                default_tag: self.default_tag,
            }),
        }
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let name = std::any::type_name::<T>();
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::CaptureLogger;
    use crate::{Chain, Level, LogSwitch};
    use std::time::Duration;

    struct HttpClient;

    #[test]
    fn test_logcat_tags() {
        let factory = LogFactory::builder().default_tag("App").build();
        assert_eq!(factory.default_logcat().tag(), "App");
        assert_eq!(factory.logcat("Net").tag(), "Net");
        assert_eq!(factory.logcat_for::<HttpClient>().tag(), "HttpClient");
        assert_eq!(factory.logcat_for::<Vec<String>>().tag(), "Vec");
        assert_eq!(LogFactory::builder().build().default_tag(), DEFAULT_TAG);
    }

    #[test]
    fn test_plugin_lookup() {
        let factory = LogFactory::builder()
            .install_with::<LogSwitch>(|config| config.open = false)
            .unwrap()
            .build();
        assert!(!factory.plugin::<LogSwitch>().unwrap().is_open());
        assert!(factory.plugin::<LogPrinter>().is_none());
    }

    #[test]
    fn test_submit_applies_once_window() {
        let capture = CaptureLogger::new();
        let factory = LogFactory::builder()
            .install_with::<LogPrinter>(|config| {
                config.logger(capture.clone());
            })
            .unwrap()
            .build();

        let window = Duration::from_secs(60);
        let first = LogRecord::new(Level::Info, "net", "a").with_once(window);
        let second = LogRecord::new(Level::Info, "net", "b").with_once(window);
        assert!(factory.submit(first).unwrap());
        assert!(!factory.submit(second).unwrap());
        assert_eq!(capture.lines(), vec!["a".to_string()]);
    }

    #[test]
    fn test_pipeline_mut_accepts_ad_hoc_interceptors() {
        let mut builder = LogFactory::builder();
        builder
            .pipeline_mut()
            .intercept(&Pipeline::SETUP, |chain: Chain<'_>| {
                if chain.subject().tag == "muted" {
                    chain.finish()
                } else {
                    chain.proceed()
                }
            })
            .unwrap();
        let factory = builder.build();

        assert!(!factory.submit(LogRecord::new(Level::Info, "muted", "x")).unwrap());
        assert!(factory.submit(LogRecord::new(Level::Info, "loud", "x")).unwrap());
    }
}
