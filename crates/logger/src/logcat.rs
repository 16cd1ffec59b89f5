//! Per-tag logging handle

use crate::{Content, Level, LogFactory, LogRecord, Result, Throwable};
use std::error::Error as StdError;
use std::time::Duration;

/// Logging handle bound to a tag.
///
/// Every method captures the caller location. Convenience methods never
/// fail: an interceptor error is reported through `tracing` and the record is
/// dropped. Use [`LogCat::submit`] to observe the outcome.
#[derive(Debug, Clone)]
pub struct LogCat {
    factory: LogFactory,
    tag: String,
    once: Option<Duration>,
}

macro_rules! level_methods {
    ($($level:ident => $plain:ident, $lazy:ident, $err:ident;)*) => {
        $(
            #[doc = concat!("Logs `content` at [`Level::", stringify!($level), "`].")]
            #[track_caller]
            pub fn $plain(&self, content: impl Into<Content>) {
                self.log(Level::$level, content);
            }

            #[doc = concat!(
                "Logs the text produced by `f` at [`Level::",
                stringify!($level),
                "`]. `f` only runs if a stage reads the content."
            )]
            #[track_caller]
            pub fn $lazy(&self, f: impl FnOnce() -> String + Send + 'static) {
                self.log_lazy(Level::$level, f);
            }

            #[doc = concat!(
                "Logs `content` with an attached error at [`Level::",
                stringify!($level),
                "`]."
            )]
            #[track_caller]
            pub fn $err(
                &self,
                content: impl Into<Content>,
                error: impl Into<Box<dyn StdError + Send + Sync>>,
            ) {
                self.log_err(Level::$level, content, error);
            }
        )*
    };
}

impl LogCat {
    pub(crate) const fn new(factory: LogFactory, tag: String) -> Self {
        Self {
            factory,
            tag,
            once: None,
        }
    }

    /// The tag stamped on every record.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The factory this logcat submits to.
    #[must_use]
    pub const fn factory(&self) -> &LogFactory {
        &self.factory
    }

    /// A view of this logcat whose records pass at most once per `window`
    /// for this tag.
    #[must_use]
    pub fn once(&self, window: Duration) -> Self {
        Self {
            once: Some(window),
            ..self.clone()
        }
    }

    level_methods! {
        Verbose => v, v_lazy, v_err;
        Debug => d, d_lazy, d_err;
        Info => i, i_lazy, i_err;
        Warn => w, w_lazy, w_err;
        Error => e, e_lazy, e_err;
        Assert => a, a_lazy, a_err;
    }

    /// Logs `content` at `level`.
    #[track_caller]
    pub fn log(&self, level: Level, content: impl Into<Content>) {
        let record = self.record(level, content.into());
        self.dispatch(record);
    }

    /// Logs the text produced by `f` at `level`.
    #[track_caller]
    pub fn log_lazy(&self, level: Level, f: impl FnOnce() -> String + Send + 'static) {
        let record = self.record(level, Content::lazy(f));
        self.dispatch(record);
    }

    /// Logs `content` with an attached error at `level`.
    #[track_caller]
    pub fn log_err(
        &self,
        level: Level,
        content: impl Into<Content>,
        error: impl Into<Box<dyn StdError + Send + Sync>>,
    ) {
        let record = self
            .record(level, content.into())
            .with_throwable(Throwable::new(error));
        self.dispatch(record);
    }

    /// Submits a prepared record, applying this logcat's suppression window
    /// if the record has none.
    ///
    /// Returns whether the record reached the end of the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing interceptor.
    pub fn submit(&self, mut record: LogRecord) -> Result<bool> {
        if record.once.is_none() {
            record.once = self.once;
        }
        self.factory.submit(record)
    }

    #[track_caller]
    fn record(&self, level: Level, content: Content) -> LogRecord {
        let record = LogRecord::new(level, self.tag.clone(), content);
        match self.once {
            Some(window) => record.with_once(window),
            None => record,
        }
    }

    fn dispatch(&self, record: LogRecord) {
        if let Err(e) = self.factory.submit(record) {
            tracing::warn!(tag = %self.tag, error = %e, "log record dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{CaptureLogger, CaptureStore};
    use crate::{Chain, Error, LogPrinter, LogStorage, LogSwitch, Pipeline};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tracing_test::traced_test;

    fn factory(capture: &CaptureLogger) -> LogFactory {
        LogFactory::builder()
            .install_with::<LogPrinter>(|config| {
                config.logger(capture.clone());
            })
            .unwrap()
            .build()
    }

    #[test]
    fn test_level_methods() {
        let capture = CaptureLogger::new();
        let store = CaptureStore::new();
        let factory = LogFactory::builder()
            .install_with::<LogPrinter>(|config| {
                config.logger(capture.clone());
            })
            .unwrap()
            .install_with::<LogStorage>(|config| {
                config.store(store.clone());
            })
            .unwrap()
            .build();
        let logcat = factory.logcat("Levels");

        logcat.v("v");
        logcat.d("d");
        logcat.i("i");
        logcat.w("w");
        logcat.e("e");
        logcat.a("a");

        assert_eq!(capture.lines(), vec!["v", "d", "i", "w", "e", "a"]);
        let levels: Vec<Level> = store.records().iter().map(|r| r.level).collect();
        assert_eq!(levels, Level::ALL.to_vec());
    }

    #[test]
    fn test_records_carry_caller_location() {
        let store = CaptureStore::new();
        let factory = LogFactory::builder()
            .install_with::<LogStorage>(|config| {
                config.store(store.clone());
            })
            .unwrap()
            .build();

        factory.logcat("Loc").i("here");
        let line = line!() - 1;

        let records = store.records();
        let location = records[0].location.unwrap();
        assert!(location.file().ends_with("logcat.rs"));
        assert_eq!(location.line(), line);
        assert_eq!(records[0].tag, "Loc");
    }

    #[test]
    fn test_err_attaches_throwable() {
        let store = CaptureStore::new();
        let factory = LogFactory::builder()
            .install_with::<LogStorage>(|config| {
                config.store(store.clone());
            })
            .unwrap()
            .build();

        factory.logcat("Io").e_err("write failed", "disk full");

        let records = store.records();
        assert_eq!(records[0].throwable.as_ref().unwrap().to_string(), "disk full");
    }

    #[test]
    fn test_lazy_not_evaluated_when_switch_closed() {
        let evaluated = Arc::new(AtomicBool::new(false));
        let capture = CaptureLogger::new();
        let factory = LogFactory::builder()
            .install_with::<LogSwitch>(|config| config.open = false)
            .unwrap()
            .install_with::<LogPrinter>(|config| {
                config.logger(capture.clone());
            })
            .unwrap()
            .build();

        let flag = evaluated.clone();
        factory.logcat("Lazy").d_lazy(move || {
            flag.store(true, Ordering::SeqCst);
            "expensive".to_string()
        });

        assert!(!evaluated.load(Ordering::SeqCst));
        assert_eq!(capture.count(), 0);
    }

    #[test]
    fn test_once_view() {
        let capture = CaptureLogger::new();
        let logcat = factory(&capture).logcat("Once");
        let once = logcat.once(Duration::from_secs(60));

        once.w("first");
        once.w("second");
        logcat.w("unsuppressed");

        assert_eq!(capture.lines(), vec!["first", "unsuppressed"]);
    }

    #[test]
    fn test_submit_reports_interceptor_error() {
        let mut builder = LogFactory::builder();
        builder
            .pipeline_mut()
            .intercept(&Pipeline::TRANSFORM, |_chain: Chain<'_>| {
                Err(Error::interceptor("boom"))
            })
            .unwrap();
        let logcat = builder.build().logcat("Err");

        let result = logcat.submit(LogRecord::new(Level::Info, "Err", "x"));
        assert!(matches!(result, Err(Error::Interceptor(_))));
    }

    #[traced_test]
    #[test]
    fn test_convenience_methods_swallow_errors() {
        let mut builder = LogFactory::builder();
        builder
            .pipeline_mut()
            .intercept(&Pipeline::TRANSFORM, |_chain: Chain<'_>| {
                Err(Error::interceptor("boom"))
            })
            .unwrap();
        let logcat = builder.build().logcat("Err");

        logcat.i("dropped");

        assert!(logs_contain("log record dropped"));
        assert!(logs_contain("boom"));
    }
}
