//! Tests for compatibility bridges

#[cfg(all(feature = "test-support", any(feature = "log-compat", feature = "tracing-compat")))]
mod tests {
    use logpipe_logger::test_support::CaptureLogger;
    use logpipe_logger::*;

    fn factory(capture: &CaptureLogger) -> LogFactory {
        LogFactory::builder()
            .install_with::<LogPrinter>(|config| {
                config.logger(capture.clone());
            })
            .unwrap()
            .build()
    }

    #[test]
    #[cfg(feature = "log-compat")]
    fn test_log_bridge() {
        use log::Log;

        let capture = CaptureLogger::with_format(LineFormat::plain());
        let bridge = compat::LogBridge::new(factory(&capture)).with_max_level(log::LevelFilter::Info);

        bridge.log(
            &log::Record::builder()
                .args(format_args!("Warning from log crate"))
                .level(log::Level::Warn)
                .target("Http")
                .build(),
        );
        bridge.log(
            &log::Record::builder()
                .args(format_args!("Debug from log crate"))
                .level(log::Level::Debug)
                .target("Http")
                .build(),
        );

        let lines = capture.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[WARN|Http|"));
        assert!(lines[0].contains("(unknown) Warning from log crate"));
    }

    #[test]
    #[cfg(feature = "tracing-compat")]
    fn test_tracing_bridge() {
        use tracing_subscriber::prelude::*;

        let capture = CaptureLogger::with_format(LineFormat::plain());
        let subscriber =
            tracing_subscriber::registry().with(compat::TracingBridge::new(factory(&capture)));

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("request");
            let _guard = span.enter();
            tracing::warn!(target: "Http", user = 7, "signed in");
        });

        let lines = capture.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("[WARN|Http|"));
        assert!(lines[0].ends_with("request: signed in user=7"));
    }

    #[test]
    #[cfg(feature = "tracing-compat")]
    fn test_tracing_logger_emits_events() {
        use parking_lot::Mutex;
        use std::io;
        use std::sync::Arc;

        #[derive(Clone, Default)]
        struct Buffer(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Buffer {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let buffer = Buffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();

        let factory = LogFactory::builder()
            .install_with::<LogPrinter>(|config| {
                config.logger(compat::TracingLogger::new());
            })
            .unwrap()
            .build();

        tracing::subscriber::with_default(subscriber, || {
            factory.logcat("Bridge").e("forwarded");
        });

        let output = String::from_utf8(buffer.0.lock().clone()).unwrap();
        assert!(output.contains("ERROR"));
        assert!(output.contains("logpipe"));
        assert!(output.contains("forwarded"));
        assert!(output.contains("Bridge"));
    }
}
