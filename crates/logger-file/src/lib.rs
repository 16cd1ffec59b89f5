//! Rotating file sink for `logpipe-logger`
//!
//! [`FileLogger`] implements both [`logpipe_logger::Logger`] and
//! [`logpipe_logger::LogStore`], so it can back the printer or the storage
//! plugin. It supports:
//! - one file per day (`{prefix}_{yyyymmdd}.log`) or a single `{prefix}.log`
//! - size based rotation into `_{n}` suffixed files
//! - removal of files older than a retention period
//! - an optional cache directory whose files move to the log directory after
//!   a number of days
//!
//! ```no_run
//! use logpipe_logger::{LogFactory, LogStorage};
//! use logpipe_logger_file::{FileLogger, FileLoggerConfig};
//!
//! let config = FileLoggerConfig::builder()
//!     .log_dir("/var/log/app")
//!     .name_prefix("app")
//!     .max_file_size(10 * 1024 * 1024)
//!     .build()?;
//! let file = FileLogger::new(config)?;
//!
//! let factory = LogFactory::builder()
//!     .install_with::<LogStorage>(|config| {
//!         config.store(file);
//!     })?
//!     .build();
//! factory.logcat("App").i("started");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs, unreachable_pub)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod format;
mod writer;

pub use config::{FileFormat, FileLoggerConfig, FileLoggerConfigBuilder};
pub use error::{Error, Result};
pub use format::JsonLineFormat;
pub use writer::FileLogger;
