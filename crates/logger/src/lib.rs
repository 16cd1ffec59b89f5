//! Structured logging built around an interceptor pipeline.
//!
//! A [`LogCat`] turns a logging call into a [`LogRecord`] and runs it through
//! the [`Pipeline`] owned by its [`LogFactory`]. The pipeline is made of
//! ordered phases; plugins such as [`LogSwitch`], [`LogJson`] and
//! [`LogPrinter`] register interceptors into those phases, and the output
//! interceptors finally hand the record to a [`Logger`] or a [`LogStore`].
//!
//! ```
//! use logpipe_logger::{JsonConverter, LogFactory, LogJson, LogPrinter, LogSwitch, StdoutLogger};
//! use std::sync::Arc;
//!
//! let factory = LogFactory::builder()
//!     .install_with::<LogSwitch>(|config| config.open = true)?
//!     .install_with::<LogJson>(|config| {
//!         config.converter = Some(Arc::new(JsonConverter::pretty()));
//!     })?
//!     .install_with::<LogPrinter>(|config| {
//!         config.logger = Arc::new(StdoutLogger::new());
//!     })?
//!     .build();
//!
//! let logcat = factory.logcat("Example");
//! logcat.i("Hello");
//! logcat.d(serde_json::json!({ "name": "Xiao Ming", "age": 19 }));
//! # Ok::<(), logpipe_logger::Error>(())
//! ```
#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod compat;
mod config;
mod converter;
mod error;
mod factory;
pub mod format;
mod level;
mod logcat;
mod logger;
mod once;
pub mod pipeline;
mod plugin;
pub mod plugins;
mod record;
mod stdout;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::{JsonMode, LogConfig, PrintFormat, TableSection};
pub use converter::{Converter, JsonConverter};
pub use error::{Error, Result};
pub use factory::{LogFactory, LogFactoryBuilder};
pub use format::{LineFormat, LogFormat, LogHeader, OnlyMsgFormat, TableConfig, TableFormat};
pub use level::Level;
pub use logcat::LogCat;
pub use logger::{LogStore, Logger};
pub use once::OnceTable;
pub use pipeline::{Chain, Interceptor, Outcome, Phase, PhaseRelation, Pipeline};
pub use plugin::{Plugin, PluginRegistry, PluginScope};
pub use plugins::{
    LogJson, LogJsonConfig, LogPretty, LogPrettyConfig, LogPrinter, LogPrinterConfig, LogStorage,
    LogStorageConfig, LogSwitch, LogSwitchConfig,
};
pub use record::{Content, LogRecord, Throwable};
pub use stdout::StdoutLogger;
