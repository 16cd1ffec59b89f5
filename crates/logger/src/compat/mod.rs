//! Bridges between the pipeline and other logging crates
//!
//! - `log-compat`: [`LogBridge`] routes `log` macros into a [`crate::LogFactory`].
//! - `tracing-compat`: [`TracingBridge`] routes `tracing` events into a
//!   [`crate::LogFactory`], and [`TracingLogger`] forwards printed records as
//!   `tracing` events. Do not combine both directions on one subscriber.

#[cfg(feature = "log-compat")]
mod log_bridge;

#[cfg(feature = "tracing-compat")]
mod tracing_bridge;

#[cfg(feature = "log-compat")]
pub use log_bridge::{LogBridge, init_log_bridge};

#[cfg(feature = "tracing-compat")]
pub use tracing_bridge::{TRACING_TARGET, TracingBridge, TracingLogger, init_tracing_bridge};
