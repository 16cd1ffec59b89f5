//! Error types for the logging pipeline

use std::io;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or running a log pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A relation or interceptor referenced a phase that was never added
    #[error("Unknown pipeline phase `{0}`")]
    UnknownPhase(String),

    /// The declared phase relations do not admit a total order
    #[error("Cyclic phase relations between: {}", .0.join(", "))]
    CyclicPhases(Vec<String>),

    /// A plugin configuration failed validation
    #[error("Invalid configuration for {plugin}: {reason}")]
    InvalidConfig {
        /// Key of the plugin (or config section) being configured
        plugin: &'static str,
        /// What was wrong
        reason: String,
    },

    /// The table format ellipsis is longer than 10 characters
    #[error("The length of the ellipsis ({0}) should not exceed 10")]
    InvalidEllipsis(String),

    /// An interceptor failed while processing a record
    #[error("Interceptor failed: {0}")]
    Interceptor(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A TOML configuration document could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O error while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Wraps any error raised inside a custom interceptor.
    pub fn interceptor(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Interceptor(error.into())
    }
}
