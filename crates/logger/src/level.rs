//! Log levels

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Severity of a log record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    /// Verbose output, the most detailed level
    #[serde(alias = "verbose")]
    Verbose,
    /// Debugging information
    #[serde(alias = "debug")]
    Debug,
    /// General information
    #[serde(alias = "info")]
    Info,
    /// Something unexpected that does not stop the program
    #[serde(alias = "warn")]
    Warn,
    /// An operation failed
    #[serde(alias = "error")]
    Error,
    /// A condition that should never happen
    #[serde(alias = "assert")]
    Assert,
}

impl Level {
    /// Every level, least severe first.
    pub const ALL: [Self; 6] = [
        Self::Verbose,
        Self::Debug,
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Assert,
    ];

    /// Upper case name of the level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Verbose => "VERBOSE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Assert => "ASSERT",
        }
    }

    /// Levels at or above `self`.
    pub fn and_above(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |level| *level >= self)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidConfig {
                plugin: "level",
                reason: format!("unknown log level `{s}`"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Level::Verbose < Level::Debug);
        assert!(Level::Error < Level::Assert);
        assert_eq!(
            Level::Warn.and_above().collect::<Vec<_>>(),
            vec![Level::Warn, Level::Error, Level::Assert]
        );
    }

    #[test]
    fn test_parse() {
        assert_eq!("warn".parse::<Level>().unwrap(), Level::Warn);
        assert_eq!("ASSERT".parse::<Level>().unwrap(), Level::Assert);
        assert!("fatal".parse::<Level>().is_err());
    }

    #[test]
    fn test_serde_uses_upper_case() {
        assert_eq!(serde_json::to_string(&Level::Info).unwrap(), "\"INFO\"");
        let level: Level = serde_json::from_str("\"DEBUG\"").unwrap();
        assert_eq!(level, Level::Debug);
        let level: Level = serde_json::from_str("\"warn\"").unwrap();
        assert_eq!(level, Level::Warn);
    }
}
