//! Built-in plugins for the standard logging phases

mod json;
mod pretty;
mod printer;
mod storage;
mod switch;

pub use json::{LogJson, LogJsonConfig};
pub use pretty::{LogPretty, LogPrettyConfig};
pub use printer::{LogPrinter, LogPrinterConfig};
pub use storage::{LogStorage, LogStorageConfig};
pub use switch::{LogSwitch, LogSwitchConfig};

use crate::Level;
use std::collections::BTreeSet;

/// Level allow-set shared by the printer and storage plugins.
///
/// A non-empty `level_set` wins; otherwise every level at or above the
/// threshold is allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LevelFilter(BTreeSet<Level>);

impl LevelFilter {
    pub(crate) fn new(level: Level, level_set: &BTreeSet<Level>) -> Self {
        if level_set.is_empty() {
            Self(level.and_above().collect())
        } else {
            Self(level_set.clone())
        }
    }

    pub(crate) fn allows(&self, level: Level) -> bool {
        self.0.contains(&level)
    }

    pub(crate) const fn levels(&self) -> &BTreeSet<Level> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_when_set_is_empty() {
        let filter = LevelFilter::new(Level::Warn, &BTreeSet::new());
        assert!(!filter.allows(Level::Info));
        assert!(filter.allows(Level::Warn));
        assert!(filter.allows(Level::Assert));
    }

    #[test]
    fn test_level_set_wins() {
        let set = BTreeSet::from([Level::Debug, Level::Error]);
        let filter = LevelFilter::new(Level::Warn, &set);
        assert!(filter.allows(Level::Debug));
        assert!(!filter.allows(Level::Warn));
        assert!(filter.allows(Level::Error));
        assert_eq!(filter.levels().len(), 2);
    }
}
