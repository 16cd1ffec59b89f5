use crate::{Pipeline, Plugin, PluginScope, Result};
use std::sync::Arc;

/// Configuration of [`LogSwitch`].
#[derive(Debug, Clone)]
pub struct LogSwitchConfig {
    /// Whether records are let through
    pub open: bool,
}

impl Default for LogSwitchConfig {
    fn default() -> Self {
        Self { open: true }
    }
}

/// Master switch in the `Setup` phase. When closed, every record halts
/// before any content is rendered.
#[derive(Debug)]
pub struct LogSwitch {
    open: bool,
}

impl LogSwitch {
    /// Whether records are let through.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.open
    }
}

impl Plugin for LogSwitch {
    const KEY: &'static str = "LogSwitch";
    type Config = LogSwitchConfig;

    fn from_config(config: Self::Config) -> Result<Self> {
        Ok(Self { open: config.open })
    }

    fn install(plugin: Arc<Self>, scope: &mut PluginScope<'_>) -> Result<()> {
        scope.intercept(&Pipeline::SETUP, move |chain| {
            if plugin.open {
                chain.proceed()
            } else {
                chain.finish()
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Level, LogRecord, PluginRegistry};

    fn pipeline(open: bool) -> Pipeline {
        let mut pipeline = Pipeline::logging();
        PluginRegistry::new()
            .install::<LogSwitch>(&mut pipeline, LogSwitchConfig { open })
            .unwrap();
        pipeline
    }

    #[test]
    fn test_open_switch_delivers() {
        let record = LogRecord::new(Level::Info, "tag", "on");
        assert!(pipeline(true).execute(record).unwrap().is_some());
    }

    #[test]
    fn test_closed_switch_halts() {
        let record = LogRecord::new(Level::Info, "tag", "off");
        assert!(pipeline(false).execute(record).unwrap().is_none());
    }
}
