use crate::{Converter, Error, Pipeline, Plugin, PluginScope, Result};
use std::fmt;
use std::sync::Arc;

/// Configuration of [`LogPretty`].
#[derive(Default, Clone)]
pub struct LogPrettyConfig {
    /// Converter used to re-format JSON text; required
    pub converter: Option<Arc<dyn Converter>>,
}

impl fmt::Debug for LogPrettyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogPrettyConfig")
            .field("converter", &self.converter.is_some())
            .finish()
    }
}

/// Re-formats text content holding a JSON object in the `Transform` phase.
pub struct LogPretty {
    converter: Arc<dyn Converter>,
}

impl fmt::Debug for LogPretty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogPretty")
            .field("pretty", &self.converter.is_pretty())
            .finish()
    }
}

impl Plugin for LogPretty {
    const KEY: &'static str = "LogPretty";
    type Config = LogPrettyConfig;

    fn from_config(config: Self::Config) -> Result<Self> {
        let converter = config.converter.ok_or_else(|| Error::InvalidConfig {
            plugin: Self::KEY,
            reason: "a converter is required".to_string(),
        })?;
        Ok(Self { converter })
    }

    fn install(plugin: Arc<Self>, scope: &mut PluginScope<'_>) -> Result<()> {
        scope.intercept(&Pipeline::TRANSFORM, move |mut chain| {
            let formatted = {
                let content = &chain.subject().content;
                content
                    .is_text()
                    .then(|| content.as_text())
                    // Only text that could be an object is worth parsing.
                    .filter(|text| text.trim_start().starts_with('{'))
                    .map(|text| plugin.converter.parse_string(&text))
            };
            if let Some(formatted) = formatted {
                chain.subject_mut().set_text_content(formatted);
            }
            chain.proceed()
        })
    }
}
