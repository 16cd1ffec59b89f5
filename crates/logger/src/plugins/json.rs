use crate::{Converter, Error, Pipeline, Plugin, PluginScope, Result};
use std::fmt;
use std::sync::Arc;

/// Configuration of [`LogJson`].
#[derive(Default, Clone)]
pub struct LogJsonConfig {
    /// Converter for structured content; required
    pub converter: Option<Arc<dyn Converter>>,
}

impl fmt::Debug for LogJsonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogJsonConfig")
            .field("converter", &self.converter.as_ref().map(|c| c.is_pretty()))
            .finish()
    }
}

/// Turns structured content into JSON text in the `Transform` phase.
/// Text content passes through unchanged.
pub struct LogJson {
    converter: Arc<dyn Converter>,
}

impl LogJson {
    /// The converter in use.
    #[must_use]
    pub fn converter(&self) -> &dyn Converter {
        self.converter.as_ref()
    }
}

impl fmt::Debug for LogJson {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogJson")
            .field("pretty", &self.converter.is_pretty())
            .finish()
    }
}

impl Plugin for LogJson {
    const KEY: &'static str = "LogJson";
    type Config = LogJsonConfig;

    fn from_config(config: Self::Config) -> Result<Self> {
        let converter = config.converter.ok_or_else(|| Error::InvalidConfig {
            plugin: Self::KEY,
            reason: "a converter is required".to_string(),
        })?;
        Ok(Self { converter })
    }

    fn install(plugin: Arc<Self>, scope: &mut PluginScope<'_>) -> Result<()> {
        scope.intercept(&Pipeline::TRANSFORM, move |mut chain| {
            if let crate::Content::Value(value) = &chain.subject().content {
                let text = plugin.converter.to_json(value);
                chain.subject_mut().set_text_content(text);
            }
            chain.proceed()
        })
    }
}
