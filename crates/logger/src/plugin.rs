//! Plugin protocol and per-factory plugin registry

use crate::pipeline::{Chain, Interceptor, Outcome, Phase, Pipeline};
use crate::Result;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A configurable unit that registers interceptors when installed.
pub trait Plugin: Sized + Send + Sync + 'static {
    /// Unique key of the plugin within one pipeline.
    const KEY: &'static str;

    /// Typed configuration, filled in by the caller before construction.
    type Config: Default;

    /// Validates `config` and builds the plugin.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidConfig`] when the configuration is
    /// incomplete or inconsistent.
    fn from_config(config: Self::Config) -> Result<Self>;

    /// Registers the plugin's interceptors.
    ///
    /// # Errors
    ///
    /// Returns an error if an interceptor targets an unknown phase.
    fn install(plugin: Arc<Self>, scope: &mut PluginScope<'_>) -> Result<()>;
}

/// The pipeline as seen by an installing plugin. Interceptors registered
/// here are owned by the plugin and are removed if it is installed again.
pub struct PluginScope<'a> {
    key: &'static str,
    pipeline: &'a mut Pipeline,
}

impl PluginScope<'_> {
    /// Key of the plugin being installed.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        self.key
    }

    /// The pipeline, for declaring extra phases.
    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        self.pipeline
    }

    /// Registers a closure interceptor into `phase`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownPhase`] if the phase was never added.
    pub fn intercept<F>(&mut self, phase: &Phase, f: F) -> Result<()>
    where
        F: Fn(Chain<'_>) -> Outcome + Send + Sync + 'static,
    {
        self.add_interceptor(phase, f)
    }

    /// Registers an interceptor into `phase`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownPhase`] if the phase was never added.
    pub fn add_interceptor(&mut self, phase: &Phase, interceptor: impl Interceptor) -> Result<()> {
        self.pipeline
            .add_owned_interceptor(phase, Some(self.key), Arc::new(interceptor))
    }
}

/// Installed plugins, keyed by [`Plugin::KEY`].
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: HashMap<&'static str, Arc<dyn Any + Send + Sync>>,
    order: Vec<&'static str>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds `P` from `config` and installs it into `pipeline`.
    ///
    /// Installing a key that is already installed replaces it: the previous
    /// instance's interceptors are removed first, then the new instance is
    /// installed and returned by later lookups.
    ///
    /// # Errors
    ///
    /// Returns the validation error of [`Plugin::from_config`] or the
    /// registration error of [`Plugin::install`]. On error neither the
    /// pipeline nor the registry is changed.
    pub fn install<P: Plugin>(&mut self, pipeline: &mut Pipeline, config: P::Config) -> Result<Arc<P>> {
        let plugin = Arc::new(P::from_config(config)?);
        let snapshot = pipeline.clone();

        let replaced = pipeline.remove_owned_by(P::KEY);
        if self.plugins.contains_key(P::KEY) {
            tracing::debug!(plugin = P::KEY, replaced, "replacing installed plugin");
        }

        let mut scope = PluginScope {
            key: P::KEY,
            pipeline: &mut *pipeline,
        };
        if let Err(e) = P::install(plugin.clone(), &mut scope) {
            *pipeline = snapshot;
            return Err(e);
        }

        if self.plugins.insert(P::KEY, plugin.clone()).is_none() {
            self.order.push(P::KEY);
        }
        tracing::debug!(plugin = P::KEY, "installed plugin");
        Ok(plugin)
    }

    /// The installed instance of `P`, if any.
    #[must_use]
    pub fn get<P: Plugin>(&self) -> Option<Arc<P>> {
        self.plugins
            .get(P::KEY)
            .cloned()
            .and_then(|plugin| plugin.downcast::<P>().ok())
    }

    /// Whether a plugin with `key` is installed.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.plugins.contains_key(key)
    }

    /// Keys of the installed plugins, in first-install order.
    #[must_use]
    pub fn keys(&self) -> &[&'static str] {
        &self.order
    }

    /// Number of installed plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Whether no plugin is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.order).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Level, LogRecord};

    struct Suffix(String);

    #[derive(Default)]
    struct SuffixConfig {
        suffix: String,
    }

    impl Plugin for Suffix {
        const KEY: &'static str = "Suffix";
        type Config = SuffixConfig;

        fn from_config(config: Self::Config) -> Result<Self> {
            if config.suffix.is_empty() {
                return Err(Error::InvalidConfig {
                    plugin: Self::KEY,
                    reason: "suffix must not be empty".to_string(),
                });
            }
            Ok(Self(config.suffix))
        }

        fn install(plugin: Arc<Self>, scope: &mut PluginScope<'_>) -> Result<()> {
            scope.intercept(&Pipeline::TRANSFORM, move |mut chain| {
                let text = format!("{}{}", chain.subject().content_text(), plugin.0);
                chain.subject_mut().set_text_content(text);
                chain.proceed()
            })
        }
    }

    fn suffix(value: &str) -> SuffixConfig {
        SuffixConfig {
            suffix: value.to_string(),
        }
    }

    #[test]
    fn test_install_registers_interceptors() {
        let mut pipeline = Pipeline::logging();
        let mut registry = PluginRegistry::new();
        registry.install::<Suffix>(&mut pipeline, suffix("!")).unwrap();

        let record = LogRecord::new(Level::Info, "tag", "hi");
        let delivered = pipeline.execute(record).unwrap().unwrap();
        assert_eq!(delivered.content_text(), "hi!");
        assert_eq!(registry.get::<Suffix>().unwrap().0, "!");
    }

    #[test]
    fn test_reinstall_replaces_previous_instance() {
        let mut pipeline = Pipeline::logging();
        let mut registry = PluginRegistry::new();
        registry.install::<Suffix>(&mut pipeline, suffix("!")).unwrap();
        registry.install::<Suffix>(&mut pipeline, suffix("?")).unwrap();

        assert_eq!(pipeline.interceptor_count(), 1);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.keys(), &["Suffix"]);
        assert_eq!(registry.get::<Suffix>().unwrap().0, "?");

        let record = LogRecord::new(Level::Info, "tag", "hi");
        let delivered = pipeline.execute(record).unwrap().unwrap();
        assert_eq!(delivered.content_text(), "hi?");
    }

    #[test]
    fn test_invalid_config_leaves_pipeline_untouched() {
        let mut pipeline = Pipeline::logging();
        let mut registry = PluginRegistry::new();
        registry.install::<Suffix>(&mut pipeline, suffix("!")).unwrap();

        let result = registry.install::<Suffix>(&mut pipeline, SuffixConfig::default());
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
        assert_eq!(pipeline.interceptor_count(), 1);
        assert_eq!(registry.get::<Suffix>().unwrap().0, "!");
    }

    #[test]
    fn test_install_into_missing_phase_is_rolled_back() {
        let mut pipeline = Pipeline::new();
        let mut registry = PluginRegistry::new();

        let result = registry.install::<Suffix>(&mut pipeline, suffix("!"));
        assert!(matches!(result, Err(Error::UnknownPhase(_))));
        assert!(registry.is_empty());
        assert!(pipeline.is_empty());
    }
}
