use super::LevelFilter;
use crate::{Error, Level, LogStore, Pipeline, Plugin, PluginScope, Result};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Configuration of [`LogStorage`].
#[derive(Clone)]
pub struct LogStorageConfig {
    /// Lowest stored level, used when `level_set` is empty
    pub level: Level,
    /// Exact set of stored levels
    pub level_set: BTreeSet<Level>,
    /// Store receiving records; required
    pub store: Option<Arc<dyn LogStore>>,
}

impl Default for LogStorageConfig {
    fn default() -> Self {
        Self {
            level: Level::Verbose,
            level_set: BTreeSet::new(),
            store: None,
        }
    }
}

impl LogStorageConfig {
    /// Store exactly the given levels
    pub fn levels(&mut self, levels: impl IntoIterator<Item = Level>) -> &mut Self {
        self.level_set = levels.into_iter().collect();
        self
    }

    /// Send records to `store`
    pub fn store(&mut self, store: impl LogStore) -> &mut Self {
        self.store = Some(Arc::new(store));
        self
    }
}

impl fmt::Debug for LogStorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStorageConfig")
            .field("level", &self.level)
            .field("level_set", &self.level_set)
            .field("store", &self.store.is_some())
            .finish()
    }
}

/// Persists records through a [`LogStore`] in the last phase, `Storage`.
pub struct LogStorage {
    filter: LevelFilter,
    store: Arc<dyn LogStore>,
}

impl LogStorage {
    /// Whether records of `level` are stored.
    #[must_use]
    pub fn allows(&self, level: Level) -> bool {
        self.filter.allows(level)
    }

    /// The store records are persisted to.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn LogStore> {
        &self.store
    }
}

impl fmt::Debug for LogStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStorage")
            .field("levels", self.filter.levels())
            .finish_non_exhaustive()
    }
}

impl Plugin for LogStorage {
    const KEY: &'static str = "LogStorage";
    type Config = LogStorageConfig;

    fn from_config(config: Self::Config) -> Result<Self> {
        let store = config.store.ok_or_else(|| Error::InvalidConfig {
            plugin: Self::KEY,
            reason: "a store is required".to_string(),
        })?;
        Ok(Self {
            filter: LevelFilter::new(config.level, &config.level_set),
            store,
        })
    }

    fn install(plugin: Arc<Self>, scope: &mut PluginScope<'_>) -> Result<()> {
        scope.intercept(&Pipeline::STORAGE, move |chain| {
            if !plugin.filter.allows(chain.subject().level) {
                return chain.finish();
            }
            plugin.store.store(chain.subject());
            chain.proceed()
        })
    }
}
