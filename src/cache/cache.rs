use std::{
    collections::HashMap,
    fmt::Debug,
    hash::Hash,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use log::{debug, warn};

use crate::{
    errors::errors::CacheError,
    header::{
        models::ConfigFunction,
        parser::{parse_header, HeaderParseResult},
    },
};

/// How long a provider may block waiting for a module's sources, e.g. for
/// an editor to flush unsaved buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        WaitPolicy {
            timeout: Duration::from_secs(15),
        }
    }
}

/// Text of a module's root config and the name it is reported under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootConfig {
    pub file: String,
    pub source: String,
}

/// Supplies root config text for a module.
pub trait SourceProvider<K> {
    /// `Ok(None)` when the module has no root config.
    fn load_root_config(&self, module: &K, wait: &WaitPolicy) -> Result<Option<RootConfig>, CacheError>;
}

#[derive(Debug, Default)]
struct CacheEntry {
    header: Option<Arc<HeaderParseResult>>,
    dirty: bool,
}

/// Per-module cache of parsed root configs.
///
/// A module is reparsed only when it has never been parsed or has been
/// marked dirty since. All methods take `&self`; the cache can be shared
/// between threads.
#[derive(Debug)]
pub struct ModuleCache<K> {
    entries: Mutex<HashMap<K, CacheEntry>>,
    wait: WaitPolicy,
}

impl<K> Default for ModuleCache<K> {
    fn default() -> Self {
        ModuleCache {
            entries: Mutex::new(HashMap::new()),
            wait: WaitPolicy::default(),
        }
    }
}

impl<K: Eq + Hash + Clone + Debug> ModuleCache<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_wait_policy(wait: WaitPolicy) -> Self {
        ModuleCache {
            entries: Mutex::new(HashMap::new()),
            wait,
        }
    }

    pub fn get_wait_policy(&self) -> WaitPolicy {
        self.wait
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<K, CacheEntry>>, CacheError> {
        self.entries.lock().map_err(|_| CacheError::Poisoned)
    }

    /// Returns the module's parsed root config, reparsing it first if it is
    /// missing or dirty.
    ///
    /// The lock is held while the provider loads, so concurrent callers for
    /// a dirty module wait for one parse instead of each starting their own.
    /// On failure the previous parse, if any, stays cached and dirty.
    pub fn get_or_reparse(
        &self,
        module: &K,
        provider: &dyn SourceProvider<K>,
    ) -> Result<Arc<HeaderParseResult>, CacheError> {
        let mut entries = self.lock()?;
        let entry = entries.entry(module.clone()).or_default();

        if let (Some(header), false) = (&entry.header, entry.dirty) {
            return Ok(header.clone());
        }

        debug!("reparsing root config of {:?}", module);
        let root = match provider.load_root_config(module, &self.wait) {
            Ok(Some(root)) => root,
            Ok(None) => {
                return Err(CacheError::RootConfigNotDefined {
                    module: format!("{:?}", module),
                })
            }
            Err(error) => {
                warn!("could not load root config of {:?}: {}", module, error);
                return Err(error);
            }
        };

        let parsed = Arc::new(parse_header(&root.source, &root.file));
        if !parsed.diagnostics.is_empty() {
            warn!(
                "{} problems in root config {}",
                parsed.diagnostics.len(),
                root.file
            );
        }

        entry.header = Some(parsed.clone());
        entry.dirty = false;
        Ok(parsed)
    }

    /// Flags the module for reparsing on next access. Nothing is parsed here.
    pub fn mark_dirty(&self, module: &K) -> Result<(), CacheError> {
        let mut entries = self.lock()?;
        entries.entry(module.clone()).or_default().dirty = true;
        debug!("marked {:?} dirty", module);
        Ok(())
    }

    /// True when the next `get_or_reparse` will parse again.
    pub fn is_dirty(&self, module: &K) -> Result<bool, CacheError> {
        let entries = self.lock()?;
        Ok(entries
            .get(module)
            .map_or(true, |entry| entry.dirty || entry.header.is_none()))
    }

    /// Drops everything cached for the module.
    pub fn remove(&self, module: &K) -> Result<(), CacheError> {
        self.lock()?.remove(module);
        Ok(())
    }

    /// Functions declared in the module's `CfgFunctions`.
    pub fn config_functions(
        &self,
        module: &K,
        provider: &dyn SourceProvider<K>,
    ) -> Result<Vec<ConfigFunction>, CacheError> {
        let header = self.get_or_reparse(module, provider)?;
        Ok(header.file.config_functions())
    }
}
