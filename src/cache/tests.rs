use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread,
    time::Duration,
};

use pretty_assertions::assert_eq;

use crate::errors::errors::CacheError;

use super::cache::{ModuleCache, RootConfig, SourceProvider, WaitPolicy};

/// In-memory module sources that count how often they are read.
#[derive(Default)]
struct MemoryProvider {
    sources: Mutex<HashMap<&'static str, String>>,
    loads: AtomicUsize,
}

impl MemoryProvider {
    fn with(module: &'static str, source: &str) -> Self {
        let provider = MemoryProvider::default();
        provider.set(module, source);
        provider
    }

    fn set(&self, module: &'static str, source: &str) {
        self.sources
            .lock()
            .unwrap()
            .insert(module, source.to_string());
    }

    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl SourceProvider<&'static str> for MemoryProvider {
    fn load_root_config(
        &self,
        module: &&'static str,
        _wait: &WaitPolicy,
    ) -> Result<Option<RootConfig>, CacheError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.sources.lock().unwrap().get(module).map(|source| RootConfig {
            file: "description.ext".to_string(),
            source: source.clone(),
        }))
    }
}

/// Always times out after the policy's wait.
struct SlowProvider;

impl SourceProvider<&'static str> for SlowProvider {
    fn load_root_config(
        &self,
        module: &&'static str,
        wait: &WaitPolicy,
    ) -> Result<Option<RootConfig>, CacheError> {
        Err(CacheError::Timeout {
            module: module.to_string(),
            waited: wait.timeout,
        })
    }
}

const FUNCTIONS: &str = "class CfgFunctions { class TAG { class Core { class init {}; }; }; };";

#[test]
fn test_parses_once_until_dirty() {
    let cache = ModuleCache::new();
    let provider = MemoryProvider::with("mission", FUNCTIONS);

    let first = cache.get_or_reparse(&"mission", &provider).unwrap();
    let second = cache.get_or_reparse(&"mission", &provider).unwrap();

    assert_eq!(provider.loads(), 1);
    assert!(Arc::ptr_eq(&first, &second));
    assert!(!cache.is_dirty(&"mission").unwrap());
}

#[test]
fn test_mark_dirty_reparses_on_next_access() {
    let cache = ModuleCache::new();
    let provider = MemoryProvider::with("mission", FUNCTIONS);
    cache.get_or_reparse(&"mission", &provider).unwrap();

    provider.set(
        "mission",
        "class CfgFunctions { class TAG { class Core { class init {}; class spawn {}; }; }; };",
    );
    cache.mark_dirty(&"mission").unwrap();
    assert!(cache.is_dirty(&"mission").unwrap());
    // Marking does not parse
    assert_eq!(provider.loads(), 1);

    let functions = cache.config_functions(&"mission", &provider).unwrap();
    assert_eq!(provider.loads(), 2);
    assert_eq!(
        functions.iter().map(|f| f.full_name()).collect::<Vec<_>>(),
        vec!["TAG_fnc_init", "TAG_fnc_spawn"]
    );
}

#[test]
fn test_missing_root_config() {
    let cache = ModuleCache::new();
    let provider = MemoryProvider::default();

    let error = cache.get_or_reparse(&"addon", &provider).unwrap_err();
    assert_eq!(
        error,
        CacheError::RootConfigNotDefined {
            module: "\"addon\"".to_string()
        }
    );
    assert!(cache.is_dirty(&"addon").unwrap());
}

#[test]
fn test_wait_policy_is_passed_to_provider() {
    let wait = WaitPolicy {
        timeout: Duration::from_millis(5),
    };
    let cache = ModuleCache::with_wait_policy(wait);

    let error = cache.get_or_reparse(&"mission", &SlowProvider).unwrap_err();
    assert_eq!(
        error,
        CacheError::Timeout {
            module: "mission".to_string(),
            waited: Duration::from_millis(5),
        }
    );
}

#[test]
fn test_failed_reload_keeps_entry_dirty() {
    let cache = ModuleCache::new();
    let provider = MemoryProvider::with("mission", FUNCTIONS);
    cache.get_or_reparse(&"mission", &provider).unwrap();
    cache.mark_dirty(&"mission").unwrap();

    assert!(cache.get_or_reparse(&"mission", &SlowProvider).is_err());
    assert!(cache.is_dirty(&"mission").unwrap());
}

#[test]
fn test_shared_between_threads() {
    let cache = Arc::new(ModuleCache::new());
    let provider = Arc::new(MemoryProvider::with("mission", FUNCTIONS));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            let provider = provider.clone();
            thread::spawn(move || {
                cache
                    .config_functions(&"mission", provider.as_ref())
                    .unwrap()
                    .len()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 1);
    }
    assert_eq!(provider.loads(), 1);
}

#[test]
fn test_default_wait_policy() {
    assert_eq!(WaitPolicy::default().timeout, Duration::from_secs(15));
    assert_eq!(
        ModuleCache::<String>::new().get_wait_policy(),
        WaitPolicy::default()
    );
}
