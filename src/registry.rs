//! Named mappers and a small cache of resolved assets.
//!
//! References are either `mapper:reference` or a bare `reference`, which
//! goes to the mapper named [`DEFAULT_MAPPER`].

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::asset::Asset;
use crate::error::{AssetError, Result};
use crate::helpers::parse_reference;
use crate::mapper::{Mapper, Options};

/// Mapper used for references without a `mapper:` prefix.
pub const DEFAULT_MAPPER: &str = "default";

/// Maximum number of resolved assets kept in the cache.
const MAX_CACHE_SIZE: usize = 100;

// ============================================================================
// Qualified reference
// ============================================================================

/// A reference with an optional explicit mapper name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedRef {
    pub mapper: Option<String>,
    pub reference: String,
}

impl QualifiedRef {
    pub fn new(mapper: Option<&str>, reference: &str) -> Self {
        Self {
            mapper: mapper.map(str::to_string),
            reference: reference.to_string(),
        }
    }

    /// Mapper name with the default applied.
    pub fn mapper_name(&self) -> &str {
        self.mapper.as_deref().unwrap_or(DEFAULT_MAPPER)
    }
}

impl From<&str> for QualifiedRef {
    fn from(s: &str) -> Self {
        let (mapper, reference) = parse_reference(s);
        Self::new(mapper, reference)
    }
}

impl From<String> for QualifiedRef {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<(&str, &str)> for QualifiedRef {
    fn from((mapper, reference): (&str, &str)) -> Self {
        Self::new(Some(mapper), reference)
    }
}

// ============================================================================
// Resolution cache
// ============================================================================

/// Bounded FIFO cache of resolved assets.
///
/// Once full, the oldest entry is evicted before a new one is stored.
#[derive(Debug)]
pub struct ResolutionCache {
    entries: IndexMap<String, Arc<Asset>>,
    capacity: usize,
}

impl ResolutionCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<Arc<Asset>> {
        self.entries.get(key).cloned()
    }

    pub fn insert(&mut self, key: String, asset: Arc<Asset>) {
        if self.entries.len() >= self.capacity {
            self.evict_oldest();
        }
        self.entries.insert(key, asset);
    }

    /// Drop the oldest entry, if any.
    pub fn evict_oldest(&mut self) {
        if let Some((key, _)) = self.entries.shift_remove_index(0) {
            crate::debug!("registry"; "evicted {}", key);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache key `mapper:reference[:hash(options)]`.
///
/// Returns `None` (do not cache) when an option value is an array or object.
pub fn cache_key(mapper: &str, reference: &str, options: &Options) -> Option<String> {
    if options.values().any(|v| matches!(v, Value::Array(_) | Value::Object(_))) {
        return None;
    }
    if options.is_empty() {
        return Some(format!("{mapper}:{reference}"));
    }
    let serialized = serde_json::to_vec(options).ok()?;
    let hash = blake3::hash(&serialized);
    Some(format!("{mapper}:{reference}:{}", hex::encode(&hash.as_bytes()[..16])))
}

// ============================================================================
// Registry
// ============================================================================

/// Central lookup service for assets.
pub struct Registry {
    mappers: FxHashMap<String, Box<dyn Mapper>>,
    cache: Mutex<ResolutionCache>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.mapper_names().collect();
        names.sort_unstable();
        f.debug_struct("Registry")
            .field("mappers", &names)
            .field("cached", &self.cache.lock().len())
            .finish()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            mappers: FxHashMap::default(),
            cache: Mutex::new(ResolutionCache::new(MAX_CACHE_SIZE)),
        }
    }

    /// Register a mapper under a unique name.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the name is already registered.
    pub fn add_mapper(&mut self, name: &str, mapper: impl Mapper + 'static) -> Result<()> {
        if self.mappers.contains_key(name) {
            return Err(AssetError::invalid_argument(format!(
                "Asset mapper '{name}' is already registered"
            )));
        }
        self.mappers.insert(name.to_string(), Box::new(mapper));
        Ok(())
    }

    /// Look up a mapper by name.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for an unknown name.
    pub fn get_mapper(&self, name: &str) -> Result<&dyn Mapper> {
        self.mappers
            .get(name)
            .map(|m| m.as_ref() as &dyn Mapper)
            .ok_or_else(|| AssetError::invalid_argument(format!("Unknown asset mapper '{name}'.")))
    }

    /// Names of the registered mappers.
    pub fn mapper_names(&self) -> impl Iterator<Item = &str> {
        self.mappers.keys().map(String::as_str)
    }

    /// Resolve a qualified reference, serving repeated lookups from the cache.
    ///
    /// A not-found error for an explicitly qualified reference is rewritten
    /// to mention the mapper; errors of the implicit default pass unchanged.
    pub fn get_asset(&self, reference: impl Into<QualifiedRef>, options: &Options) -> Result<Arc<Asset>> {
        let qualified = reference.into();
        let mapper_name = qualified.mapper_name();
        let key = cache_key(mapper_name, &qualified.reference, options);

        if let Some(key) = &key
            && let Some(asset) = self.cache.lock().get(key)
        {
            return Ok(asset);
        }

        let asset = self
            .get_mapper(mapper_name)?
            .get_asset(&qualified.reference, options)
            .map_err(|e| match &qualified.mapper {
                Some(mapper) => e.qualify_reference(mapper, &qualified.reference),
                None => e,
            })?;
        let asset = Arc::new(asset);

        let mut cache = self.cache.lock();
        match key {
            Some(key) => cache.insert(key, Arc::clone(&asset)),
            // a full cache still rotates on uncacheable lookups
            None if cache.len() >= MAX_CACHE_SIZE => cache.evict_oldest(),
            None => {}
        }
        Ok(asset)
    }

    /// Like [`Registry::get_asset`], but `None` when the asset is not found.
    ///
    /// Errors other than not-found still propagate.
    pub fn try_get_asset(&self, reference: impl Into<QualifiedRef>, options: &Options) -> Result<Option<Arc<Asset>>> {
        match self.get_asset(reference, options) {
            Ok(asset) => Ok(Some(asset)),
            Err(AssetError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::GenericAsset;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Resolves everything except `missing`, counting calls.
    #[derive(Clone, Default)]
    struct CountingMapper {
        calls: Arc<AtomicUsize>,
    }

    impl Mapper for CountingMapper {
        fn get_asset(&self, reference: &str, _options: &Options) -> Result<Asset> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if reference == "missing" {
                return Err(AssetError::not_found(format!("Asset '{reference}' not found")));
            }
            Ok(Asset::Generic(GenericAsset::new(format!("/{reference}"))))
        }
    }

    fn registry() -> (Registry, Arc<AtomicUsize>) {
        let mapper = CountingMapper::default();
        let calls = Arc::clone(&mapper.calls);
        let mut registry = Registry::new();
        registry.add_mapper(DEFAULT_MAPPER, mapper).unwrap();
        (registry, calls)
    }

    fn opts(value: serde_json::Value) -> Options {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_duplicate_mapper() {
        let (mut registry, _) = registry();
        let err = registry.add_mapper(DEFAULT_MAPPER, CountingMapper::default()).unwrap_err();
        assert_eq!(err.to_string(), "Asset mapper 'default' is already registered");
    }

    #[test]
    fn test_unknown_mapper() {
        let (registry, _) = registry();
        assert!(registry.get_mapper(DEFAULT_MAPPER).is_ok());
        let err = registry.get_asset("nope:x.css", &Options::new()).unwrap_err();
        assert_eq!(err.to_string(), "Unknown asset mapper 'nope'.");
    }

    #[test]
    fn test_cache_returns_same_instance() {
        let (registry, calls) = registry();
        let a = registry.get_asset("default:logo.png", &Options::new()).unwrap();
        let b = registry.get_asset("default:logo.png", &Options::new()).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // bare reference shares the key with the qualified one
        let c = registry.get_asset("logo.png", &Options::new()).unwrap();
        assert!(Arc::ptr_eq(&a, &c));
    }

    #[test]
    fn test_cache_eviction_is_fifo() {
        let (registry, calls) = registry();
        for i in 0..=MAX_CACHE_SIZE {
            registry.get_asset(format!("file{i}"), &Options::new()).unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), MAX_CACHE_SIZE + 1);

        // the most recent entry is still cached
        registry.get_asset(format!("file{MAX_CACHE_SIZE}"), &Options::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), MAX_CACHE_SIZE + 1);

        // the first one was evicted
        registry.get_asset("file0", &Options::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), MAX_CACHE_SIZE + 2);
    }

    #[test]
    fn test_options_are_part_of_key() {
        let (registry, calls) = registry();
        let a = registry.get_asset("a.js", &opts(json!({"version": true}))).unwrap();
        let b = registry.get_asset("a.js", &opts(json!({"version": false}))).unwrap();
        let c = registry.get_asset("a.js", &opts(json!({"version": true}))).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(Arc::ptr_eq(&a, &c));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_non_scalar_options_bypass_cache() {
        let (registry, calls) = registry();
        let options = opts(json!({"sizes": [1, 2]}));
        assert_eq!(cache_key("default", "a.js", &options), None);

        registry.get_asset("a.js", &options).unwrap();
        registry.get_asset("a.js", &options).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_uncacheable_lookup_rotates_full_cache() {
        let (registry, calls) = registry();
        for i in 0..MAX_CACHE_SIZE {
            registry.get_asset(format!("file{i}"), &Options::new()).unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), MAX_CACHE_SIZE);

        registry.get_asset("a.js", &opts(json!({"sizes": [1, 2]}))).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), MAX_CACHE_SIZE + 1);

        // file1 survived, file0 was rotated out
        registry.get_asset("file1", &Options::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), MAX_CACHE_SIZE + 1);
        registry.get_asset("file0", &Options::new()).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), MAX_CACHE_SIZE + 2);
    }

    #[test]
    fn test_debug_lists_mappers() {
        let (registry, _) = registry();
        registry.get_asset("a.js", &Options::new()).unwrap();
        let text = format!("{registry:?}");
        assert!(text.contains(r#"mappers: ["default"]"#));
        assert!(text.contains("cached: 1"));
    }

    #[test]
    fn test_cache_key_format() {
        assert_eq!(
            cache_key("default", "a.js", &Options::new()).as_deref(),
            Some("default:a.js")
        );
        let key = cache_key("default", "a.js", &opts(json!({"version": null}))).unwrap();
        assert!(key.starts_with("default:a.js:"));
        assert_eq!(key.len(), "default:a.js:".len() + 32);
    }

    #[test]
    fn test_not_found_qualified_message() {
        let (registry, _) = registry();
        let err = registry.get_asset("default:missing", &Options::new()).unwrap_err();
        assert_eq!(err.to_string(), "Asset 'default:missing' not found");

        let err = registry.get_asset("missing", &Options::new()).unwrap_err();
        assert_eq!(err.to_string(), "Asset 'missing' not found");

        let err = registry.get_asset(("default", "missing"), &Options::new()).unwrap_err();
        assert_eq!(err.to_string(), "Asset 'default:missing' not found");
    }

    #[test]
    fn test_try_get_asset() {
        let (registry, _) = registry();
        assert!(registry.try_get_asset("missing", &Options::new()).unwrap().is_none());
        assert!(registry.try_get_asset("there.css", &Options::new()).unwrap().is_some());
        // configuration errors are not swallowed
        assert!(registry.try_get_asset("nope:x", &Options::new()).is_err());
    }
}
