//! Process-lifetime in-memory cache.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{Cache, CacheBucket};

/// One stored value and the fingerprint it was rendered from.
struct Entry {
    etag: String,
    value: Arc<[u8]>,
}

/// Shared storage behind every handle to one bucket.
#[derive(Default)]
struct BucketStore {
    entries: RwLock<HashMap<String, Entry>>,
}

/// In-memory [`Cache`].
///
/// Buckets live for as long as the cache does. Concurrent lookups share a
/// read lock and proceed in parallel; a store takes the write lock for the
/// duration of a single map insert.
#[derive(Default)]
pub struct MemoryCache {
    buckets: RwLock<HashMap<String, Arc<BucketStore>>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a bucket with its concrete type, exposing entry counts.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn memory_bucket(&self, name: &str) -> MemoryCacheBucket {
        if let Some(store) = self.buckets.read().unwrap().get(name) {
            return MemoryCacheBucket {
                store: Arc::clone(store),
            };
        }

        let mut buckets = self.buckets.write().unwrap();
        let store = buckets.entry(name.to_owned()).or_default();
        MemoryCacheBucket {
            store: Arc::clone(store),
        }
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(self.memory_bucket(name))
    }
}

/// Handle onto one [`MemoryCache`] bucket.
///
/// Cloning the handle shares the underlying entries.
#[derive(Clone)]
pub struct MemoryCacheBucket {
    store: Arc<BucketStore>,
}

impl MemoryCacheBucket {
    /// Number of stored entries.
    ///
    /// # Panics
    ///
    /// Panics if the internal `RwLock` is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.entries.read().unwrap().len()
    }

    /// Whether the bucket holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>> {
        let entries = self.store.entries.read().unwrap();
        let entry = entries.get(key)?;
        if !etag.is_empty() && entry.etag != etag {
            tracing::debug!(key, "Cache fingerprint mismatch");
            return None;
        }
        Some(entry.value.to_vec())
    }

    fn set(&self, key: &str, etag: &str, value: &[u8]) {
        let entry = Entry {
            etag: etag.to_owned(),
            value: Arc::from(value),
        };
        // Last writer wins; writers for one key produce identical bytes.
        self.store
            .entries
            .write()
            .unwrap()
            .insert(key.to_owned(), entry);
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_get_after_set() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("pages");
        bucket.set("adr-0001-aa", "aa", b"page");
        assert_eq!(bucket.get("adr-0001-aa", "aa"), Some(b"page".to_vec()));
    }

    #[test]
    fn test_miss_for_unknown_key() {
        let cache = MemoryCache::new();
        assert_eq!(cache.bucket("pages").get("missing", ""), None);
    }

    #[test]
    fn test_etag_mismatch_misses() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("pages");
        bucket.set("index", "v1", b"old");
        assert_eq!(bucket.get("index", "v2"), None);
        assert_eq!(bucket.get("index", ""), Some(b"old".to_vec()));
    }

    #[test]
    fn test_set_overwrites() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("pages");
        bucket.set("index", "v1", b"old");
        bucket.set("index", "v2", b"new");
        assert_eq!(bucket.get("index", "v2"), Some(b"new".to_vec()));
        assert_eq!(cache.memory_bucket("pages").len(), 1);
    }

    #[test]
    fn test_same_name_shares_entries() {
        let cache = MemoryCache::new();
        cache.bucket("pages").set("k", "e", b"v");
        assert_eq!(cache.bucket("pages").get("k", "e"), Some(b"v".to_vec()));
    }

    #[test]
    fn test_buckets_are_isolated() {
        let cache = MemoryCache::new();
        cache.bucket("pages").set("k", "e", b"v");
        assert_eq!(cache.bucket("search").get("k", "e"), None);
        assert!(cache.memory_bucket("search").is_empty());
    }

    #[test]
    fn test_concurrent_readers_and_writers() {
        let cache = Arc::new(MemoryCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let bucket = cache.bucket("pages");
                    let key = format!("adr-{:04}", i % 4);
                    bucket.set(&key, "", key.as_bytes());
                    for _ in 0..100 {
                        assert_eq!(bucket.get(&key, ""), Some(key.as_bytes().to_vec()));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.memory_bucket("pages").len(), 4);
    }
}
