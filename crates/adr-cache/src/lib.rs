//! Render cache for the ADR site generator.
//!
//! Rendered pages are stored as raw bytes under a cache key. Two traits
//! form the API:
//!
//! - [`Cache`]: factory for named buckets
//! - [`CacheBucket`]: key-value store that also records the content
//!   fingerprint each entry was produced from
//!
//! Key construction belongs to the caller. Keys are expected to encode the
//! content fingerprint of everything that went into the value, so a changed
//! input produces a new key and the old entry simply becomes unreachable.
//!
//! # Implementations
//!
//! - [`MemoryCache`]: process-lifetime store guarded by a reader/writer lock
//! - [`NullCache`] / [`NullCacheBucket`]: always miss (caching disabled)
//!
//! # Limitations
//!
//! [`MemoryCache`] has no expiry and no size bound. It is sized for a single
//! project's decision records. Reusing it for large corpora needs a bounded
//! eviction policy (e.g. least-recently-used) behind the same trait.
//!
//! # Example
//!
//! ```
//! use adr_cache::{Cache, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! let pages = cache.bucket("pages");
//! pages.set("adr-0001-abc", "abc", b"<html>...</html>");
//! assert_eq!(pages.get("adr-0001-abc", "abc").as_deref(), Some(&b"<html>...</html>"[..]));
//! ```

mod ext;
mod memory;

pub use ext::CacheBucketExt;
pub use memory::{MemoryCache, MemoryCacheBucket};

/// A named partition within a [`Cache`].
///
/// Each entry stores the value together with the fingerprint (`etag`) of the
/// content that produced it. A hit requires both the key and the fingerprint
/// to match.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value.
    ///
    /// Returns `Some(value)` if the key exists **and** was stored with the same
    /// `etag`. An empty `etag` skips the fingerprint comparison.
    fn get(&self, key: &str, etag: &str) -> Option<Vec<u8>>;

    /// Store a value, replacing any previous entry under the same key.
    fn set(&self, key: &str, etag: &str, value: &[u8]);
}

/// Factory for named [`CacheBucket`]s.
///
/// Buckets are isolated from each other. Calling `bucket` twice with the same
/// name returns handles onto the same entries.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`]: every `get` misses and every `set` is dropped.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str, _etag: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _etag: &str, _value: &[u8]) {}
}

/// No-op [`Cache`] used when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}
