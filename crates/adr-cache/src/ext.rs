//! Typed helpers on top of [`CacheBucket`].

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheBucket;

/// String and JSON access for any [`CacheBucket`].
///
/// Kept out of [`CacheBucket`] so the base trait stays object-safe and
/// serde-free for implementors.
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a cached UTF-8 string. Invalid UTF-8 counts as a miss.
    fn get_string(&self, key: &str, etag: &str) -> Option<String> {
        String::from_utf8(self.get(key, etag)?).ok()
    }

    /// Store a string value.
    fn set_string(&self, key: &str, etag: &str, value: &str) {
        self.set(key, etag, value.as_bytes());
    }

    /// Retrieve and deserialize a JSON value. Decode failures count as a miss.
    fn get_json<T: DeserializeOwned>(&self, key: &str, etag: &str) -> Option<T> {
        let bytes = self.get(key, etag)?;
        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(key, error = %err, "Discarding undecodable cache entry");
                None
            }
        }
    }

    /// Serialize a value as JSON and store it. Serialization failures are dropped.
    fn set_json<T: Serialize>(&self, key: &str, etag: &str, value: &T) {
        if let Ok(bytes) = serde_json::to_vec(value) {
            self.set(key, etag, &bytes);
        }
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}
