//! Variant metadata storage keyed by hashed cache keys.
//!
//! The backend key is always `SHA1(cache_key)`, never the raw key, so
//! arbitrarily long cache keys (full URLs, query strings, multi-KB strings)
//! map to fixed-size backend keys with a bounded character set.
//!
//! Concurrent writers to the same cache key are last-write-wins; there is
//! no compare-and-swap. The stored value is whichever write completed last
//! at the backend, never a merge of both.

use serde::{Deserialize, Serialize};

use crate::backend::KvCache;
use crate::digest::hexdigest;
use crate::error::Error;
use crate::options::ConnectionOptions;

/// Header snapshot as stored: field names to JSON values, uninterpreted.
pub type HeaderSnapshot = serde_json::Map<String, serde_json::Value>;

/// One negotiated request/response pair recorded for a cache key.
///
/// The snapshots are opaque to this crate: they are serialized and restored
/// verbatim, and interpreted only by the caching framework (Vary matching,
/// header reconstruction).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub request: HeaderSnapshot,
    pub response: HeaderSnapshot,
}

/// Per-call overrides for [`MetaStore::write`].
#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    /// Override the store's default TTL for this write.
    pub expires_in: Option<u64>,
}

/// Hashed-key store for negotiated variant lists.
#[derive(Debug, Clone)]
pub struct MetaStore {
    cache: KvCache,
}

impl MetaStore {
    /// Build a store from a store URI, reading environment overrides.
    ///
    /// This is the factory surface the caching framework resolves stores
    /// through; the URI's trailing path segment becomes the namespace.
    pub async fn resolve(uri: &str) -> Result<Self, Error> {
        Self::new(ConnectionOptions::build(uri)?).await
    }

    /// Build a store from already-derived options.
    pub async fn new(options: ConnectionOptions) -> Result<Self, Error> {
        Ok(Self { cache: KvCache::connect(options).await? })
    }

    /// Build a store over an existing cache handle.
    pub fn with_cache(cache: KvCache) -> Self {
        Self { cache }
    }

    /// Read the variant list for `cache_key`.
    ///
    /// An untouched or expired key reads as an empty list, never an error.
    ///
    /// # Errors
    ///
    /// Returns `Error::Codec` when a stored value cannot be decoded, and
    /// `Error::Backend` on transport failure.
    pub async fn read(&self, cache_key: &str) -> Result<Vec<Variant>, Error> {
        match self.cache.read(&hexdigest(cache_key.as_bytes())).await? {
            Some(raw) => serde_json::from_slice(&raw)
                .map_err(|e| Error::Codec { key: cache_key.to_string(), reason: e.to_string() }),
            None => Ok(Vec::new()),
        }
    }

    /// Replace the variant list for `cache_key`.
    ///
    /// The caller supplies the complete desired list; prior variants are
    /// not merged. The list is encoded in full before any backend command
    /// is issued, so an encoding or transport failure here leaves every
    /// other key's entry untouched.
    ///
    /// # Errors
    ///
    /// Returns `Error::Codec` when the list cannot be encoded, and
    /// `Error::Backend` when the write does not reach the backend.
    pub async fn write(&self, cache_key: &str, variants: &[Variant], options: WriteOptions) -> Result<(), Error> {
        let raw = serde_json::to_vec(variants)
            .map_err(|e| Error::Codec { key: cache_key.to_string(), reason: e.to_string() })?;

        let ttl = options.expires_in.unwrap_or_else(|| self.cache.expires_in());
        self.cache.write(&hexdigest(cache_key.as_bytes()), raw, Some(ttl)).await?;
        tracing::debug!(cache_key, variants = variants.len(), "stored metadata");

        Ok(())
    }

    /// Delete the entry for `cache_key`. A missing key is a silent no-op.
    pub async fn purge(&self, cache_key: &str) -> Result<(), Error> {
        self.cache.delete(&hexdigest(cache_key.as_bytes())).await
    }
}
