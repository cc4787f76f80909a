//! Key/value backend drivers and the namespacing cache wrapper.
//!
//! Stores never talk to a driver directly; they go through [`KvCache`],
//! which owns the driver connection, prefixes every key with the configured
//! namespace, and carries the configured default TTL. Drivers implement the
//! narrow [`KvBackend`] trait:
//!
//! | Driver | Module | Use case |
//! |--------|--------|----------|
//! | Memory | [`memory`] | Portable default, tests, single process |
//! | Redis | [`redis`] | Shared cache over a Redis-compatible service |

pub mod memory;
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Error;
use crate::options::{ConnectionOptions, Driver};

/// The minimal operations a driver must support.
///
/// Implementations must be safe for concurrent use from multiple callers;
/// the stores add no locking of their own.
#[async_trait]
pub trait KvBackend: Send + Sync {
    /// Read the value stored under `key`, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error>;

    /// Store `value` under `key`. `Some(ttl)` sets an explicit expiry in
    /// seconds; `None` leaves expiry to the backend's own defaults.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<u64>) -> Result<(), Error>;

    /// Whether `key` currently holds an unexpired value.
    async fn exists(&self, key: &str) -> Result<bool, Error>;

    /// Delete `key`. Deleting an absent key is not an error.
    async fn del(&self, key: &str) -> Result<(), Error>;
}

/// Construct the driver named by `options`, connected to its endpoint.
///
/// The driver is selected exactly once, here, at configuration time.
pub async fn connect(options: &ConnectionOptions) -> Result<Arc<dyn KvBackend>, Error> {
    match options.driver {
        Driver::Memory => Ok(Arc::new(memory::MemoryBackend::new())),
        Driver::Redis => Ok(Arc::new(redis::RedisBackend::connect(&options.endpoint).await?)),
    }
}

/// Namespaced view of a backend with a default TTL.
///
/// Every key passed in by a store is prefixed with `namespace:` before it
/// reaches the driver, so two caches with different namespaces never
/// observe each other's entries even on a shared connection.
#[derive(Clone)]
pub struct KvCache {
    backend: Arc<dyn KvBackend>,
    options: ConnectionOptions,
}

impl std::fmt::Debug for KvCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvCache").field("options", &self.options).finish_non_exhaustive()
    }
}

impl KvCache {
    /// Connect the driver selected by `options` and wrap it.
    pub async fn connect(options: ConnectionOptions) -> Result<Self, Error> {
        let backend = connect(&options).await?;
        Ok(Self { backend, options })
    }

    /// Wrap an existing backend. Lets several namespaces share one
    /// connection.
    pub fn with_backend(backend: Arc<dyn KvBackend>, options: ConnectionOptions) -> Self {
        Self { backend, options }
    }

    /// The options this cache was built with.
    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// The configured default TTL, in seconds.
    pub fn expires_in(&self) -> u64 {
        self.options.expires_in
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:{}", self.options.namespace, key)
    }

    pub async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        self.backend.get(&self.namespaced(key)).await
    }

    /// Write `value` under `key` with an explicit TTL, or none.
    pub async fn write(&self, key: &str, value: Vec<u8>, ttl: Option<u64>) -> Result<(), Error> {
        self.backend.set(&self.namespaced(key), value, ttl).await
    }

    pub async fn exists(&self, key: &str) -> Result<bool, Error> {
        self.backend.exists(&self.namespaced(key)).await
    }

    pub async fn delete(&self, key: &str) -> Result<(), Error> {
        self.backend.del(&self.namespaced(key)).await
    }
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryBackend;
    use super::*;

    fn options(namespace: &str) -> ConnectionOptions {
        ConnectionOptions {
            endpoint: url::Url::parse("redis://127.0.0.1:6379/0").unwrap(),
            namespace: namespace.to_string(),
            expires_in: 300,
            driver: Driver::Memory,
        }
    }

    #[tokio::test]
    async fn test_read_write_roundtrip() {
        let cache = KvCache::connect(options("cache")).await.unwrap();
        assert_eq!(cache.options().namespace, "cache");
        assert_eq!(cache.expires_in(), 300);

        cache.write("key", b"value".to_vec(), None).await.unwrap();
        assert_eq!(cache.read("key").await.unwrap(), Some(b"value".to_vec()));
    }

    #[tokio::test]
    async fn test_namespace_isolation_on_shared_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let first = KvCache::with_backend(backend.clone(), options("entitystore"));
        let second = KvCache::with_backend(backend, options("metastore"));

        first.write("key", b"first".to_vec(), None).await.unwrap();
        second.write("key", b"second".to_vec(), None).await.unwrap();

        assert_eq!(first.read("key").await.unwrap(), Some(b"first".to_vec()));
        assert_eq!(second.read("key").await.unwrap(), Some(b"second".to_vec()));

        first.delete("key").await.unwrap();
        assert_eq!(first.read("key").await.unwrap(), None);
        assert_eq!(second.read("key").await.unwrap(), Some(b"second".to_vec()));
    }

    #[tokio::test]
    async fn test_exists_and_delete() {
        let cache = KvCache::connect(options("cache")).await.unwrap();
        assert!(!cache.exists("key").await.unwrap());

        cache.write("key", b"value".to_vec(), None).await.unwrap();
        assert!(cache.exists("key").await.unwrap());

        cache.delete("key").await.unwrap();
        assert!(!cache.exists("key").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_missing_key_is_noop() {
        let cache = KvCache::connect(options("cache")).await.unwrap();
        cache.delete("never-written").await.unwrap();
    }
}
