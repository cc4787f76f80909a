//! Portable in-process driver.
//!
//! The default driver: a process-local map with the same TTL semantics as
//! the networked driver. Useful wherever a shared service is unavailable,
//! including the test suite.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use super::KvBackend;
use crate::error::Error;

#[derive(Debug)]
struct Entry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// In-memory key/value store with per-entry expiry.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl KvBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let mut entries = self.lock();
        if entries.get(key).is_some_and(Entry::expired) {
            entries.remove(key);
            return Ok(None);
        }
        Ok(entries.get(key).map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<u64>) -> Result<(), Error> {
        let expires_at = ttl.map(|seconds| Instant::now() + Duration::from_secs(seconds));
        self.lock().insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, Error> {
        Ok(self.get(key).await?.is_some())
    }

    async fn del(&self, key: &str) -> Result<(), Error> {
        self.lock().remove(key);
        Ok(())
    }
}
