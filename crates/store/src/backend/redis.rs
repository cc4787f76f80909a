//! Networked driver speaking RESP to a Redis-compatible service.
//!
//! One multiplexed connection per store instance, shared by every call via
//! [`ConnectionManager`]. No retries, pooling, or circuit breaking beyond
//! what the manager provides: a transport failure surfaces as
//! `Error::Backend` on the call that hit it, and nothing was stored.

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use url::Url;

use super::KvBackend;
use crate::error::Error;

/// Redis driver over a multiplexed async connection.
#[derive(Clone)]
pub struct RedisBackend {
    connection: ConnectionManager,
}

impl RedisBackend {
    /// Open a client for `endpoint` and establish the managed connection.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` when the endpoint is not a Redis URL or the
    /// initial connection cannot be established.
    pub async fn connect(endpoint: &Url) -> Result<Self, Error> {
        let client = redis::Client::open(endpoint.as_str())?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }
}

#[async_trait]
impl KvBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, Error> {
        let mut connection = self.connection.clone();
        Ok(connection.get(key).await?)
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<u64>) -> Result<(), Error> {
        let mut connection = self.connection.clone();
        match ttl {
            Some(seconds) => connection.set_ex::<_, _, ()>(key, value, seconds).await?,
            None => connection.set::<_, _, ()>(key, value).await?,
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, Error> {
        let mut connection = self.connection.clone();
        Ok(connection.exists(key).await?)
    }

    async fn del(&self, key: &str) -> Result<(), Error> {
        let mut connection = self.connection.clone();
        connection.del::<_, ()>(key).await?;
        Ok(())
    }
}
