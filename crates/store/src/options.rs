//! Connection options derived from a store URI and environment overrides.
//!
//! Precedence for the tunable fields (highest wins):
//!
//! 1. Environment variables (REDIS_CACHE_*)
//! 2. Built-in defaults (300 second TTL, memory driver)
//!
//! The namespace and endpoint come from the store URI itself. Environment
//! state is read once here, at option-build time; store operations never
//! touch it.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Transport driver for the key/value backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Driver {
    /// Portable in-process store. The default; needs no running service.
    Memory,
    /// Networked RESP client speaking to a Redis-compatible service.
    Redis,
}

/// Environment-tunable settings, layered via figment.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Overrides {
    /// Set via REDIS_CACHE_EXPIRES_IN (integer seconds).
    expires_in: u64,

    /// Set via REDIS_CACHE_DRIVER (`memory` or `redis`).
    driver: Driver,
}

impl Default for Overrides {
    fn default() -> Self {
        Self { expires_in: 300, driver: Driver::Memory }
    }
}

/// Connection options for one store instance.
///
/// Immutable after construction: every write issued by a store built from
/// these options uses the same namespace and default TTL.
#[derive(Debug, Clone)]
pub struct ConnectionOptions {
    /// Network address of the key/value service.
    pub endpoint: Url,

    /// Logical key prefix. The last path segment of the store URI, or
    /// `"cache"` when the URI carries no path.
    pub namespace: String,

    /// Default TTL in seconds applied by stores that force an expiry.
    pub expires_in: u64,

    /// Backend driver selection.
    pub driver: Driver,
}

impl ConnectionOptions {
    /// Build options from a store URI such as
    /// `redis://127.0.0.1:6380/0/entitystore`, reading environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidUri` when the URI does not parse, and
    /// `Error::Config` when an override variable holds an unusable value.
    pub fn build(uri: &str) -> Result<Self, Error> {
        let endpoint = Url::parse(uri).map_err(|e| Error::InvalidUri { uri: uri.to_string(), reason: e.to_string() })?;

        let namespace = endpoint
            .path_segments()
            .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
            .map_or_else(|| "cache".to_string(), str::to_string);

        let overrides: Overrides = Figment::from(Serialized::defaults(Overrides::default()))
            .merge(Env::prefixed("REDIS_CACHE_").map(|key| key.as_str().to_lowercase().into()))
            .extract()
            .map_err(|e| Error::Config { field: "REDIS_CACHE_*".into(), reason: e.to_string() })?;

        Ok(Self { endpoint, namespace, expires_in: overrides.expires_in, driver: overrides.driver })
    }
}
