//! Redis-backed storage for an HTTP caching layer.
//!
//! This crate provides the two pluggable stores such a layer needs:
//!
//! - [`EntityStore`] — response bodies as content-addressed blobs, keyed by
//!   the SHA-1 digest of their content
//! - [`MetaStore`] — per cache key, the list of negotiated request/response
//!   header variants, keyed by a SHA-1 hash of the cache key
//!
//! Both are thin adapters over a key/value backend selected by a store URI
//! plus environment overrides. HTTP semantics — Vary matching, freshness,
//! invalidation — belong to the consuming caching framework; this crate only
//! moves bytes.

pub mod backend;
pub mod digest;
pub mod entity;
pub mod error;
pub mod meta;
pub mod options;

pub use backend::KvCache;
pub use entity::{EntityBody, EntityStore};
pub use error::Error;
pub use meta::{HeaderSnapshot, MetaStore, Variant, WriteOptions};
pub use options::{ConnectionOptions, Driver};
