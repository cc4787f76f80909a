//! Content-addressed blob storage for response bodies.
//!
//! Bodies are keyed by the SHA-1 digest of their content, so identical
//! content always lands on the same key and concurrent writes of the same
//! body are idempotent. Digest equality is trusted as content equality, the
//! standard content-addressing assumption.

use bytes::{Bytes, BytesMut};

use crate::backend::KvCache;
use crate::digest::hexdigest;
use crate::error::Error;
use crate::options::ConnectionOptions;

/// Content-addressed entity store.
#[derive(Debug, Clone)]
pub struct EntityStore {
    cache: KvCache,
}

/// A stored body exposed as a chunked iterator.
///
/// Single-shot: yields the full content as one chunk, then ends. The
/// content is fully buffered before it reaches the caller; the iterator
/// shape only preserves the streaming-body contract.
#[derive(Debug)]
pub struct EntityBody {
    chunk: Option<Bytes>,
}

impl Iterator for EntityBody {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        self.chunk.take()
    }
}

impl EntityStore {
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

    /// Whether a body with this digest is currently stored.
    pub async fn exists(&self, digest: &str) -> Result<bool, Error> {
        self.cache.exists(digest).await
    }

    /// Read the full body for `digest`, or `None` when absent or expired.
    pub async fn read(&self, digest: &str) -> Result<Option<Bytes>, Error> {
        Ok(self.cache.read(digest).await?.map(Bytes::from))
    }

    /// Read the body for `digest` as a chunked iterator, or `None` when
    /// absent.
    pub async fn open(&self, digest: &str) -> Result<Option<EntityBody>, Error> {
        Ok(self.read(digest).await?.map(|chunk| EntityBody { chunk: Some(chunk) }))
    }

    /// Store a body, returning its digest and size in bytes.
    ///
    /// All chunks are buffered, the digest is computed over the
    /// concatenated bytes, and a single backend write stores the buffer
    /// under the digest key. `ttl == 0` stores without an explicit expiry,
    /// leaving any backend default in force; any other value sets one.
    ///
    /// # Errors
    ///
    /// Returns `Error::Backend` when the write does not reach the backend.
    /// The write is atomic from the backend's perspective: on failure
    /// nothing was stored under the digest.
    pub async fn write<B, C>(&self, body: B, ttl: u64) -> Result<(String, u64), Error>
    where
        B: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        let mut buf = BytesMut::new();
        for chunk in body {
            buf.extend_from_slice(chunk.as_ref());
        }

        let digest = hexdigest(&buf);
        let size = buf.len() as u64;
        let ttl = (ttl > 0).then_some(ttl);

        self.cache.write(&digest, buf.to_vec(), ttl).await?;
        tracing::debug!(%digest, size, "stored entity");

        Ok((digest, size))
    }

    /// Delete the body for `digest`. A missing digest is a silent no-op.
    pub async fn purge(&self, digest: &str) -> Result<(), Error> {
        self.cache.delete(digest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Driver;

    fn sha_like(digest: &str) -> bool {
        digest.len() == 40 && digest.chars().all(|c| c.is_ascii_hexdigit())
    }

    fn test_options() -> ConnectionOptions {
        ConnectionOptions {
            endpoint: url::Url::parse("redis://127.0.0.1:6379/0/entitystore").unwrap(),
            namespace: "entitystore".to_string(),
            expires_in: 300,
            driver: Driver::Memory,
        }
    }

    async fn store() -> EntityStore {
        EntityStore::new(test_options()).await.unwrap()
    }

    #[tokio::test]
    async fn test_write_returns_digest_and_size() {
        let store = store().await;
        let (digest, size) = store.write(["My wild love went riding,"], 0).await.unwrap();
        assert!(sha_like(&digest));
        assert_eq!(size, 25);
    }

    #[tokio::test]
    async fn test_write_gives_known_sha1_digest() {
        let store = store().await;
        let (digest, _) = store.write(["she rode to the sea;"], 0).await.unwrap();
        assert_eq!(digest, "90a4c84d51a277f3dafc34693ca264531b9f51b6");
    }

    #[tokio::test]
    async fn test_read_returns_written_body() {
        let store = store().await;
        let (digest, _) = store.write(["And asked him to pay."], 0).await.unwrap();
        let body = store.read(&digest).await.unwrap().unwrap();
        assert_eq!(&body[..], b"And asked him to pay.");
    }

    #[tokio::test]
    async fn test_read_missing_digest_is_none() {
        let store = store().await;
        let body = store.read("87fe0a1ae82a518592f6b12b0183e950b4541c62").await.unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_write_concatenates_chunks() {
        let store = store().await;
        let (digest, size) = store.write(["She gathered", " ", "together"], 0).await.unwrap();
        assert_eq!(size, 21);
        let body = store.read(&digest).await.unwrap().unwrap();
        assert_eq!(&body[..], b"She gathered together");
    }

    #[tokio::test]
    async fn test_write_with_ttl() {
        let store = store().await;
        let (digest, _) = store.write(["My wild love went riding,"], 120).await.unwrap();
        assert!(sha_like(&digest));
        assert!(store.exists(&digest).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists() {
        let store = store().await;
        let (digest, _) = store.write(["She rode to the devil,"], 0).await.unwrap();
        assert!(store.exists(&digest).await.unwrap());
        assert!(!store.exists("938jasddj83jasdh4438021ksdfjsdfjsdsf").await.unwrap());
    }

    #[tokio::test]
    async fn test_open_yields_single_chunk_body() {
        let store = store().await;
        let (digest, _) = store.write(["Some shells for her hair."], 0).await.unwrap();

        let body = store.open(&digest).await.unwrap().unwrap();
        let mut buf = Vec::new();
        for chunk in body {
            buf.extend_from_slice(&chunk);
        }
        assert_eq!(buf, b"Some shells for her hair.");
    }

    #[tokio::test]
    async fn test_open_is_single_shot() {
        let store = store().await;
        let (digest, _) = store.write(["once"], 0).await.unwrap();

        let mut body = store.open(&digest).await.unwrap().unwrap();
        assert!(body.next().is_some());
        assert!(body.next().is_none());
    }

    #[tokio::test]
    async fn test_open_missing_digest_is_none() {
        let store = store().await;
        let body = store.open("87fe0a1ae82a518592f6b12b0183e950b4541c62").await.unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_binary_content_roundtrip() {
        let store = store().await;
        let blob: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

        let (digest, size) = store.write([&blob], 0).await.unwrap();
        assert_eq!(size, 4096);

        let body = store.read(&digest).await.unwrap().unwrap();
        assert_eq!(&body[..], &blob[..]);
    }

    #[tokio::test]
    async fn test_idempotent_double_write() {
        let store = store().await;
        let (first, _) = store.write(["same content"], 0).await.unwrap();
        let (second, _) = store.write(["same content"], 0).await.unwrap();
        assert_eq!(first, second);

        let body = store.read(&first).await.unwrap().unwrap();
        assert_eq!(&body[..], b"same content");
    }

    #[tokio::test]
    async fn test_purge_removes_entry() {
        let store = store().await;
        let (digest, _) = store.write(["My wild love went riding,"], 0).await.unwrap();

        store.purge(&digest).await.unwrap();
        assert!(store.read(&digest).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_purge_missing_digest_is_silent() {
        let store = store().await;
        store.purge("87fe0a1ae82a518592f6b12b0183e950b4541c62").await.unwrap();
    }
}
