//! SHA-1 hex digests for content addressing and cache-key hashing.

use sha1::{Digest, Sha1};

/// Hex-encode the SHA-1 digest of `data`.
///
/// The 40-character lowercase form is the external key format for both
/// stores. It must stay bit-compatible with entries written by other
/// implementations of the same layout, so the algorithm is pinned.
pub fn hexdigest(data: &[u8]) -> String {
    hex::encode(Sha1::digest(data))
}
