//! Error types for store construction and backend calls.
//!
//! Not-found is never an error anywhere in this crate: absent entries read
//! as `None` or an empty list, and purging a missing key is a no-op.

use thiserror::Error;

/// Errors surfaced by the stores and their configuration.
#[derive(Debug, Error)]
pub enum Error {
    /// The store URI could not be parsed.
    #[error("invalid store URI `{uri}`: {reason}")]
    InvalidUri { uri: String, reason: String },

    /// An environment override held a value the option builder cannot use.
    #[error("invalid configuration: {field} - {reason}")]
    Config { field: String, reason: String },

    /// The key/value backend reported a transport or command failure.
    #[error("backend error: {0}")]
    Backend(String),

    /// A variant list could not be encoded or decoded for its cache key.
    #[error("metadata codec failure for cache key `{key}`: {reason}")]
    Codec { key: String, reason: String },
}

impl From<redis::RedisError> for Error {
    fn from(err: redis::RedisError) -> Self {
        Error::Backend(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_uri_display() {
        let err = Error::InvalidUri { uri: "not a uri".into(), reason: "relative URL without a base".into() };
        assert!(err.to_string().contains("not a uri"));
        assert!(err.to_string().contains("invalid store URI"));
    }

    #[test]
    fn test_codec_display_includes_key() {
        let err = Error::Codec { key: "/test?x=y".into(), reason: "expected value".into() };
        assert!(err.to_string().contains("/test?x=y"));
    }
}
