//! Errors surfaced by the cache layer.

use super::transport::TransportError;

/// Failure of a cached fetch.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
  /// The transport failed and no usable cached copy existed.
  #[error(transparent)]
  Transport(#[from] TransportError),

  /// The payload did not match the shape expected for the resource.
  #[error("unexpected payload for {key}: {source}")]
  Transform {
    key: String,
    #[source]
    source: serde_json::Error,
  },

  /// The server answered 304 although nothing was cached for the key.
  #[error("server reported {key} unchanged but nothing is cached")]
  UnexpectedNotModified { key: String },
}

impl FetchError {
  pub(crate) fn transform(key: &str, source: serde_json::Error) -> Self {
    Self::Transform {
      key: key.to_string(),
      source,
    }
  }
}
