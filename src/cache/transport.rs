//! The request transport the cache layer is built on.
//!
//! The cache layer only knows how to ask for a resource and how to read the
//! three outcomes a transport can produce: a fresh body, a not-modified
//! signal, or a failure. Authentication, base URL and wire format belong to
//! the implementation (see `toshl::client`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ETAG, LAST_MODIFIED};
use serde_json::Value;

/// Description of a single remote read.
#[derive(Debug, Clone, Default)]
pub struct ResourceRequest {
  /// Path relative to the API root (e.g. "/categories")
  pub path: String,
  /// Query parameters, sent in order
  pub query: Vec<(String, String)>,
  /// Extra request headers (conditional validators end up here)
  pub headers: HeaderMap,
}

impl ResourceRequest {
  pub fn new(path: impl Into<String>) -> Self {
    Self {
      path: path.into(),
      ..Self::default()
    }
  }

  /// Add a query parameter.
  pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
    self.query.push((name.into(), value.into()));
    self
  }
}

/// Successful outcome of a transport call.
#[derive(Debug, Clone)]
pub enum TransportResponse {
  /// The server sent a representation.
  Fresh { body: Value, headers: HeaderMap },
  /// The server confirmed the validators we sent are still current (304).
  NotModified,
}

/// HTTP validators identifying one version of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validators {
  pub etag: Option<String>,
  pub last_modified: Option<String>,
}

impl Validators {
  /// Read `ETag` and `Last-Modified` from response headers.
  pub fn from_headers(headers: &HeaderMap) -> Self {
    Self {
      etag: headers
        .get(ETAG)
        .and_then(|v| v.to_str().ok())
        .map(String::from),
      last_modified: headers
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .map(String::from),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.etag.is_none() && self.last_modified.is_none()
  }
}

/// Failure reported by a transport.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
  /// Could not reach the server.
  #[error("network error: {message}")]
  Network { message: String },

  /// The request did not complete in time.
  #[error("request timed out")]
  Timeout,

  /// Token missing, invalid or lacking access.
  #[error("unauthorized ({status}): check TOSHL_TOKEN")]
  Unauthorized { status: u16 },

  /// The API rate limit was hit.
  #[error("rate limited: retry after {retry_after:?}")]
  RateLimited { retry_after: Option<Duration> },

  /// Any other non-success status.
  #[error("request failed with status {status}: {message}")]
  Status { status: u16, message: String },

  /// The body could not be decoded.
  #[error("malformed response: {message}")]
  Decode { message: String },
}

impl TransportError {
  /// HTTP status behind the failure, when there was one.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Unauthorized { status } | Self::Status { status, .. } => Some(*status),
      Self::RateLimited { .. } => Some(429),
      Self::Network { .. } | Self::Timeout | Self::Decode { .. } => None,
    }
  }
}

/// A capability that performs GET requests for the cache layer.
#[async_trait]
pub trait Transport: Send + Sync {
  async fn get(&self, request: ResourceRequest) -> Result<TransportResponse, TransportError>;
}

#[cfg(test)]
mod tests {
  use super::*;
  use reqwest::header::HeaderValue;

  #[test]
  fn validators_read_from_headers() {
    let mut headers = HeaderMap::new();
    headers.insert(ETAG, HeaderValue::from_static("\"v1\""));
    headers.insert(
      LAST_MODIFIED,
      HeaderValue::from_static("Wed, 21 Oct 2026 07:28:00 GMT"),
    );

    let validators = Validators::from_headers(&headers);
    assert_eq!(validators.etag.as_deref(), Some("\"v1\""));
    assert_eq!(
      validators.last_modified.as_deref(),
      Some("Wed, 21 Oct 2026 07:28:00 GMT")
    );
    assert!(!validators.is_empty());
  }

  #[test]
  fn validators_empty_without_headers() {
    assert!(Validators::from_headers(&HeaderMap::new()).is_empty());
  }

  #[test]
  fn status_reported_only_for_http_failures() {
    assert_eq!(TransportError::Timeout.status(), None);
    assert_eq!(
      TransportError::Status {
        status: 502,
        message: "bad gateway".into()
      }
      .status(),
      Some(502)
    );
    assert_eq!(
      TransportError::RateLimited { retry_after: None }.status(),
      Some(429)
    );
  }
}
