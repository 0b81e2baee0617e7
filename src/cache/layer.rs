//! Cache layer that fronts reference-data requests with conditional
//! revalidation and an offline fallback.

use std::sync::Arc;

use chrono::Duration;
use reqwest::header::{HeaderValue, IF_MODIFIED_SINCE, IF_NONE_MATCH};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::error::FetchError;
use super::store::{CacheEntry, CacheStore};
use super::transport::{ResourceRequest, Transport, TransportResponse, Validators};

/// Maximum age, in days, of a cached entry that may still be served when
/// the live check fails.
pub const DEFAULT_STALENESS_CEILING_DAYS: i64 = 14;

/// Cache layer that manages revalidation and fallback for one transport.
///
/// Every fetch goes to the network with whatever validators are cached for
/// the key. The cached copy is only served on its own when the server says
/// it is unchanged, or when the request fails and the copy is younger than
/// the staleness ceiling.
pub struct CacheLayer<T: Transport> {
  transport: Arc<T>,
  store: Arc<CacheStore>,
  staleness_ceiling: Duration,
}

impl<T: Transport> CacheLayer<T> {
  /// Create a cache layer over `transport`, sharing `store`.
  pub fn new(transport: T, store: Arc<CacheStore>) -> Self {
    Self {
      transport: Arc::new(transport),
      store,
      staleness_ceiling: Duration::days(DEFAULT_STALENESS_CEILING_DAYS),
    }
  }

  /// Set the maximum age of data served on failure.
  pub fn with_staleness_ceiling(mut self, ceiling: Duration) -> Self {
    self.staleness_ceiling = ceiling;
    self
  }

  pub fn transport(&self) -> &T {
    &self.transport
  }

  pub fn store(&self) -> &CacheStore {
    &self.store
  }

  /// Fetch the resource cached under `key`.
  ///
  /// 1. Attach the cached validators (if any) to `request`
  /// 2. Fresh response: transform, store with the new validators, return
  /// 3. Not modified: refresh the entry's timestamp, return cached data
  /// 4. Failure: return cached data if younger than the staleness ceiling,
  ///    otherwise propagate the failure
  ///
  /// `transform` turns the raw body into the resource's canonical shape. The
  /// store is only written after it succeeds.
  ///
  /// The key does not take `request.query` into account: two requests with
  /// different parameters under the same key share one entry.
  pub async fn fetch_with_cache<D, F>(
    &self,
    key: &str,
    mut request: ResourceRequest,
    transform: F,
  ) -> Result<D, FetchError>
  where
    D: Serialize + DeserializeOwned,
    F: FnOnce(Value) -> serde_json::Result<D>,
  {
    let previous = self.store.get(key);
    if let Some(entry) = &previous {
      attach_validators(&mut request, entry);
    }

    debug!(
      key,
      path = %request.path,
      conditional = previous.as_ref().is_some_and(|e| e.etag.is_some() || e.last_modified.is_some()),
      "fetching resource"
    );

    match self.transport.get(request).await {
      Ok(TransportResponse::Fresh { body, headers }) => {
        let data = transform(body).map_err(|e| FetchError::transform(key, e))?;
        let stored = serde_json::to_value(&data).map_err(|e| FetchError::transform(key, e))?;
        let Validators {
          etag,
          last_modified,
        } = Validators::from_headers(&headers);

        debug!(key, etag = ?etag, last_modified = ?last_modified, "resource refreshed");
        self.store.set(key, stored, etag, last_modified);
        Ok(data)
      }
      Ok(TransportResponse::NotModified) => {
        let Some(entry) = previous else {
          return Err(FetchError::UnexpectedNotModified {
            key: key.to_string(),
          });
        };

        let data = serde_json::from_value(entry.data.clone())
          .map_err(|e| FetchError::transform(key, e))?;

        debug!(key, "resource not modified");
        self
          .store
          .set(key, entry.data, entry.etag, entry.last_modified);
        Ok(data)
      }
      Err(err) => {
        let Some(entry) = previous else {
          return Err(err.into());
        };

        let age = self.store.now() - entry.fetched_at;
        if age >= self.staleness_ceiling {
          warn!(
            key,
            error = %err,
            age_hours = age.num_hours(),
            "fetch failed and cached copy is too old to serve"
          );
          return Err(err.into());
        }

        match serde_json::from_value(entry.data) {
          Ok(data) => {
            warn!(
              key,
              error = %err,
              age_hours = age.num_hours(),
              "fetch failed, serving cached copy"
            );
            Ok(data)
          }
          Err(decode) => {
            warn!(key, error = %decode, "cached copy unreadable, not serving it");
            Err(err.into())
          }
        }
      }
    }
  }
}

impl<T: Transport> Clone for CacheLayer<T> {
  fn clone(&self) -> Self {
    Self {
      transport: Arc::clone(&self.transport),
      store: Arc::clone(&self.store),
      staleness_ceiling: self.staleness_ceiling,
    }
  }
}

/// Add `If-None-Match` / `If-Modified-Since` for the entry's validators.
fn attach_validators(request: &mut ResourceRequest, entry: &CacheEntry) {
  let pairs = [
    (IF_NONE_MATCH, entry.etag.as_deref()),
    (IF_MODIFIED_SINCE, entry.last_modified.as_deref()),
  ];

  for (name, value) in pairs {
    let Some(value) = value else { continue };
    match HeaderValue::from_str(value) {
      Ok(value) => {
        request.headers.insert(name, value);
      }
      Err(_) => warn!(header = %name, value, "skipping validator that is not a valid header"),
    }
  }
}
