use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, LOCATION, RETRY_AFTER, USER_AGENT};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::cache::{ResourceRequest, Transport, TransportError, TransportResponse};
use crate::config::{ApiConfig, Config};
use crate::toshl::api_types::{ApiEntry, ApiEntryBody};
use crate::toshl::types::{Entry, EntryUpdate, NewEntry};

const USER_AGENT_VALUE: &str = concat!("toshl-cli/", env!("CARGO_PKG_VERSION"));

/// Largest page size the entries endpoint accepts
const ENTRIES_PAGE_SIZE: usize = 500;
const MAX_ENTRY_PAGES: usize = 100;

/// Toshl API client
///
/// Reads go through [`Transport::get`] so the cache layer can drive them;
/// entry writes are plain calls with no caching.
#[derive(Clone)]
pub struct ToshlClient {
  client: reqwest::Client,
  base_url: Url,
  token: String,
}

impl std::fmt::Debug for ToshlClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ToshlClient")
      .field("base_url", &self.base_url.as_str())
      .finish_non_exhaustive()
  }
}

impl ToshlClient {
  pub fn new(config: &Config) -> color_eyre::Result<Self> {
    let token = Config::get_api_token()?;
    Self::with_token(&config.api, token)
  }

  /// Create a client with an explicit token.
  pub fn with_token(api: &ApiConfig, token: impl Into<String>) -> color_eyre::Result<Self> {
    let mut base_url = Url::parse(&api.url)
      .map_err(|e| color_eyre::eyre::eyre!("Invalid API url {}: {}", api.url, e))?;
    // Paths are joined relative to the base, which needs a trailing slash
    if !base_url.path().ends_with('/') {
      let path = format!("{}/", base_url.path());
      base_url.set_path(&path);
    }

    let mut default_headers = HeaderMap::new();
    default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(api.timeout_secs))
      .default_headers(default_headers)
      .build()
      .map_err(|e| color_eyre::eyre::eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      client,
      base_url,
      token: token.into(),
    })
  }

  /// List entries between two dates (inclusive, `YYYY-MM-DD`)
  ///
  /// Pages are requested until one comes back short.
  pub async fn list_entries(&self, from: &str, to: &str) -> Result<Vec<Entry>, TransportError> {
    let per_page = ENTRIES_PAGE_SIZE.to_string();
    let mut entries = Vec::new();

    for page in 0..MAX_ENTRY_PAGES {
      let page = page.to_string();
      let query = [
        ("from", from),
        ("to", to),
        ("page", page.as_str()),
        ("per_page", per_page.as_str()),
      ];
      let batch: Vec<ApiEntry> = self.read_json(Method::GET, "/entries", &query).await?;
      let last = batch.len() < ENTRIES_PAGE_SIZE;

      entries.extend(batch.into_iter().filter(|e| !e.deleted).map(Entry::from));
      if last {
        return Ok(entries);
      }
    }

    warn!(
      from,
      to,
      pages = MAX_ENTRY_PAGES,
      "entry listing truncated at page limit"
    );
    Ok(entries)
  }

  /// Get a single entry by id
  pub async fn get_entry(&self, id: &str) -> Result<Entry, TransportError> {
    let entry: ApiEntry = self
      .read_json(Method::GET, &format!("/entries/{id}"), &[])
      .await?;
    Ok(entry.into())
  }

  /// Create an entry and return its id
  pub async fn create_entry(&self, entry: &NewEntry) -> Result<String, TransportError> {
    let response = self
      .send(Method::POST, "/entries", &[], Some(&ApiEntryBody::from(entry)))
      .await?;

    // The new id is only reported through the Location header
    response
      .headers()
      .get(LOCATION)
      .and_then(|v| v.to_str().ok())
      .and_then(|location| location.trim_end_matches('/').rsplit('/').next())
      .filter(|id| !id.is_empty())
      .map(String::from)
      .ok_or_else(|| TransportError::Decode {
        message: "created entry without a Location header".to_string(),
      })
  }

  /// Update an entry by reading it, applying `update` and writing it back
  pub async fn update_entry(&self, id: &str, update: &EntryUpdate) -> Result<Entry, TransportError> {
    let mut entry = self.get_entry(id).await?;
    update.apply(&mut entry);

    let path = format!("/entries/{id}");
    let response = self
      .send(Method::PUT, &path, &[], Some(&ApiEntryBody::from(&entry)))
      .await?;
    let updated: ApiEntry = decode(response).await?;
    Ok(updated.into())
  }

  /// Delete an entry
  pub async fn delete_entry(&self, id: &str) -> Result<(), TransportError> {
    self
      .send::<()>(Method::DELETE, &format!("/entries/{id}"), &[], None)
      .await?;
    Ok(())
  }

  fn url(&self, path: &str, query: &[(impl AsRef<str>, impl AsRef<str>)]) -> Result<Url, TransportError> {
    let mut url = self
      .base_url
      .join(path.trim_start_matches('/'))
      .map_err(|e| TransportError::Network {
        message: format!("invalid request path {path}: {e}"),
      })?;

    if !query.is_empty() {
      let mut pairs = url.query_pairs_mut();
      for (name, value) in query {
        pairs.append_pair(name.as_ref(), value.as_ref());
      }
    }
    Ok(url)
  }

  async fn read_json<T: DeserializeOwned>(
    &self,
    method: Method,
    path: &str,
    query: &[(&str, &str)],
  ) -> Result<T, TransportError> {
    let response = self.send::<()>(method, path, query, None).await?;
    decode(response).await
  }

  /// Send a request and map non-success statuses to errors.
  async fn send<B: serde::Serialize>(
    &self,
    method: Method,
    path: &str,
    query: &[(&str, &str)],
    body: Option<&B>,
  ) -> Result<reqwest::Response, TransportError> {
    let url = self.url(path, query)?;
    debug!(method = %method, url = %url, "sending request");

    let mut request = self
      .client
      .request(method, url)
      .basic_auth(&self.token, None::<&str>);
    if let Some(body) = body {
      request = request.json(body);
    }

    let response = request.send().await.map_err(from_reqwest)?;
    check_status(response).await
  }
}

#[async_trait]
impl Transport for ToshlClient {
  async fn get(&self, request: ResourceRequest) -> Result<TransportResponse, TransportError> {
    let url = self.url(&request.path, request.query.as_slice())?;
    debug!(url = %url, conditional = !request.headers.is_empty(), "GET");

    let response = self
      .client
      .get(url)
      .basic_auth(&self.token, None::<&str>)
      .headers(request.headers)
      .send()
      .await
      .map_err(from_reqwest)?;

    if response.status() == StatusCode::NOT_MODIFIED {
      return Ok(TransportResponse::NotModified);
    }

    let response = check_status(response).await?;
    let headers = response.headers().clone();
    let body: Value = decode(response).await?;

    Ok(TransportResponse::Fresh { body, headers })
  }
}

fn from_reqwest(e: reqwest::Error) -> TransportError {
  if e.is_timeout() {
    TransportError::Timeout
  } else {
    TransportError::Network {
      message: e.to_string(),
    }
  }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, TransportError> {
  let bytes = response.bytes().await.map_err(from_reqwest)?;
  serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode {
    message: e.to_string(),
  })
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
  let status = response.status();

  match status.as_u16() {
    200..=299 => Ok(response),

    401 | 403 => Err(TransportError::Unauthorized {
      status: status.as_u16(),
    }),

    429 => {
      let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .map(Duration::from_secs);
      Err(TransportError::RateLimited { retry_after })
    }

    code => {
      let text = response.text().await.unwrap_or_default();
      Err(TransportError::Status {
        status: code,
        message: error_description(&text).unwrap_or_else(|| {
          status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
        }),
      })
    }
  }
}

/// Pull the human readable message out of an API error body.
fn error_description(body: &str) -> Option<String> {
  let value: Value = serde_json::from_str(body).ok()?;
  value
    .get("description")
    .and_then(Value::as_str)
    .map(String::from)
}
