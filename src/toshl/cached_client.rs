//! Toshl client with cached reference data.

use std::sync::Arc;

use color_eyre::Result;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::cache::{CacheLayer, CacheStore, FetchError, Transport};
use crate::config::Config;

use super::cache::{self, ResourceKey};
use super::client::ToshlClient;
use super::lookup::{self, Named};
use super::types::{Account, Category, Currency, Entry, EntryUpdate, NewEntry, Tag};

/// Toshl client with transparent caching of reference data.
///
/// Categories, tags, accounts, currencies and the default currency go
/// through the cache layer. Entry reads and writes go straight to the API.
#[derive(Clone)]
pub struct CachedToshlClient<T: Transport = ToshlClient> {
  cache: CacheLayer<T>,
}

impl CachedToshlClient<ToshlClient> {
  /// Create a new cached client. The store is cleared first when
  /// `cache.force_refresh` is set.
  pub fn new(config: &Config) -> Result<Self> {
    let inner = ToshlClient::new(config)?;
    let store = Arc::new(CacheStore::new(config.cache.force_refresh));
    Ok(Self::with_transport(inner, store))
  }

  /// List entries in a date range (not cached - parameterized read).
  pub async fn entries(&self, from: &str, to: &str) -> Result<Vec<Entry>> {
    Ok(self.inner().list_entries(from, to).await?)
  }

  /// Create an entry (not cached - write operation).
  pub async fn create_entry(&self, entry: &NewEntry) -> Result<String> {
    Ok(self.inner().create_entry(entry).await?)
  }

  /// Update an entry (not cached - write operation).
  pub async fn update_entry(&self, id: &str, update: &EntryUpdate) -> Result<Entry> {
    Ok(self.inner().update_entry(id, update).await?)
  }

  /// Delete an entry (not cached - write operation).
  pub async fn delete_entry(&self, id: &str) -> Result<()> {
    Ok(self.inner().delete_entry(id).await?)
  }

  fn inner(&self) -> &ToshlClient {
    self.cache.transport()
  }
}

impl<T: Transport> CachedToshlClient<T> {
  /// Build the cached client over any transport and store.
  pub fn with_transport(transport: T, store: Arc<CacheStore>) -> Self {
    Self {
      cache: CacheLayer::new(transport, store),
    }
  }

  pub async fn categories(&self) -> Result<Vec<Category>, FetchError> {
    self.fetch(ResourceKey::Categories, cache::categories).await
  }

  pub async fn tags(&self) -> Result<Vec<Tag>, FetchError> {
    self.fetch(ResourceKey::Tags, cache::tags).await
  }

  pub async fn accounts(&self) -> Result<Vec<Account>, FetchError> {
    self.fetch(ResourceKey::Accounts, cache::accounts).await
  }

  pub async fn currencies(&self) -> Result<Vec<Currency>, FetchError> {
    self.fetch(ResourceKey::Currencies, cache::currencies).await
  }

  /// The user's main currency code
  pub async fn default_currency(&self) -> Result<String, FetchError> {
    self
      .fetch(ResourceKey::DefaultCurrency, cache::default_currency)
      .await
  }

  /// Resolve a category name or id.
  pub async fn resolve_category(&self, query: &str) -> Result<Category> {
    resolve(self.categories().await?, "category", query)
  }

  /// Resolve a tag name or id.
  pub async fn resolve_tag(&self, query: &str) -> Result<Tag> {
    resolve(self.tags().await?, "tag", query)
  }

  /// Resolve an account name or id.
  pub async fn resolve_account(&self, query: &str) -> Result<Account> {
    resolve(self.accounts().await?, "account", query)
  }

  /// Resolve a currency code or name.
  pub async fn resolve_currency(&self, query: &str) -> Result<Currency> {
    resolve(self.currencies().await?, "currency", query)
  }

  async fn fetch<D, F>(&self, key: ResourceKey, transform: F) -> Result<D, FetchError>
  where
    D: Serialize + DeserializeOwned,
    F: FnOnce(Value) -> serde_json::Result<D>,
  {
    self
      .cache
      .fetch_with_cache(key.as_str(), key.request(), transform)
      .await
  }
}

fn resolve<R: Named + Clone>(records: Vec<R>, what: &str, query: &str) -> Result<R> {
  lookup::find(&records, query)
    .into_result(what, query)
    .cloned()
}
