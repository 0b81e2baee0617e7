//! Cached reference resources of the Toshl API and their transforms.

use serde_json::Value;

use crate::cache::ResourceRequest;

use super::api_types::{ApiAccount, ApiCategory, ApiCurrencies, ApiMe, ApiTag};
use super::types::{Account, Category, Currency, Tag};

/// Page size for list endpoints; large enough for any real collection.
const PER_PAGE: &str = "500";

/// Reference resources served through the cache.
///
/// Each variant owns one cache key, and the data stored under that key is
/// always the output of the variant's transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResourceKey {
  Categories,
  Tags,
  Accounts,
  Currencies,
  DefaultCurrency,
}

impl ResourceKey {
  /// Cache key
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Categories => "categories",
      Self::Tags => "tags",
      Self::Accounts => "accounts",
      Self::Currencies => "currencies",
      Self::DefaultCurrency => "defaultCurrency",
    }
  }

  /// The remote call that produces this resource.
  pub fn request(self) -> ResourceRequest {
    match self {
      Self::Categories => ResourceRequest::new("/categories").with_query("per_page", PER_PAGE),
      Self::Tags => ResourceRequest::new("/tags").with_query("per_page", PER_PAGE),
      Self::Accounts => ResourceRequest::new("/accounts").with_query("per_page", PER_PAGE),
      Self::Currencies => ResourceRequest::new("/currencies"),
      Self::DefaultCurrency => ResourceRequest::new("/me"),
    }
  }
}

impl std::fmt::Display for ResourceKey {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ============================================================================
// Transforms
// ============================================================================

pub fn categories(body: Value) -> serde_json::Result<Vec<Category>> {
  let items: Vec<ApiCategory> = serde_json::from_value(body)?;
  Ok(
    items
      .into_iter()
      .filter(|c| !c.deleted)
      .map(Category::from)
      .collect(),
  )
}

pub fn tags(body: Value) -> serde_json::Result<Vec<Tag>> {
  let items: Vec<ApiTag> = serde_json::from_value(body)?;
  Ok(items.into_iter().filter(|t| !t.deleted).map(Tag::from).collect())
}

pub fn accounts(body: Value) -> serde_json::Result<Vec<Account>> {
  let items: Vec<ApiAccount> = serde_json::from_value(body)?;
  Ok(
    items
      .into_iter()
      .filter(|a| !a.deleted)
      .map(Account::from)
      .collect(),
  )
}

/// Fold the code key of each currency into the record; ordered by code.
pub fn currencies(body: Value) -> serde_json::Result<Vec<Currency>> {
  let map: ApiCurrencies = serde_json::from_value(body)?;
  Ok(
    map
      .into_iter()
      .map(|(code, currency)| currency.into_currency(code))
      .collect(),
  )
}

pub fn default_currency(body: Value) -> serde_json::Result<String> {
  let me: ApiMe = serde_json::from_value(body)?;
  Ok(me.currency.main)
}
