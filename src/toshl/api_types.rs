//! Serde-deserializable types matching Toshl API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::types::{Account, Category, Currency, Entry, EntryKind, NewEntry, Tag};

// ============================================================================
// Reference data
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiCategory {
  pub id: String,
  pub name: String,
  #[serde(rename = "type")]
  pub kind: EntryKind,
  pub parent: Option<String>,
  #[serde(default)]
  pub deleted: bool,
}

impl From<ApiCategory> for Category {
  fn from(c: ApiCategory) -> Self {
    Self {
      id: c.id,
      name: c.name,
      kind: c.kind,
      parent: c.parent,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiTag {
  pub id: String,
  pub name: String,
  #[serde(rename = "type")]
  pub kind: EntryKind,
  pub category: Option<String>,
  #[serde(default)]
  pub deleted: bool,
}

impl From<ApiTag> for Tag {
  fn from(t: ApiTag) -> Self {
    Self {
      id: t.id,
      name: t.name,
      kind: t.kind,
      category: t.category,
    }
  }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ApiCurrencyRef {
  pub code: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiAccount {
  pub id: String,
  pub name: String,
  #[serde(default)]
  pub balance: f64,
  #[serde(default)]
  pub currency: Option<ApiCurrencyRef>,
  #[serde(default = "default_status")]
  pub status: String,
  #[serde(default)]
  pub deleted: bool,
}

fn default_status() -> String {
  "active".to_string()
}

impl From<ApiAccount> for Account {
  fn from(a: ApiAccount) -> Self {
    Self {
      id: a.id,
      name: a.name,
      currency: a.currency.map(|c| c.code).unwrap_or_default(),
      balance: a.balance,
      status: a.status,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiCurrency {
  pub name: String,
  pub symbol: Option<String>,
  #[serde(default = "default_precision")]
  pub precision: u32,
}

fn default_precision() -> u32 {
  2
}

/// `/currencies` returns an object keyed by currency code.
pub type ApiCurrencies = BTreeMap<String, ApiCurrency>;

impl ApiCurrency {
  pub fn into_currency(self, code: String) -> Currency {
    Currency {
      code,
      name: self.name,
      symbol: self.symbol,
      precision: self.precision,
    }
  }
}

#[derive(Debug, Deserialize)]
pub struct ApiUserCurrency {
  pub main: String,
}

/// `/me` response, reduced to what we read
#[derive(Debug, Deserialize)]
pub struct ApiMe {
  pub currency: ApiUserCurrency,
}

// ============================================================================
// Entries
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiEntry {
  pub id: String,
  pub amount: f64,
  pub currency: ApiCurrencyRef,
  pub date: String,
  pub desc: Option<String>,
  pub account: String,
  pub category: String,
  #[serde(default)]
  pub tags: Vec<String>,
  pub modified: String,
  #[serde(default)]
  pub deleted: bool,
}

impl From<ApiEntry> for Entry {
  fn from(e: ApiEntry) -> Self {
    Self {
      id: e.id,
      amount: e.amount,
      currency: e.currency.code,
      date: e.date,
      desc: e.desc,
      account: e.account,
      category: e.category,
      tags: e.tags,
      modified: e.modified,
    }
  }
}

/// Request body for creating or updating an entry
#[derive(Debug, Serialize)]
pub struct ApiEntryBody {
  pub amount: f64,
  pub currency: ApiCurrencyRef,
  pub date: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub desc: Option<String>,
  pub account: String,
  pub category: String,
  pub tags: Vec<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub modified: Option<String>,
}

impl From<&NewEntry> for ApiEntryBody {
  fn from(e: &NewEntry) -> Self {
    Self {
      amount: e.amount,
      currency: ApiCurrencyRef {
        code: e.currency.clone(),
      },
      date: e.date.clone(),
      desc: e.desc.clone(),
      account: e.account.clone(),
      category: e.category.clone(),
      tags: e.tags.clone(),
      modified: None,
    }
  }
}

impl From<&Entry> for ApiEntryBody {
  fn from(e: &Entry) -> Self {
    Self {
      amount: e.amount,
      currency: ApiCurrencyRef {
        code: e.currency.clone(),
      },
      date: e.date.clone(),
      desc: e.desc.clone(),
      account: e.account.clone(),
      category: e.category.clone(),
      tags: e.tags.clone(),
      modified: Some(e.modified.clone()),
    }
  }
}
