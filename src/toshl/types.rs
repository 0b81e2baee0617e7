use serde::{Deserialize, Serialize};

/// Kind of category or tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
  Expense,
  Income,
  System,
}

impl std::fmt::Display for EntryKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let s = match self {
      Self::Expense => "expense",
      Self::Income => "income",
      Self::System => "system",
    };
    f.write_str(s)
  }
}

impl EntryKind {
  /// Sign `amount` the way entries of this kind are stored: expenses
  /// negative, income positive. System entries keep the amount as given.
  pub fn signed(self, amount: f64) -> f64 {
    match self {
      Self::Expense => -amount.abs(),
      Self::Income => amount.abs(),
      Self::System => amount,
    }
  }
}

/// Category of entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
  pub id: String,
  pub name: String,
  pub kind: EntryKind,
  pub parent: Option<String>,
}

/// Tag, optionally bound to a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
  pub id: String,
  pub name: String,
  pub kind: EntryKind,
  pub category: Option<String>,
}

/// Account with its balance in the account currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
  pub id: String,
  pub name: String,
  pub currency: String,
  pub balance: f64,
  pub status: String,
}

/// Currency with the code folded in from the API's keyed map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
  pub code: String,
  pub name: String,
  pub symbol: Option<String>,
  pub precision: u32,
}

/// Entry (transaction)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
  pub id: String,
  pub amount: f64,
  pub currency: String,
  pub date: String,
  pub desc: Option<String>,
  pub account: String,
  pub category: String,
  pub tags: Vec<String>,
  /// Version token the API requires on updates
  pub modified: String,
}

/// Entry to create
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
  pub amount: f64,
  pub currency: String,
  pub date: String,
  pub desc: Option<String>,
  pub account: String,
  pub category: String,
  pub tags: Vec<String>,
}

/// Fields to change on an existing entry; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryUpdate {
  /// New amount; only its magnitude is used
  pub amount: Option<f64>,
  pub date: Option<String>,
  pub desc: Option<String>,
  pub category: Option<String>,
  /// Kind of the new category, decides the sign when set
  pub kind: Option<EntryKind>,
}

impl EntryUpdate {
  pub fn is_empty(&self) -> bool {
    self == &Self::default()
  }

  /// Apply the changed fields to `entry`.
  ///
  /// The amount is re-signed from `kind` when the category changes,
  /// otherwise it keeps the sign the entry already has.
  pub fn apply(&self, entry: &mut Entry) {
    let amount = self.amount.unwrap_or(entry.amount);
    entry.amount = match self.kind {
      Some(kind) => kind.signed(amount),
      None => amount.abs().copysign(entry.amount),
    };
    if let Some(date) = &self.date {
      entry.date = date.clone();
    }
    if let Some(desc) = &self.desc {
      entry.desc = Some(desc.clone());
    }
    if let Some(category) = &self.category {
      entry.category = category.clone();
    }
  }
}
