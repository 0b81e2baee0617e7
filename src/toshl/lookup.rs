//! Resolve user or tool supplied names to reference records.

use super::types::{Account, Category, Currency, Tag};

/// Record that can be looked up by id or name.
pub trait Named {
  fn id(&self) -> &str;
  fn name(&self) -> &str;
}

impl Named for Category {
  fn id(&self) -> &str {
    &self.id
  }

  fn name(&self) -> &str {
    &self.name
  }
}

impl Named for Tag {
  fn id(&self) -> &str {
    &self.id
  }

  fn name(&self) -> &str {
    &self.name
  }
}

impl Named for Account {
  fn id(&self) -> &str {
    &self.id
  }

  fn name(&self) -> &str {
    &self.name
  }
}

/// Currencies are looked up by code first, then by name.
impl Named for Currency {
  fn id(&self) -> &str {
    &self.code
  }

  fn name(&self) -> &str {
    &self.name
  }
}

/// Outcome of a lookup
#[derive(Debug, PartialEq)]
pub enum Match<'a, T> {
  Exact(&'a T),
  /// Several records matched equally well
  Candidates(Vec<&'a T>),
  None,
}

impl<'a, T: Named> Match<'a, T> {
  /// The single matching record, or an error naming what went wrong.
  pub fn into_result(self, what: &str, query: &str) -> color_eyre::Result<&'a T> {
    match self {
      Self::Exact(record) => Ok(record),
      Self::Candidates(records) => {
        let names: Vec<_> = records.iter().map(|r| r.name()).collect();
        Err(color_eyre::eyre::eyre!(
          "ambiguous {} '{}': {}",
          what,
          query,
          names.join(", ")
        ))
      }
      Self::None => Err(color_eyre::eyre::eyre!("no {} named '{}'", what, query)),
    }
  }
}

/// Find the record best matching `query`.
///
/// Tried in order, first tier with hits wins: id (case-insensitive), exact
/// name, name prefix, name substring. Name comparisons ignore case.
pub fn find<'a, T: Named>(records: &'a [T], query: &str) -> Match<'a, T> {
  let needle = query.trim().to_lowercase();
  if needle.is_empty() {
    return Match::None;
  }

  let tiers: [&dyn Fn(&T) -> bool; 4] = [
    &|r| r.id().to_lowercase() == needle,
    &|r| r.name().to_lowercase() == needle,
    &|r| r.name().to_lowercase().starts_with(&needle),
    &|r| r.name().to_lowercase().contains(&needle),
  ];

  for tier in tiers {
    let hits: Vec<&T> = records.iter().filter(|r| tier(*r)).collect();
    match hits.len() {
      0 => continue,
      1 => return Match::Exact(hits[0]),
      _ => return Match::Candidates(hits),
    }
  }

  Match::None
}

/// All records whose name contains `query`, ignoring case.
pub fn search<'a, T: Named>(records: &'a [T], query: &str) -> Vec<&'a T> {
  let needle = query.trim().to_lowercase();
  records
    .iter()
    .filter(|r| r.id().to_lowercase() == needle || r.name().to_lowercase().contains(&needle))
    .collect()
}
