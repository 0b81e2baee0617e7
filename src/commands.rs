//! Command line subcommands and their output.

use std::io::Write;

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use color_eyre::Result;
use serde::Serialize;

use crate::toshl::lookup;
use crate::toshl::types::{Account, Category, Currency, Entry, EntryKind, EntryUpdate, NewEntry, Tag};
use crate::toshl::CachedToshlClient;

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
  /// List categories
  Categories {
    /// Only show categories of this kind
    #[arg(long)]
    kind: Option<EntryKind>,
  },
  /// List tags
  Tags {
    /// Only show tags bound to this category (name or id)
    #[arg(long)]
    category: Option<String>,
  },
  /// List accounts with balances
  Accounts,
  /// List currencies
  Currencies {
    /// Filter by code or name
    #[arg(long)]
    search: Option<String>,
  },
  /// Show the default currency
  DefaultCurrency,
  /// Resolve a name to a record
  Lookup {
    kind: LookupKind,
    query: String,
  },
  /// List entries in a date range
  Entries {
    #[arg(long)]
    from: NaiveDate,
    #[arg(long)]
    to: NaiveDate,
  },
  /// Create an entry
  Add {
    /// Amount, sign is taken from the category kind
    #[arg(long, allow_hyphen_values = true)]
    amount: f64,
    #[arg(long)]
    category: String,
    #[arg(long)]
    account: String,
    /// Tag name or id, repeatable
    #[arg(long = "tag")]
    tags: Vec<String>,
    /// Currency code, defaults to the account currency
    #[arg(long)]
    currency: Option<String>,
    /// Defaults to today
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    desc: Option<String>,
  },
  /// Change an existing entry
  Update {
    id: String,
    /// New amount, keeps the entry's sign unless the category changes
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<f64>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    date: Option<NaiveDate>,
    #[arg(long)]
    desc: Option<String>,
  },
  /// Delete an entry
  Delete { id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LookupKind {
  Category,
  Tag,
  Account,
  Currency,
}

/// Run `command` against `client`, writing results to `out`.
pub async fn run(
  command: Command,
  client: &CachedToshlClient,
  json: bool,
  out: &mut impl Write,
) -> Result<()> {
  match command {
    Command::Categories { kind } => {
      let categories: Vec<_> = client
        .categories()
        .await?
        .into_iter()
        .filter(|c| kind.map_or(true, |k| c.kind == k))
        .collect();
      emit(out, json, categories.as_slice(), render_categories)
    }
    Command::Tags { category } => {
      let category_id = match category {
        Some(query) => Some(client.resolve_category(&query).await?.id),
        None => None,
      };
      let tags: Vec<_> = client
        .tags()
        .await?
        .into_iter()
        .filter(|t| category_id.is_none() || t.category == category_id)
        .collect();
      emit(out, json, tags.as_slice(), render_tags)
    }
    Command::Accounts => emit(out, json, client.accounts().await?.as_slice(), render_accounts),
    Command::Currencies { search } => {
      let currencies = client.currencies().await?;
      let currencies: Vec<Currency> = match search {
        Some(query) => lookup::search(&currencies, &query)
          .into_iter()
          .cloned()
          .collect(),
        None => currencies,
      };
      emit(out, json, currencies.as_slice(), render_currencies)
    }
    Command::DefaultCurrency => {
      let code = client.default_currency().await?;
      emit(out, json, &code, |code| format!("{code}\n"))
    }
    Command::Lookup { kind, query } => match kind {
      LookupKind::Category => {
        let c = client.resolve_category(&query).await?;
        emit(out, json, &c, |c| render_categories(std::slice::from_ref(c)))
      }
      LookupKind::Tag => {
        let t = client.resolve_tag(&query).await?;
        emit(out, json, &t, |t| render_tags(std::slice::from_ref(t)))
      }
      LookupKind::Account => {
        let a = client.resolve_account(&query).await?;
        emit(out, json, &a, |a| render_accounts(std::slice::from_ref(a)))
      }
      LookupKind::Currency => {
        let c = client.resolve_currency(&query).await?;
        emit(out, json, &c, |c| render_currencies(std::slice::from_ref(c)))
      }
    },
    Command::Entries { from, to } => {
      let entries = client
        .entries(&from.to_string(), &to.to_string())
        .await?;
      emit(out, json, entries.as_slice(), render_entries)
    }
    Command::Add {
      amount,
      category,
      account,
      tags,
      currency,
      date,
      desc,
    } => {
      let (category, account, all_tags) = futures::try_join!(
        client.resolve_category(&category),
        client.resolve_account(&account),
        async { client.tags().await.map_err(color_eyre::Report::from) },
      )?;

      let tag_ids = tags
        .iter()
        .map(|query| {
          lookup::find(&all_tags, query)
            .into_result("tag", query)
            .map(|t| t.id.clone())
        })
        .collect::<Result<Vec<_>>>()?;

      let currency = match currency {
        Some(query) => client.resolve_currency(&query).await?.code,
        None if account.currency.is_empty() => client.default_currency().await?,
        None => account.currency.clone(),
      };

      let entry = build_entry(EntryDraft {
        amount,
        category: &category,
        account: &account,
        tags: tag_ids,
        currency,
        date: date.unwrap_or_else(|| chrono::Local::now().date_naive()),
        desc,
      });

      let id = client.create_entry(&entry).await?;
      tracing::info!(id = %id, "entry created");
      emit(out, json, &serde_json::json!({ "id": id }), |_| {
        format!("created entry {id}\n")
      })
    }
    Command::Update {
      id,
      amount,
      category,
      date,
      desc,
    } => {
      let category = match category {
        Some(query) => Some(client.resolve_category(&query).await?),
        None => None,
      };

      let update = EntryUpdate {
        amount,
        date: date.map(|d| d.to_string()),
        desc,
        kind: category.as_ref().map(|c| c.kind),
        category: category.map(|c| c.id),
      };
      if update.is_empty() {
        return Err(color_eyre::eyre::eyre!("nothing to update"));
      }

      let entry = client.update_entry(&id, &update).await?;
      tracing::info!(id = %entry.id, "entry updated");
      emit(out, json, &entry, |e| render_entries(std::slice::from_ref(e)))
    }
    Command::Delete { id } => {
      client.delete_entry(&id).await?;
      tracing::info!(id = %id, "entry deleted");
      emit(out, json, &serde_json::json!({ "deleted": id }), |_| {
        format!("deleted entry {id}\n")
      })
    }
  }
}

/// Inputs for a new entry after names have been resolved
pub struct EntryDraft<'a> {
  pub amount: f64,
  pub category: &'a Category,
  pub account: &'a Account,
  pub tags: Vec<String>,
  pub currency: String,
  pub date: NaiveDate,
  pub desc: Option<String>,
}

pub fn build_entry(draft: EntryDraft<'_>) -> NewEntry {
  NewEntry {
    amount: draft.category.kind.signed(draft.amount),
    currency: draft.currency,
    date: draft.date.to_string(),
    desc: draft.desc,
    account: draft.account.id.clone(),
    category: draft.category.id.clone(),
    tags: draft.tags,
  }
}

fn emit<T: Serialize + ?Sized>(
  out: &mut impl Write,
  json: bool,
  value: &T,
  render: impl FnOnce(&T) -> String,
) -> Result<()> {
  if json {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
  } else {
    out.write_all(render(value).as_bytes())?;
  }
  Ok(())
}

// ============================================================================
// Text rendering
// ============================================================================

fn table(rows: Vec<Vec<String>>) -> String {
  let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
  let widths: Vec<usize> = (0..columns)
    .map(|i| {
      rows
        .iter()
        .filter_map(|r| r.get(i))
        .map(|cell| cell.chars().count())
        .max()
        .unwrap_or(0)
    })
    .collect();

  let mut text = String::new();
  for row in rows {
    let last = row.len().saturating_sub(1);
    for (i, cell) in row.iter().enumerate() {
      if i == last {
        text.push_str(cell);
      } else {
        let pad = widths[i] - cell.chars().count();
        text.push_str(cell);
        text.push_str(&" ".repeat(pad + 2));
      }
    }
    text.push('\n');
  }
  text
}

pub fn render_categories(categories: &[Category]) -> String {
  table(
    categories
      .iter()
      .map(|c| vec![c.id.clone(), c.kind.to_string(), c.name.clone()])
      .collect(),
  )
}

pub fn render_tags(tags: &[Tag]) -> String {
  table(
    tags
      .iter()
      .map(|t| vec![t.id.clone(), t.kind.to_string(), t.name.clone()])
      .collect(),
  )
}

pub fn render_accounts(accounts: &[Account]) -> String {
  table(
    accounts
      .iter()
      .map(|a| {
        vec![
          a.id.clone(),
          format!("{:.2} {}", a.balance, a.currency),
          a.name.clone(),
        ]
      })
      .collect(),
  )
}

pub fn render_currencies(currencies: &[Currency]) -> String {
  table(
    currencies
      .iter()
      .map(|c| {
        vec![
          c.code.clone(),
          c.symbol.clone().unwrap_or_default(),
          c.name.clone(),
        ]
      })
      .collect(),
  )
}

pub fn render_entries(entries: &[Entry]) -> String {
  table(
    entries
      .iter()
      .map(|e| {
        vec![
          e.id.clone(),
          e.date.clone(),
          format!("{:.2} {}", e.amount, e.currency),
          e.desc.clone().unwrap_or_default(),
        ]
      })
      .collect(),
  )
}
