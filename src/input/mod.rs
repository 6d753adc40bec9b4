//! Ledger input formats
//!
//! Both the JSON ledger and GnuCash books are read into flat records keyed by
//! string ids, then resolved into a [`Ledger`] by [`build_ledger`].

pub mod gnucash;

use crate::core::{Account, AccountId, AccountType, Ledger, LedgerError, Split, Transaction};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::io::Read;

/// Input root for ledger JSON
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LedgerInput {
    pub accounts: Vec<AccountRecord>,
    #[serde(default)]
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AccountRecord {
    /// Unique identifier, referenced by `parent` and split `account`
    pub id: String,
    /// Account name (one component of the full account path)
    pub name: String,
    /// Id of the parent account, if any
    #[serde(default)]
    pub parent: Option<String>,
    /// Account type (Bank, Cash, Asset, Stock, MutualFund, Income, ...)
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Free text description; ISAs are recognised by e.g. "Cash ISA"
    #[serde(default)]
    pub description: Option<String>,
    /// Commodity the account is held in
    #[serde(default = "default_commodity")]
    pub commodity: String,
}

fn default_commodity() -> String {
    "GBP".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TransactionRecord {
    /// Optional identifier, used in error messages
    #[serde(default)]
    pub id: Option<String>,
    /// Posting date (YYYY-MM-DD)
    #[schemars(with = "String")]
    pub date: NaiveDate,
    pub splits: Vec<SplitRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SplitRecord {
    /// Account id
    pub account: String,
    /// Positive moves money into the account, negative out of it
    #[schemars(with = "f64")]
    pub value: Decimal,
}

/// Read a ledger from JSON
pub fn read_ledger_json<R: Read>(reader: R) -> anyhow::Result<Ledger> {
    let input: LedgerInput = serde_json::from_reader(reader)?;
    Ok(build_ledger(input.accounts, input.transactions)?)
}

/// Resolve string-keyed records into a ledger.
///
/// Accounts may appear in any order; each is inserted once its parent is in
/// the ledger. Transactions are sorted by date.
pub fn build_ledger(
    accounts: Vec<AccountRecord>,
    mut transactions: Vec<TransactionRecord>,
) -> Result<Ledger, LedgerError> {
    let mut known = HashSet::new();
    for record in &accounts {
        if !known.insert(record.id.as_str()) {
            return Err(LedgerError::DuplicateAccountId(record.id.clone()));
        }
    }
    for record in &accounts {
        if let Some(parent) = &record.parent {
            if !known.contains(parent.as_str()) {
                return Err(LedgerError::ParentNotFound {
                    id: record.id.clone(),
                    parent: parent.clone(),
                });
            }
        }
    }

    let mut ledger = Ledger::new();
    let mut ids: HashMap<String, AccountId> = HashMap::new();
    let mut pending = accounts;
    while !pending.is_empty() {
        let before = pending.len();
        let mut waiting = Vec::new();
        for record in pending {
            let parent = match &record.parent {
                None => None,
                Some(p) => match ids.get(p) {
                    Some(id) => Some(*id),
                    None => {
                        waiting.push(record);
                        continue;
                    }
                },
            };
            let mut account = Account::new(record.name, record.account_type)
                .with_commodity(record.commodity);
            if let Some(parent) = parent {
                account = account.with_parent(parent);
            }
            if let Some(description) = record.description {
                account = account.with_description(description);
            }
            let id = ledger.add_account(account)?;
            ids.insert(record.id, id);
        }
        // Every remaining parent exists, so no progress means a cycle
        if waiting.len() == before {
            return Err(LedgerError::ParentCycle(waiting[0].id.clone()));
        }
        pending = waiting;
    }

    transactions.sort_by_key(|t| t.date);
    for record in transactions {
        let tx_id = record
            .id
            .clone()
            .unwrap_or_else(|| record.date.format("%Y-%m-%d").to_string());
        let splits = record
            .splits
            .into_iter()
            .map(|s| match ids.get(&s.account) {
                Some(account) => Ok(Split {
                    account: *account,
                    value: s.value,
                }),
                None => Err(LedgerError::AccountNotFound {
                    transaction: tx_id.clone(),
                    account: s.account,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        ledger.add_transaction(Transaction {
            id: record.id,
            date: record.date,
            splits,
        })?;
    }

    Ok(ledger)
}
