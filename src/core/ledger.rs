use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Separator used between account names in a full account path
pub const PATH_SEPARATOR: &str = ":";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("duplicate account id: {0}")]
    DuplicateAccountId(String),
    #[error("parent account not found: {id} -> {parent}")]
    ParentNotFound { id: String, parent: String },
    #[error("account parents form a cycle: {0}")]
    ParentCycle(String),
    #[error("account not found: {account} (transaction {transaction})")]
    AccountNotFound { transaction: String, account: String },
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("unsupported ledger file: {0}")]
    UnsupportedFormat(String),
}

/// Account types, named after the GnuCash account types that matter here
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum AccountType {
    Root,
    Bank,
    Cash,
    Asset,
    Stock,
    MutualFund,
    Income,
    Expense,
    Equity,
    Liability,
    #[serde(other)]
    Other,
}

impl AccountType {
    /// Map a GnuCash account type name (as stored in a book) to an account type
    pub fn from_gnucash(name: &str) -> AccountType {
        match name {
            "ROOT" => AccountType::Root,
            "BANK" => AccountType::Bank,
            "CASH" => AccountType::Cash,
            "ASSET" => AccountType::Asset,
            "STOCK" => AccountType::Stock,
            "MUTUAL" => AccountType::MutualFund,
            "INCOME" => AccountType::Income,
            "EXPENSE" => AccountType::Expense,
            "EQUITY" => AccountType::Equity,
            "LIABILITY" | "CREDIT" => AccountType::Liability,
            _ => AccountType::Other,
        }
    }
}

/// Index of an account in its ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub name: String,
    pub parent: Option<AccountId>,
    pub account_type: AccountType,
    pub description: Option<String>,
    /// Commodity mnemonic the account is denominated in (e.g. "GBP")
    pub commodity: String,
}

impl Account {
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        Account {
            name: name.into(),
            parent: None,
            account_type,
            description: None,
            commodity: "GBP".to_string(),
        }
    }

    pub fn with_parent(mut self, parent: AccountId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_commodity(mut self, commodity: impl Into<String>) -> Self {
        self.commodity = commodity.into();
        self
    }
}

/// One leg of a transaction. Positive values move money into the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub account: AccountId,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: Option<String>,
    pub date: NaiveDate,
    pub splits: Vec<Split>,
}

impl Transaction {
    /// A plain two-legged transfer of `amount` from one account to another
    #[cfg(test)]
    pub fn transfer(date: NaiveDate, from: AccountId, to: AccountId, amount: Decimal) -> Self {
        Transaction {
            id: None,
            date,
            splits: vec![
                Split {
                    account: from,
                    value: -amount,
                },
                Split {
                    account: to,
                    value: amount,
                },
            ],
        }
    }

    fn display_id(&self) -> String {
        self.id
            .clone()
            .unwrap_or_else(|| self.date.format("%Y-%m-%d").to_string())
    }
}

/// Flat arena of accounts plus the transactions between them.
///
/// Accounts refer to their parent by index, and a parent must already be in
/// the ledger before its children are added, so the account tree can never
/// contain a cycle.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&mut self, account: Account) -> Result<AccountId, LedgerError> {
        if let Some(parent) = account.parent {
            if parent.0 >= self.accounts.len() {
                return Err(LedgerError::ParentNotFound {
                    id: account.name,
                    parent: parent.0.to_string(),
                });
            }
        }
        self.accounts.push(account);
        Ok(AccountId(self.accounts.len() - 1))
    }

    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<(), LedgerError> {
        if let Some(split) = transaction
            .splits
            .iter()
            .find(|s| s.account.0 >= self.accounts.len())
        {
            return Err(LedgerError::AccountNotFound {
                transaction: transaction.display_id(),
                account: split.account.0.to_string(),
            });
        }
        self.transactions.push(transaction);
        Ok(())
    }

    pub fn account(&self, id: AccountId) -> &Account {
        &self.accounts[id.0]
    }

    pub fn accounts(&self) -> impl Iterator<Item = (AccountId, &Account)> {
        self.accounts
            .iter()
            .enumerate()
            .map(|(i, a)| (AccountId(i), a))
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Parent chain of an account, nearest first, not including the account itself
    pub fn ancestors(&self, id: AccountId) -> Ancestors<'_> {
        Ancestors {
            ledger: self,
            next: self.account(id).parent,
        }
    }

    /// Full account name, e.g. "Assets:Savings:Cash ISA". Root accounts are left out.
    pub fn path(&self, id: AccountId) -> String {
        let mut names: Vec<&str> = std::iter::once(id)
            .chain(self.ancestors(id))
            .map(|a| self.account(a))
            .filter(|a| a.account_type != AccountType::Root)
            .map(|a| a.name.as_str())
            .collect();
        names.reverse();
        names.join(PATH_SEPARATOR)
    }
}

pub struct Ancestors<'a> {
    ledger: &'a Ledger,
    next: Option<AccountId>,
}

impl Iterator for Ancestors<'_> {
    type Item = AccountId;

    fn next(&mut self) -> Option<AccountId> {
        let current = self.next?;
        self.next = self.ledger.account(current).parent;
        Some(current)
    }
}
