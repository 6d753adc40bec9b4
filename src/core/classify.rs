//! Account classification by description pattern, type and name

use super::ledger::{Account, AccountId, AccountType, Ledger};
use once_cell::sync::Lazy;
use regex::Regex;

static ISA_DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Closed )?(Cash|Stocks & Shares) ISA ?").expect("valid ISA regex")
});
static CASH_ISA_DESCRIPTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(Closed )?Cash ISA ?").expect("valid cash ISA regex"));
static STOCKS_ISA_DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Closed )?Stocks & Shares ISA ?").expect("valid stocks ISA regex")
});

/// ISAs are only recognised in sterling accounts
const ISA_COMMODITY: &str = "GBP";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IsaKind {
    Cash,
    StocksAndShares,
}

impl IsaKind {
    pub fn from_description(description: &str) -> Option<IsaKind> {
        if CASH_ISA_DESCRIPTION_RE.is_match(description) {
            Some(IsaKind::Cash)
        } else if STOCKS_ISA_DESCRIPTION_RE.is_match(description) {
            Some(IsaKind::StocksAndShares)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IsaKind::Cash => "Cash",
            IsaKind::StocksAndShares => "S&S",
        }
    }
}

/// Whether a description denotes an open or closed Cash or Stocks & Shares ISA
pub fn is_isa_description(description: &str) -> bool {
    ISA_DESCRIPTION_RE.is_match(description)
}

/// The ISA kind of an account, if it is a sterling ISA account
pub fn isa_kind(account: &Account) -> Option<IsaKind> {
    if account.commodity != ISA_COMMODITY {
        return None;
    }
    account
        .description
        .as_deref()
        .filter(|d| is_isa_description(d))
        .and_then(IsaKind::from_description)
}

/// What an account is, as far as ISA contributions are concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountClass {
    Isa(IsaKind),
    IncomeInterest,
    IncomeDividend,
    IncomeInvestment,
    MutualFund,
    Stock,
    Other,
}

impl AccountClass {
    /// Money leaving an account of this class into an ISA is a new subscription.
    ///
    /// Interest, dividends, investment income, fund and share sales are growth
    /// inside the wrapper, and ISA-to-ISA transfers move existing
    /// subscriptions.
    pub fn is_contribution_source(&self) -> bool {
        matches!(self, AccountClass::Other)
    }
}

pub fn classify(ledger: &Ledger, id: AccountId) -> AccountClass {
    let account = ledger.account(id);
    if let Some(kind) = isa_kind(account) {
        return AccountClass::Isa(kind);
    }

    match account.account_type {
        AccountType::Income => income_class(ledger, id).unwrap_or(AccountClass::Other),
        AccountType::MutualFund => AccountClass::MutualFund,
        AccountType::Stock => AccountClass::Stock,
        _ => AccountClass::Other,
    }
}

#[allow(dead_code)]
pub fn is_contribution_source(ledger: &Ledger, id: AccountId) -> bool {
    classify(ledger, id).is_contribution_source()
}

// Nearest matching name wins: the account itself, then each ancestor up to the root.
fn income_class(ledger: &Ledger, id: AccountId) -> Option<AccountClass> {
    std::iter::once(id)
        .chain(ledger.ancestors(id))
        .find_map(|a| match ledger.account(a).name.as_str() {
            "Interest" => Some(AccountClass::IncomeInterest),
            "Dividends" => Some(AccountClass::IncomeDividend),
            "Investments" => Some(AccountClass::IncomeInvestment),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(ledger: &mut Ledger, account: Account) -> AccountId {
        ledger.add_account(account).unwrap()
    }

    #[test]
    fn isa_descriptions() {
        assert!(is_isa_description("Cash ISA"));
        assert!(is_isa_description("Cash ISA "));
        assert!(is_isa_description("Cash ISA 2019 fixed rate"));
        assert!(is_isa_description("Stocks & Shares ISA"));
        assert!(is_isa_description("Closed Cash ISA"));
        assert!(is_isa_description("Closed Stocks & Shares ISA"));
    }

    #[test]
    fn non_isa_descriptions() {
        assert!(!is_isa_description("ISA Savings"));
        assert!(!is_isa_description("cash isa"));
        assert!(!is_isa_description("Lifetime ISA"));
        assert!(!is_isa_description("Innovative Finance ISA"));
        assert!(!is_isa_description("My Cash ISA"));
        assert!(!is_isa_description("Closed  Cash ISA"));
        assert!(!is_isa_description(""));
    }

    #[test]
    fn isa_kind_from_description() {
        assert_eq!(IsaKind::from_description("Cash ISA"), Some(IsaKind::Cash));
        assert_eq!(IsaKind::from_description("Closed Cash ISA"), Some(IsaKind::Cash));
        assert_eq!(
            IsaKind::from_description("Stocks & Shares ISA"),
            Some(IsaKind::StocksAndShares)
        );
        assert_eq!(IsaKind::from_description("Savings"), None);
    }

    #[test]
    fn isa_requires_description_and_sterling() {
        let plain = Account::new("Savings", AccountType::Bank);
        let isa = Account::new("Savings", AccountType::Bank).with_description("Cash ISA");
        let dollar = Account::new("Savings", AccountType::Bank)
            .with_description("Cash ISA")
            .with_commodity("USD");

        assert_eq!(isa_kind(&plain), None);
        assert_eq!(isa_kind(&isa), Some(IsaKind::Cash));
        assert_eq!(isa_kind(&dollar), None);
    }

    #[test]
    fn income_named_interest_is_excluded() {
        let mut ledger = Ledger::new();
        let interest = add(&mut ledger, Account::new("Interest", AccountType::Income));

        assert_eq!(classify(&ledger, interest), AccountClass::IncomeInterest);
        assert!(!is_contribution_source(&ledger, interest));
    }

    #[test]
    fn income_under_dividends_is_excluded() {
        let mut ledger = Ledger::new();
        let income = add(&mut ledger, Account::new("Income", AccountType::Income));
        let dividends = add(
            &mut ledger,
            Account::new("Dividends", AccountType::Income).with_parent(income),
        );
        let acme = add(
            &mut ledger,
            Account::new("ACME plc", AccountType::Income).with_parent(dividends),
        );

        assert_eq!(classify(&ledger, acme), AccountClass::IncomeDividend);
        assert!(!is_contribution_source(&ledger, acme));
    }

    #[test]
    fn ancestor_walk_is_unbounded() {
        let mut ledger = Ledger::new();
        let mut parent = add(&mut ledger, Account::new("Investments", AccountType::Income));
        for i in 0..10 {
            parent = add(
                &mut ledger,
                Account::new(format!("Level {i}"), AccountType::Income).with_parent(parent),
            );
        }

        assert_eq!(classify(&ledger, parent), AccountClass::IncomeInvestment);
    }

    #[test]
    fn nearest_name_wins() {
        let mut ledger = Ledger::new();
        let investments = add(&mut ledger, Account::new("Investments", AccountType::Income));
        let interest = add(
            &mut ledger,
            Account::new("Interest", AccountType::Income).with_parent(investments),
        );

        assert_eq!(classify(&ledger, interest), AccountClass::IncomeInterest);
    }

    #[test]
    fn other_income_is_a_contribution_source() {
        let mut ledger = Ledger::new();
        let income = add(&mut ledger, Account::new("Income", AccountType::Income));
        let salary = add(
            &mut ledger,
            Account::new("Salary", AccountType::Income).with_parent(income),
        );

        assert_eq!(classify(&ledger, salary), AccountClass::Other);
        assert!(is_contribution_source(&ledger, salary));
    }

    #[test]
    fn income_name_match_is_case_sensitive() {
        let mut ledger = Ledger::new();
        let interest = add(&mut ledger, Account::new("interest", AccountType::Income));

        assert!(is_contribution_source(&ledger, interest));
    }

    #[test]
    fn interest_name_only_matters_for_income() {
        let mut ledger = Ledger::new();
        let interest = add(&mut ledger, Account::new("Interest", AccountType::Bank));

        assert!(is_contribution_source(&ledger, interest));
    }

    #[test]
    fn funds_and_shares_are_excluded() {
        let mut ledger = Ledger::new();
        let fund = add(&mut ledger, Account::new("Tracker", AccountType::MutualFund));
        let share = add(&mut ledger, Account::new("ACME", AccountType::Stock));

        assert_eq!(classify(&ledger, fund), AccountClass::MutualFund);
        assert_eq!(classify(&ledger, share), AccountClass::Stock);
        assert!(!is_contribution_source(&ledger, fund));
        assert!(!is_contribution_source(&ledger, share));
    }

    #[test]
    fn bank_account_is_a_contribution_source() {
        let mut ledger = Ledger::new();
        let current = add(&mut ledger, Account::new("Current Account", AccountType::Bank));

        assert_eq!(classify(&ledger, current), AccountClass::Other);
        assert!(is_contribution_source(&ledger, current));
    }

    #[test]
    fn isa_is_not_a_contribution_source() {
        let mut ledger = Ledger::new();
        let old = add(
            &mut ledger,
            Account::new("Old ISA", AccountType::Bank).with_description("Closed Cash ISA"),
        );

        assert_eq!(classify(&ledger, old), AccountClass::Isa(IsaKind::Cash));
        assert!(!is_contribution_source(&ledger, old));
    }
}
