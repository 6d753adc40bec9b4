use super::classify::{classify, isa_kind, AccountClass, IsaKind};
use super::ledger::{AccountId, Ledger, Transaction};
use super::uk::TaxYear;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// An ISA account found in the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IsaAccount {
    pub id: AccountId,
    pub path: String,
    pub kind: IsaKind,
    pub description: String,
}

/// A deposit into an ISA that counts against the allowance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deposit {
    pub tax_year: TaxYear,
    pub date: NaiveDate,
    pub account: AccountId,
    pub path: String,
    pub kind: IsaKind,
    pub amount: Decimal,
}

/// All ISA accounts in the ledger, ordered by path
pub fn isa_accounts(ledger: &Ledger) -> Vec<IsaAccount> {
    let mut accounts: Vec<IsaAccount> = ledger
        .accounts()
        .filter_map(|(id, account)| {
            isa_kind(account).map(|kind| IsaAccount {
                id,
                path: ledger.path(id),
                kind,
                description: account.description.clone().unwrap_or_default(),
            })
        })
        .collect();
    accounts.sort_by(|a, b| a.path.cmp(&b.path));
    accounts
}

/// Every contribution into an ISA account, in ledger order.
///
/// A transaction contributes to an ISA when money flows into the ISA account
/// and at least one other leg takes money out of a contribution source. The
/// deposit amount is the sum of the positive legs into that ISA account.
/// Transactions dated after `at_date` are ignored.
pub fn deposits(ledger: &Ledger, at_date: Option<NaiveDate>) -> Vec<Deposit> {
    let classes: HashMap<AccountId, AccountClass> = ledger
        .accounts()
        .map(|(id, _)| (id, classify(ledger, id)))
        .collect();
    let isa_paths: BTreeMap<AccountId, String> = classes
        .iter()
        .filter(|(_, class)| matches!(class, AccountClass::Isa(_)))
        .map(|(id, _)| (*id, ledger.path(*id)))
        .collect();

    let mut deposits = Vec::new();
    for tx in ledger
        .transactions()
        .iter()
        .filter(|tx| at_date.is_none_or(|d| tx.date <= d))
    {
        let touched: BTreeSet<AccountId> = tx
            .splits
            .iter()
            .map(|s| s.account)
            .filter(|a| isa_paths.contains_key(a))
            .collect();

        for isa in touched {
            let AccountClass::Isa(kind) = classes[&isa] else {
                continue;
            };
            let amount = deposit_amount(tx, isa);
            if amount.is_zero() || !has_contribution_source(tx, isa, |a| classes[&a]) {
                continue;
            }

            log::debug!(
                "Contribution: {} {} {}",
                tx.date,
                isa_paths[&isa],
                amount
            );
            deposits.push(Deposit {
                tax_year: TaxYear::from_date(tx.date),
                date: tx.date,
                account: isa,
                path: isa_paths[&isa].clone(),
                kind,
                amount,
            });
        }
    }
    deposits
}

fn deposit_amount(tx: &Transaction, isa: AccountId) -> Decimal {
    tx.splits
        .iter()
        .filter(|s| s.account == isa && s.value > Decimal::ZERO)
        .map(|s| s.value)
        .sum()
}

fn has_contribution_source(
    tx: &Transaction,
    isa: AccountId,
    class_of: impl Fn(AccountId) -> AccountClass,
) -> bool {
    tx.splits.iter().any(|s| {
        s.account != isa && s.value < Decimal::ZERO && class_of(s.account).is_contribution_source()
    })
}

/// Contribution totals keyed by ISA account path then tax year.
///
/// Only years with at least one qualifying deposit are present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionTotals {
    // The id breaks ties between accounts sharing a path
    totals: BTreeMap<(String, AccountId), BTreeMap<TaxYear, Decimal>>,
}

impl ContributionTotals {
    pub fn from_deposits<'a>(deposits: impl IntoIterator<Item = &'a Deposit>) -> Self {
        let mut totals: BTreeMap<(String, AccountId), BTreeMap<TaxYear, Decimal>> =
            BTreeMap::new();
        for deposit in deposits {
            *totals
                .entry((deposit.path.clone(), deposit.account))
                .or_default()
                .entry(deposit.tax_year)
                .or_default() += deposit.amount;
        }
        ContributionTotals { totals }
    }

    #[allow(dead_code)]
    pub fn get(&self, account: AccountId, year: TaxYear) -> Option<Decimal> {
        self.totals
            .iter()
            .find(|((_, id), _)| *id == account)
            .and_then(|(_, years)| years.get(&year))
            .copied()
    }

    /// (account, tax year, total) in account path then year order
    pub fn iter(&self) -> impl Iterator<Item = (AccountId, TaxYear, Decimal)> + '_ {
        self.totals
            .iter()
            .flat_map(|((_, a), years)| years.iter().map(move |(y, t)| (*a, *y, *t)))
    }

    pub fn len(&self) -> usize {
        self.totals.values().map(BTreeMap::len).sum()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Sum qualifying ISA deposits per account and tax year
pub fn contribution_totals(ledger: &Ledger, at_date: Option<NaiveDate>) -> ContributionTotals {
    ContributionTotals::from_deposits(&deposits(ledger, at_date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ledger::{Account, AccountType, Split};
    use rust_decimal_macros::dec;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    struct Book {
        ledger: Ledger,
        current: AccountId,
        interest: AccountId,
        dividends: AccountId,
        fund: AccountId,
        cash_isa: AccountId,
        stocks_isa: AccountId,
        old_isa: AccountId,
    }

    fn book() -> Book {
        let mut ledger = Ledger::new();
        let root = ledger
            .add_account(Account::new("Root Account", AccountType::Root))
            .unwrap();
        let assets = ledger
            .add_account(Account::new("Assets", AccountType::Asset).with_parent(root))
            .unwrap();
        let income = ledger
            .add_account(Account::new("Income", AccountType::Income).with_parent(root))
            .unwrap();
        let current = ledger
            .add_account(Account::new("Current Account", AccountType::Bank).with_parent(assets))
            .unwrap();
        let cash_isa = ledger
            .add_account(
                Account::new("Cash ISA", AccountType::Bank)
                    .with_parent(assets)
                    .with_description("Cash ISA"),
            )
            .unwrap();
        let old_isa = ledger
            .add_account(
                Account::new("Old ISA", AccountType::Bank)
                    .with_parent(assets)
                    .with_description("Closed Cash ISA"),
            )
            .unwrap();
        let stocks_isa = ledger
            .add_account(
                Account::new("Broker", AccountType::Asset)
                    .with_parent(assets)
                    .with_description("Stocks & Shares ISA"),
            )
            .unwrap();
        let fund = ledger
            .add_account(Account::new("Tracker", AccountType::MutualFund).with_parent(stocks_isa))
            .unwrap();
        let interest = ledger
            .add_account(Account::new("Interest", AccountType::Income).with_parent(income))
            .unwrap();
        let dividends = ledger
            .add_account(Account::new("Dividends", AccountType::Income).with_parent(income))
            .unwrap();

        Book {
            ledger,
            current,
            interest,
            dividends,
            fund,
            cash_isa,
            stocks_isa,
            old_isa,
        }
    }

    fn transfer(book: &mut Book, on: &str, from: AccountId, to: AccountId, amount: Decimal) {
        book.ledger
            .add_transaction(Transaction::transfer(date(on), from, to, amount))
            .unwrap();
    }

    #[test]
    fn interest_excluded_from_contributions() {
        let mut b = book();
        let (current, interest, isa) = (b.current, b.interest, b.cash_isa);
        transfer(&mut b, "2023-05-10", current, isa, dec!(100));
        transfer(&mut b, "2023-05-10", interest, isa, dec!(50));

        let totals = contribution_totals(&b.ledger, None);
        assert_eq!(totals.get(isa, TaxYear(2024)), Some(dec!(100)));
        assert_eq!(totals.len(), 1);
    }

    #[test]
    fn dividends_excluded_from_stocks_isa() {
        let mut b = book();
        let (dividends, isa) = (b.dividends, b.stocks_isa);
        transfer(&mut b, "2023-06-01", dividends, isa, dec!(30));

        assert!(contribution_totals(&b.ledger, None).is_empty());
    }

    #[test]
    fn fund_sale_inside_isa_excluded() {
        let mut b = book();
        let (fund, isa) = (b.fund, b.stocks_isa);
        transfer(&mut b, "2023-07-01", fund, isa, dec!(500));

        assert!(deposits(&b.ledger, None).is_empty());
    }

    #[test]
    fn isa_to_isa_transfer_is_not_a_contribution() {
        let mut b = book();
        let (current, old, isa) = (b.current, b.old_isa, b.cash_isa);
        transfer(&mut b, "2022-05-01", current, old, dec!(700));
        transfer(&mut b, "2023-08-01", old, isa, dec!(700));

        let totals = contribution_totals(&b.ledger, None);
        assert_eq!(totals.get(old, TaxYear(2023)), Some(dec!(700)));
        assert_eq!(totals.get(isa, TaxYear(2024)), None);
        assert_eq!(totals.len(), 1);
    }

    #[test]
    fn totals_ordered_by_account_path() {
        let mut b = book();
        let (current, cash, stocks) = (b.current, b.cash_isa, b.stocks_isa);
        transfer(&mut b, "2023-05-01", current, cash, dec!(100));
        transfer(&mut b, "2022-05-01", current, stocks, dec!(200));
        transfer(&mut b, "2023-05-01", current, stocks, dec!(300));

        // "Assets:Broker" sorts before "Assets:Cash ISA" despite being added later
        let totals = contribution_totals(&b.ledger, None);
        let order: Vec<_> = totals.iter().collect();
        assert_eq!(
            order,
            vec![
                (stocks, TaxYear(2023), dec!(200)),
                (stocks, TaxYear(2024), dec!(300)),
                (cash, TaxYear(2024), dec!(100)),
            ]
        );
    }

    #[test]
    fn deposits_split_by_tax_year_boundary() {
        let mut b = book();
        let (current, isa) = (b.current, b.cash_isa);
        transfer(&mut b, "2023-04-05", current, isa, dec!(200));
        transfer(&mut b, "2023-04-06", current, isa, dec!(300));

        let totals = contribution_totals(&b.ledger, None);
        assert_eq!(totals.get(isa, TaxYear(2023)), Some(dec!(200)));
        assert_eq!(totals.get(isa, TaxYear(2024)), Some(dec!(300)));
    }

    #[test]
    fn totals_accumulate_within_year() {
        let mut b = book();
        let (current, isa) = (b.current, b.cash_isa);
        transfer(&mut b, "2023-05-01", current, isa, dec!(100));
        transfer(&mut b, "2023-06-01", current, isa, dec!(250.50));
        transfer(&mut b, "2024-01-01", current, isa, dec!(49.50));

        let totals = contribution_totals(&b.ledger, None);
        assert_eq!(totals.get(isa, TaxYear(2024)), Some(dec!(400)));
    }

    #[test]
    fn withdrawals_are_not_deposits() {
        let mut b = book();
        let (current, isa) = (b.current, b.cash_isa);
        transfer(&mut b, "2023-05-01", isa, current, dec!(100));

        assert!(deposits(&b.ledger, None).is_empty());
    }

    #[test]
    fn split_transaction_with_mixed_sources_counts_isa_legs() {
        let mut b = book();
        let (current, interest, isa) = (b.current, b.interest, b.cash_isa);
        b.ledger
            .add_transaction(Transaction {
                id: Some("mixed".to_string()),
                date: date("2023-09-01"),
                splits: vec![
                    Split {
                        account: current,
                        value: dec!(-80),
                    },
                    Split {
                        account: interest,
                        value: dec!(-20),
                    },
                    Split {
                        account: isa,
                        value: dec!(60),
                    },
                    Split {
                        account: isa,
                        value: dec!(40),
                    },
                ],
            })
            .unwrap();

        let found = deposits(&b.ledger, None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].amount, dec!(100));
        assert_eq!(found[0].kind, IsaKind::Cash);
        assert_eq!(found[0].path, "Assets:Cash ISA");
    }

    #[test]
    fn at_date_excludes_later_transactions() {
        let mut b = book();
        let (current, isa) = (b.current, b.cash_isa);
        transfer(&mut b, "2023-05-01", current, isa, dec!(100));
        transfer(&mut b, "2023-05-02", current, isa, dec!(100));

        let totals = contribution_totals(&b.ledger, Some(date("2023-05-01")));
        assert_eq!(totals.get(isa, TaxYear(2024)), Some(dec!(100)));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let mut b = book();
        let (current, interest, isa) = (b.current, b.interest, b.cash_isa);
        transfer(&mut b, "2023-05-10", current, isa, dec!(100));
        transfer(&mut b, "2023-05-10", interest, isa, dec!(50));
        transfer(&mut b, "2022-01-10", current, isa, dec!(75));

        let first = contribution_totals(&b.ledger, None);
        let second = contribution_totals(&b.ledger, None);
        assert_eq!(first, second);
    }

    #[test]
    fn totals_iterate_by_account_then_year() {
        let mut b = book();
        let (current, cash, stocks) = (b.current, b.cash_isa, b.stocks_isa);
        transfer(&mut b, "2024-05-01", current, stocks, dec!(10));
        transfer(&mut b, "2023-05-01", current, stocks, dec!(20));
        transfer(&mut b, "2023-05-01", current, cash, dec!(30));

        let rows: Vec<_> = contribution_totals(&b.ledger, None).iter().collect();
        assert_eq!(
            rows,
            vec![
                (cash, TaxYear(2024), dec!(30)),
                (stocks, TaxYear(2024), dec!(20)),
                (stocks, TaxYear(2025), dec!(10)),
            ]
        );
    }

    #[test]
    fn isa_accounts_sorted_by_path() {
        let b = book();
        let paths: Vec<_> = isa_accounts(&b.ledger).into_iter().map(|a| a.path).collect();
        assert_eq!(paths, vec!["Assets:Broker", "Assets:Cash ISA", "Assets:Old ISA"]);
    }
}
