use super::classify::IsaKind;
use super::contributions::{deposits, Deposit};
use super::ledger::Ledger;
use super::uk::TaxYear;
use super::warnings::Warning;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Allowance row categories, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowanceCategory {
    Cash,
    StocksAndShares,
    Total,
}

impl AllowanceCategory {
    pub const ALL: [AllowanceCategory; 3] = [
        AllowanceCategory::Cash,
        AllowanceCategory::StocksAndShares,
        AllowanceCategory::Total,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AllowanceCategory::Cash => IsaKind::Cash.label(),
            AllowanceCategory::StocksAndShares => IsaKind::StocksAndShares.label(),
            AllowanceCategory::Total => "Total",
        }
    }

    fn includes(&self, kind: IsaKind) -> bool {
        match self {
            AllowanceCategory::Cash => kind == IsaKind::Cash,
            AllowanceCategory::StocksAndShares => kind == IsaKind::StocksAndShares,
            AllowanceCategory::Total => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowanceRow {
    pub category: AllowanceCategory,
    pub allowance: Decimal,
    pub contributions: Decimal,
    /// Negative when the allowance was exceeded
    pub remaining: Decimal,
}

#[derive(Debug, Clone)]
pub struct YearReview {
    pub tax_year: TaxYear,
    /// Deposits sorted by date then account
    pub deposits: Vec<Deposit>,
    pub allowances: Vec<AllowanceRow>,
    pub warnings: Vec<Warning>,
}

impl YearReview {
    fn new(tax_year: TaxYear, mut deposits: Vec<Deposit>) -> Self {
        deposits.sort_by(|a, b| (a.date, &a.path).cmp(&(b.date, &b.path)));

        let mut warnings = Vec::new();
        let limits = tax_year.isa_allowance();
        if limits.is_none() && !deposits.is_empty() {
            warnings.push(Warning::NoAllowance { tax_year });
        }

        let allowances: Vec<AllowanceRow> = AllowanceCategory::ALL
            .iter()
            .map(|category| {
                let allowance = limits.map_or(Decimal::ZERO, |l| match category {
                    AllowanceCategory::Cash => l.cash,
                    AllowanceCategory::StocksAndShares => l.stocks,
                    AllowanceCategory::Total => l.total,
                });
                let contributions: Decimal = deposits
                    .iter()
                    .filter(|d| category.includes(d.kind))
                    .map(|d| d.amount)
                    .sum();
                AllowanceRow {
                    category: *category,
                    allowance,
                    contributions,
                    remaining: allowance - contributions,
                }
            })
            .collect();

        if limits.is_some() {
            warnings.extend(
                allowances
                    .iter()
                    .filter(|row| row.remaining < Decimal::ZERO)
                    .map(|row| Warning::AllowanceExceeded {
                        tax_year,
                        category: row.category.label().to_string(),
                        allowance: row.allowance,
                        contributions: row.contributions,
                    }),
            );
        }

        YearReview {
            tax_year,
            deposits,
            allowances,
            warnings,
        }
    }

    #[cfg(test)]
    pub fn row(&self, category: AllowanceCategory) -> Option<&AllowanceRow> {
        self.allowances.iter().find(|r| r.category == category)
    }
}

/// Allowance review across all tax years with ISA contributions
#[derive(Debug, Clone)]
pub struct IsaReview {
    pub at_date: NaiveDate,
    pub years: Vec<YearReview>,
}

impl IsaReview {
    #[cfg(test)]
    pub fn year(&self, tax_year: TaxYear) -> Option<&YearReview> {
        self.years.iter().find(|y| y.tax_year == tax_year)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        self.years.iter().flat_map(|y| y.warnings.iter())
    }
}

/// Review ISA contributions as at a date.
///
/// Every tax year with a contribution is reviewed, plus the tax year
/// containing `at_date` so the current remaining allowance is always shown.
pub fn review_isa_accounts(ledger: &Ledger, at_date: NaiveDate) -> IsaReview {
    let mut by_year: BTreeMap<TaxYear, Vec<Deposit>> = BTreeMap::new();
    by_year.entry(TaxYear::from_date(at_date)).or_default();
    for deposit in deposits(ledger, Some(at_date)) {
        by_year.entry(deposit.tax_year).or_default().push(deposit);
    }

    let years = by_year
        .into_iter()
        .map(|(tax_year, deposits)| YearReview::new(tax_year, deposits))
        .collect();

    IsaReview { at_date, years }
}
