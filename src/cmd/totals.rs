//! Totals command - contributions per ISA account and tax year

use super::{format_gbp, read_ledger};
use crate::core::{contribution_totals, Ledger, TaxYear};
use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct TotalsCommand {
    /// GnuCash SQLite book or JSON ledger ("-" reads JSON from stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Ignore transactions after this date (YYYY-MM-DD)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Tax year to filter (e.g., 2025 for 2024/25)
    #[arg(short, long)]
    year: Option<i32>,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

impl TotalsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let ledger = read_ledger(&self.file)?;
        let rows = total_rows(&ledger, self.date, self.year.map(TaxYear));

        if self.csv {
            self.write_csv(&rows)
        } else {
            self.print_table(&rows);
            Ok(())
        }
    }

    fn print_table(&self, rows: &[TotalRow]) {
        if rows.is_empty() {
            println!("No ISA contributions found matching filters");
            return;
        }

        let table = Table::new(rows.iter().map(TotalRowView::from))
            .with(Style::rounded())
            .with(Modify::new(Columns::new(2..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }

    fn write_csv(&self, rows: &[TotalRow]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for row in rows {
            wtr.serialize(TotalRecord::from(row))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

struct TotalRow {
    account: String,
    tax_year: TaxYear,
    amount: Decimal,
}

#[derive(Debug, Serialize)]
struct TotalRecord {
    account: String,
    tax_year: TaxYear,
    amount: String,
}

impl From<&TotalRow> for TotalRecord {
    fn from(row: &TotalRow) -> Self {
        TotalRecord {
            account: row.account.clone(),
            tax_year: row.tax_year,
            amount: format!("{:.2}", row.amount),
        }
    }
}

#[derive(Debug, Clone, Tabled)]
struct TotalRowView {
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Tax Year")]
    tax_year: String,
    #[tabled(rename = "Contributions")]
    amount: String,
}

impl From<&TotalRow> for TotalRowView {
    fn from(row: &TotalRow) -> Self {
        TotalRowView {
            account: row.account.clone(),
            tax_year: row.tax_year.display(),
            amount: format_gbp(row.amount),
        }
    }
}

// Ordered by account path then tax year
fn total_rows(ledger: &Ledger, at_date: Option<NaiveDate>, year: Option<TaxYear>) -> Vec<TotalRow> {
    let totals = contribution_totals(ledger, at_date);
    log::debug!("{} contribution totals", totals.len());
    totals
        .iter()
        .filter(|(_, y, _)| year.is_none_or(|filter| *y == filter))
        .map(|(account, tax_year, amount)| TotalRow {
            account: ledger.path(account),
            tax_year,
            amount,
        })
        .collect()
}
