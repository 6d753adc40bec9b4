//! Review command - per tax year deposits checked against the ISA allowance

use super::{format_gbp, read_ledger};
use crate::core::{review_isa_accounts, IsaReview, YearReview};
use chrono::{Local, NaiveDate};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ReviewCommand {
    /// GnuCash SQLite book or JSON ledger ("-" reads JSON from stdin)
    #[arg(short, long)]
    file: PathBuf,

    /// Show values as at date (YYYY-MM-DD, defaults to today)
    #[arg(short, long)]
    date: Option<NaiveDate>,

    /// Output as JSON instead of formatted tables
    #[arg(long)]
    json: bool,
}

impl ReviewCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let ledger = read_ledger(&self.file)?;
        let at_date = self.date.unwrap_or_else(|| Local::now().date_naive());
        let review = review_isa_accounts(&ledger, at_date);

        for warning in review.warnings() {
            log::warn!("{}", warning);
        }

        if self.json {
            self.print_json(&review)
        } else {
            self.print_review(&review);
            Ok(())
        }
    }

    fn print_review(&self, review: &IsaReview) {
        println!();
        println!("ISA ALLOWANCE REVIEW (as at {})", review.at_date);
        println!();

        for year in &review.years {
            match (year.tax_year.start_date(), year.tax_year.end_date()) {
                (Some(start), Some(end)) => {
                    println!("Tax Year {} ({} to {})", year.tax_year, start, end)
                }
                _ => println!("Tax Year {}", year.tax_year),
            }

            if !year.deposits.is_empty() {
                let table = Table::new(deposit_rows(year))
                    .with(Style::rounded())
                    .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
                    .to_string();
                println!("{}", table);
            }

            let table = Table::new(allowance_rows(year))
                .with(Style::rounded())
                .with(Modify::new(Columns::new(1..)).with(Alignment::right()))
                .to_string();
            println!("{}", table);
            println!();
        }
    }

    fn print_json(&self, review: &IsaReview) -> anyhow::Result<()> {
        let output = ReviewOutput {
            at_date: review.at_date.to_string(),
            years: review
                .years
                .iter()
                .map(|year| YearOutput {
                    tax_year: year.tax_year.display(),
                    deposits: deposit_rows(year),
                    allowances: allowance_rows(year),
                    warnings: year.warnings.iter().map(ToString::to_string).collect(),
                })
                .collect(),
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}

fn deposit_rows(year: &YearReview) -> Vec<DepositRow> {
    year.deposits
        .iter()
        .map(|d| DepositRow {
            date: d.date.format("%Y-%m-%d").to_string(),
            amount: format!("{:.2}", d.amount),
            account: d.path.clone(),
        })
        .collect()
}

fn allowance_rows(year: &YearReview) -> Vec<AllowanceRowView> {
    year.allowances
        .iter()
        .map(|row| AllowanceRowView {
            category: row.category.label().to_string(),
            allowance: format_gbp(row.allowance),
            contributions: format_gbp(row.contributions),
            remaining: format_gbp(row.remaining),
        })
        .collect()
}

#[derive(Debug, Clone, Tabled, Serialize)]
struct DepositRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Account")]
    account: String,
}

#[derive(Debug, Clone, Tabled, Serialize)]
struct AllowanceRowView {
    #[tabled(rename = "")]
    category: String,
    #[tabled(rename = "Allowance")]
    allowance: String,
    #[tabled(rename = "Contributions")]
    contributions: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
}

#[derive(Debug, Serialize)]
struct YearOutput {
    tax_year: String,
    deposits: Vec<DepositRow>,
    allowances: Vec<AllowanceRowView>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ReviewOutput {
    at_date: String,
    years: Vec<YearOutput>,
}
