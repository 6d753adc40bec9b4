//! Accounts command - list the accounts recognised as ISAs

use super::read_ledger;
use crate::core::{isa_accounts, IsaKind};
use clap::Args;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

#[derive(Args, Debug)]
pub struct AccountsCommand {
    /// GnuCash SQLite book or JSON ledger ("-" reads JSON from stdin)
    #[arg(short, long)]
    file: PathBuf,
}

impl AccountsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let ledger = read_ledger(&self.file)?;
        let rows: Vec<AccountRow> = isa_accounts(&ledger)
            .into_iter()
            .map(|a| AccountRow {
                account: a.path,
                kind: kind_name(a.kind).to_string(),
                description: a.description,
            })
            .collect();

        if rows.is_empty() {
            println!("No ISA accounts found");
            return Ok(());
        }

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{}", table);
        Ok(())
    }
}

fn kind_name(kind: IsaKind) -> &'static str {
    match kind {
        IsaKind::Cash => "Cash ISA",
        IsaKind::StocksAndShares => "Stocks & Shares ISA",
    }
}

#[derive(Debug, Clone, Tabled)]
struct AccountRow {
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Description")]
    description: String,
}
