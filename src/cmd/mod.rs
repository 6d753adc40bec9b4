pub mod accounts;
pub mod review;
pub mod schema;
pub mod totals;

use crate::core::{Ledger, LedgerError};
use crate::input::{self, gnucash};
use anyhow::Context;
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::time::Instant;

const GZIP_HEADER: &[u8] = &[0x1f, 0x8b];

/// Read a ledger (GnuCash SQLite book or JSON, or JSON on stdin with "-")
pub fn read_ledger(path: &Path) -> anyhow::Result<Ledger> {
    let started = Instant::now();
    let ledger = if path.as_os_str() == "-" {
        read_from_stdin()?
    } else {
        read_from_file(path).with_context(|| format!("reading ledger {}", path.display()))?
    };
    log::debug!("File load time: {:?}", started.elapsed());
    log::debug!(
        "Loaded {} accounts, {} transactions",
        ledger.account_count(),
        ledger.transactions().len()
    );
    Ok(ledger)
}

fn read_from_file(path: &Path) -> anyhow::Result<Ledger> {
    let mut header = Vec::with_capacity(gnucash::SQLITE_HEADER.len());
    File::open(path)?
        .take(gnucash::SQLITE_HEADER.len() as u64)
        .read_to_end(&mut header)?;

    if header.starts_with(gnucash::SQLITE_HEADER) {
        log::debug!("Reading GnuCash SQLite book {}", path.display());
        return gnucash::open_book(path);
    }
    if header.starts_with(GZIP_HEADER) || header.starts_with(b"<?xml") {
        return Err(LedgerError::UnsupportedFormat(
            "GnuCash XML books are not supported; save the book as SQLite".to_string(),
        )
        .into());
    }

    let reader = BufReader::new(File::open(path)?);
    input::read_ledger_json(reader)
}

fn read_from_stdin() -> anyhow::Result<Ledger> {
    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());

    let mut buffer = Vec::new();
    reader.read_to_end(&mut buffer)?;

    if buffer.is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    input::read_ledger_json(io::Cursor::new(buffer))
}

fn format_gbp(amount: Decimal) -> String {
    if amount < Decimal::ZERO {
        format!("-£{:.2}", amount.abs())
    } else {
        format!("£{:.2}", amount)
    }
}
