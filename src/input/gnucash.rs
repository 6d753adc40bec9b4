//! GnuCash SQLite books

use super::{build_ledger, AccountRecord, SplitRecord, TransactionRecord};
use crate::core::{AccountType, Ledger, LedgerError};
use anyhow::Context;
use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use rusqlite::{Connection, OpenFlags};
use rust_decimal::Decimal;
use std::path::Path;

/// Header of every SQLite 3 database file
pub const SQLITE_HEADER: &[u8] = b"SQLite format 3\0";

/// Open a GnuCash book read-only and load it
pub fn open_book(path: &Path) -> anyhow::Result<Ledger> {
    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .with_context(|| format!("opening GnuCash book {}", path.display()))?;
    read_book(&conn)
}

pub fn read_book(conn: &Connection) -> anyhow::Result<Ledger> {
    read_book_in(conn, &Local)
}

/// Load a book, reading post dates as calendar days in `tz`
pub fn read_book_in<Tz: TimeZone>(conn: &Connection, tz: &Tz) -> anyhow::Result<Ledger> {
    let accounts = read_accounts(conn)?;
    let transactions = read_transactions(conn, tz)?;
    log::debug!(
        "GnuCash book: {} accounts, {} transactions",
        accounts.len(),
        transactions.len()
    );
    Ok(build_ledger(accounts, transactions)?)
}

fn read_accounts(conn: &Connection) -> anyhow::Result<Vec<AccountRecord>> {
    let mut stmt = conn.prepare(
        "SELECT a.guid, a.name, a.account_type, a.parent_guid, a.description, c.mnemonic
         FROM accounts a
         LEFT JOIN commodities c ON c.guid = a.commodity_guid
         ORDER BY a.name ASC, a.guid ASC;",
    )?;
    let rows = stmt.query_map([], |row| {
        let account_type: String = row.get(2)?;
        Ok(AccountRecord {
            id: row.get(0)?,
            name: row.get(1)?,
            account_type: AccountType::from_gnucash(&account_type),
            parent: row.get(3)?,
            description: row.get(4)?,
            commodity: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
        })
    })?;
    let accounts = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(accounts)
}

fn read_transactions<Tz: TimeZone>(
    conn: &Connection,
    tz: &Tz,
) -> anyhow::Result<Vec<TransactionRecord>> {
    let mut stmt = conn.prepare(
        "SELECT t.guid, t.post_date, s.account_guid, s.value_num, s.value_denom
         FROM splits s
         JOIN transactions t ON t.guid = s.tx_guid
         ORDER BY t.post_date ASC, t.guid ASC, s.guid ASC;",
    )?;
    let mut rows = stmt.query([])?;

    let mut transactions: Vec<TransactionRecord> = Vec::new();
    while let Some(row) = rows.next()? {
        let tx_guid: String = row.get(0)?;
        let post_date: Option<String> = row.get(1)?;
        let split = SplitRecord {
            account: row.get(2)?,
            value: split_value(row.get(3)?, row.get(4)?)?,
        };

        match transactions.last_mut() {
            Some(tx) if tx.id.as_deref() == Some(tx_guid.as_str()) => tx.splits.push(split),
            _ => {
                let date = post_date_to_date(&tx_guid, post_date.as_deref(), tz)?;
                transactions.push(TransactionRecord {
                    id: Some(tx_guid),
                    date,
                    splits: vec![split],
                });
            }
        }
    }
    Ok(transactions)
}

fn split_value(num: i64, denom: i64) -> Result<Decimal, LedgerError> {
    Decimal::from(num)
        .checked_div(Decimal::from(denom))
        .ok_or_else(|| LedgerError::InvalidAmount(format!("{num}/{denom}")))
}

// Post dates are UTC timestamps, "YYYY-MM-DD HH:MM:SS" or "YYYYMMDDHHMMSS" in
// older books. Older books also store local midnight, so the calendar day is
// taken after converting to the book's zone.
const POST_DATE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y%m%d%H%M%S"];

fn post_date_to_date<Tz: TimeZone>(
    tx_guid: &str,
    post_date: Option<&str>,
    tz: &Tz,
) -> Result<NaiveDate, LedgerError> {
    post_date
        .and_then(|d| {
            POST_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(d.trim(), fmt).ok())
        })
        .map(|utc| tz.from_utc_datetime(&utc).date_naive())
        .ok_or_else(|| {
            LedgerError::InvalidDate(format!("{} (transaction {tx_guid})", post_date.unwrap_or("")))
        })
}
