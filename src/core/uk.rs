use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Serialize, Serializer};

/// UK Tax Year (runs 6 April to 5 April)
/// The year value represents the end year (e.g., 2025 = 2024/25 tax year)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxYear(pub i32);

impl TaxYear {
    /// Create a tax year from a date
    pub fn from_date(date: NaiveDate) -> Self {
        let year = date.year();
        // On or after 6 April falls in the tax year ending next April
        if (date.month(), date.day()) >= (4, 6) {
            TaxYear(year + 1)
        } else {
            TaxYear(year)
        }
    }

    /// Start date of the tax year (6 April of previous year)
    pub fn start_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0 - 1, 4, 6)
    }

    /// End date of the tax year (5 April)
    pub fn end_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.0, 4, 5)
    }

    /// Display as "2024/25" format
    pub fn display(&self) -> String {
        format!("{:04}/{:02}", self.0 - 1, self.0.rem_euclid(100))
    }

    /// Annual ISA subscription limits for this tax year.
    ///
    /// Returns `None` for years before ISAs were introduced (1999/00). Years
    /// after the last known change use the current limits.
    pub fn isa_allowance(&self) -> Option<IsaAllowance> {
        let allowance = match self.0 {
            // 2017/18 onwards: £20,000 split freely
            2018.. => IsaAllowance::flat(dec!(20000)),
            // 2015/16 and 2016/17: £15,240
            2016..=2017 => IsaAllowance::flat(dec!(15240)),
            // 2014/15: NISA reform, £15,000
            2015 => IsaAllowance::flat(dec!(15000)),
            2014 => IsaAllowance::split(dec!(5760), dec!(11520)),
            2013 => IsaAllowance::split(dec!(5640), dec!(11280)),
            2012 => IsaAllowance::split(dec!(5340), dec!(10680)),
            2011 => IsaAllowance::split(dec!(5100), dec!(10200)),
            2009..=2010 => IsaAllowance::split(dec!(3600), dec!(7200)),
            2000..=2008 => IsaAllowance::split(dec!(3000), dec!(7000)),
            _ => return None,
        };
        Some(allowance)
    }
}

impl std::fmt::Display for TaxYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl Serialize for TaxYear {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// ISA subscription limits for one tax year.
///
/// `stocks` is the Stocks & Shares limit, which has always equalled the
/// overall limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsaAllowance {
    pub cash: Decimal,
    pub stocks: Decimal,
    pub total: Decimal,
}

impl IsaAllowance {
    fn flat(amount: Decimal) -> Self {
        IsaAllowance {
            cash: amount,
            stocks: amount,
            total: amount,
        }
    }

    fn split(cash: Decimal, total: Decimal) -> Self {
        IsaAllowance {
            cash,
            stocks: total,
            total,
        }
    }
}
