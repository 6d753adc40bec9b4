use super::uk::TaxYear;
use rust_decimal::Decimal;
use serde::Serialize;

/// Domain warning types emitted while reviewing allowances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Warning {
    /// Contributions in a category went over the allowance for the year.
    AllowanceExceeded {
        tax_year: TaxYear,
        category: String,
        allowance: Decimal,
        contributions: Decimal,
    },
    /// Deposits were found in a year before ISAs existed.
    NoAllowance { tax_year: TaxYear },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::AllowanceExceeded {
                tax_year,
                category,
                allowance,
                contributions,
            } => write!(
                f,
                "{tax_year}: {category} contributions £{contributions:.2} exceed allowance £{allowance:.2}"
            ),
            Warning::NoAllowance { tax_year } => {
                write!(f, "{tax_year}: no ISA allowance for this tax year")
            }
        }
    }
}
