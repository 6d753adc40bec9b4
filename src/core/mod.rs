pub mod classify;
pub mod contributions;
pub mod ledger;
pub mod review;
pub mod uk;
pub mod warnings;

// Flat public surface for domain types and functions.
#[allow(unused_imports)]
pub use classify::{classify, is_contribution_source, is_isa_description, AccountClass, IsaKind};
#[allow(unused_imports)]
pub use contributions::{
    contribution_totals, deposits, isa_accounts, ContributionTotals, Deposit, IsaAccount,
};
#[allow(unused_imports)]
pub use ledger::{Account, AccountId, AccountType, Ledger, LedgerError, Split, Transaction};
#[allow(unused_imports)]
pub use review::{review_isa_accounts, AllowanceCategory, AllowanceRow, IsaReview, YearReview};
#[allow(unused_imports)]
pub use uk::{IsaAllowance, TaxYear};
#[allow(unused_imports)]
pub use warnings::Warning;
