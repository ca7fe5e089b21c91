//! Crypto accounting: double-entry ledger entries for receives, rewards and
//! taxable disposals.
//!
//! Pure domain logic only: no IO beyond loading configuration, no persistence,
//! no price feeds. Callers supply priced asset legs (and, for disposals, the
//! cost-basis lots being closed) and get back ordered entry records.

pub mod asset;
pub mod balances;
pub mod config;
pub mod entry;
pub mod entry_config;
pub mod journal;
pub mod transaction;

pub use asset::{AssetLeg, AssetLegs, Position};
pub use balances::BalanceDeltas;
pub use config::{Account, ChartOfAccounts, LedgerConfig};
pub use entry::{EntryBuilder, LedgerEntry};
pub use entry_config::{AccountCategory, AccountClass, AccountKind, EntryTemplate, Side};
pub use journal::{AccountBalance, Journal, JournalEntry, JournalLine, TrialBalance};
pub use transaction::{
    AffectedBalances, BaseTx, ClosingLot, ClosingSchedule, LedgerTransaction, Receive, Reward,
    Sell, TaxableTx, TxType,
};
