//! Transaction kinds and the shared entry-building base.

mod base;
mod receive;
mod reward;
mod sell;
mod taxable;

pub use base::{BaseTx, TemplateGroups};
pub use receive::Receive;
pub use reward::Reward;
pub use sell::Sell;
pub use taxable::{
    CLOSE_CRYPTO, CLOSE_FAIR_VALUE, CLOSE_REALIZED_GAINS, CLOSE_UNREALIZED_GAINS, ClosingLot,
    ClosingSchedule, TaxableTx,
};

use core::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coinbook_core::{DomainError, DomainResult, Entity, TransactionId};

use crate::asset::AssetLegs;
use crate::balances::BalanceDeltas;
use crate::entry::LedgerEntry;

/// Economic kind of a transaction; also the `type` tag on its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Buy,
    Sell,
    Trade,
    Send,
    Receive,
    Reward,
    Deposit,
    Withdrawal,
    /// Tag for gain/loss arising from disposing of a fee asset.
    Fee,
}

impl TxType {
    pub const fn as_str(self) -> &'static str {
        match self {
            TxType::Buy => "buy",
            TxType::Sell => "sell",
            TxType::Trade => "trade",
            TxType::Send => "send",
            TxType::Receive => "receive",
            TxType::Reward => "reward",
            TxType::Deposit => "deposit",
            TxType::Withdrawal => "withdrawal",
            TxType::Fee => "fee",
        }
    }
}

impl core::fmt::Display for TxType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" => Ok(TxType::Buy),
            "sell" => Ok(TxType::Sell),
            "trade" => Ok(TxType::Trade),
            "send" | "transfer_out" => Ok(TxType::Send),
            "receive" | "transfer_in" => Ok(TxType::Receive),
            "reward" => Ok(TxType::Reward),
            "deposit" => Ok(TxType::Deposit),
            "withdrawal" => Ok(TxType::Withdrawal),
            "fee" => Ok(TxType::Fee),
            _ => Err(DomainError::validation(format!(
                "'{}' is not a valid transaction type",
                s
            ))),
        }
    }
}

/// A transaction that can be turned into ledger entries.
pub trait LedgerTransaction: Entity<Id = TransactionId> {
    fn tx_type(&self) -> TxType;

    fn occurred_at(&self) -> DateTime<Utc>;

    fn legs(&self) -> &AssetLegs;

    /// Entries in posting order.
    fn entries(&self) -> DomainResult<Vec<LedgerEntry>>;
}

/// Holdings change a transaction causes, per asset symbol.
pub trait AffectedBalances {
    fn affected_balances(&self) -> BalanceDeltas;
}
