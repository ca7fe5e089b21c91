//! Entry template registry.
//!
//! Static account classifications and the side-tagged templates built from
//! them. Everything here is `const`, shared read-only, never mutated.

use serde::{Deserialize, Serialize};

/// High-level account kind (determines normal balance side).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Asset,
    Liability,
    Equity,
    Revenue,
    Expense,
}

/// Bookkeeping concept an entry is posted against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountCategory {
    Crypto,
    Cash,
    CryptoFairValueAdj,
    TransfersIn,
    UnrealizedGainLoss,
    Rewards,
    RealizedGainLoss,
    Fees,
}

impl AccountCategory {
    pub const ALL: [AccountCategory; 8] = [
        AccountCategory::Crypto,
        AccountCategory::Cash,
        AccountCategory::CryptoFairValueAdj,
        AccountCategory::TransfersIn,
        AccountCategory::UnrealizedGainLoss,
        AccountCategory::Rewards,
        AccountCategory::RealizedGainLoss,
        AccountCategory::Fees,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            AccountCategory::Crypto => "CRYPTO",
            AccountCategory::Cash => "CASH",
            AccountCategory::CryptoFairValueAdj => "CRYPTO_FAIR_VALUE_ADJ",
            AccountCategory::TransfersIn => "TRANSFERS_IN",
            AccountCategory::UnrealizedGainLoss => "UNREALIZED_GAIN_LOSS",
            AccountCategory::Rewards => "REWARDS",
            AccountCategory::RealizedGainLoss => "REALIZED_GAIN_LOSS",
            AccountCategory::Fees => "FEES",
        }
    }

    /// Kind of account this category is booked to.
    pub const fn kind(self) -> AccountKind {
        match self {
            AccountCategory::Crypto
            | AccountCategory::Cash
            | AccountCategory::CryptoFairValueAdj => AccountKind::Asset,
            AccountCategory::TransfersIn | AccountCategory::UnrealizedGainLoss => {
                AccountKind::Equity
            }
            AccountCategory::Rewards | AccountCategory::RealizedGainLoss => AccountKind::Revenue,
            AccountCategory::Fees => AccountKind::Expense,
        }
    }
}

impl core::fmt::Display for AccountCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger side of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Debit,
    Credit,
}

impl Side {
    pub fn is_debit(self) -> bool {
        matches!(self, Side::Debit)
    }
}

/// Account classification fields carried by every entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountClass {
    pub account: AccountCategory,
    pub account_type: AccountKind,
}

impl AccountClass {
    pub const fn of(account: AccountCategory) -> Self {
        Self {
            account,
            account_type: account.kind(),
        }
    }
}

pub const CRYPTO: AccountClass = AccountClass::of(AccountCategory::Crypto);
pub const CASH: AccountClass = AccountClass::of(AccountCategory::Cash);
pub const CRYPTO_FAIR_VALUE_ADJ: AccountClass =
    AccountClass::of(AccountCategory::CryptoFairValueAdj);
pub const TRANSFERS_IN: AccountClass = AccountClass::of(AccountCategory::TransfersIn);
pub const UNREALIZED_GAIN_LOSS: AccountClass =
    AccountClass::of(AccountCategory::UnrealizedGainLoss);
pub const REWARDS: AccountClass = AccountClass::of(AccountCategory::Rewards);
pub const REALIZED_GAIN_LOSS: AccountClass = AccountClass::of(AccountCategory::RealizedGainLoss);
pub const FEES: AccountClass = AccountClass::of(AccountCategory::Fees);

/// Partial entry record: a side plus an account classification.
///
/// Transaction kinds merge these with leg-specific numbers through
/// [`EntryBuilder`](crate::entry::EntryBuilder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryTemplate {
    pub side: Side,
    #[serde(flatten)]
    pub class: AccountClass,
}

impl EntryTemplate {
    pub const fn new(side: Side, class: AccountClass) -> Self {
        Self { side, class }
    }

    pub const fn debit(class: AccountClass) -> Self {
        Self::new(Side::Debit, class)
    }

    pub const fn credit(class: AccountClass) -> Self {
        Self::new(Side::Credit, class)
    }
}

/// Registry lookup: template for `side` posted against `category`.
pub const fn template(side: Side, category: AccountCategory) -> EntryTemplate {
    EntryTemplate::new(side, AccountClass::of(category))
}
