//! Ledger configuration: chart of accounts and balance tolerance.
//!
//! Loaded from JSON; the file is named by `COINBOOK_LEDGER_CONFIG`.

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use coinbook_core::{DomainError, DomainResult};

use crate::entry_config::{AccountCategory, AccountKind};

/// Account identifier + metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Account {
    pub code: String, // e.g. "1100"
    pub name: String, // e.g. "Crypto Assets"
    pub kind: AccountKind,
}

impl Account {
    pub fn new(code: impl Into<String>, name: impl Into<String>, kind: AccountKind) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            kind,
        }
    }
}

/// Ledger account each category posts to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartOfAccounts(BTreeMap<AccountCategory, Account>);

impl Default for ChartOfAccounts {
    fn default() -> Self {
        let account = |category: AccountCategory, code: &str, name: &str| {
            (category, Account::new(code, name, category.kind()))
        };
        Self(BTreeMap::from([
            account(AccountCategory::Cash, "1000", "Cash"),
            account(AccountCategory::Crypto, "1100", "Crypto Assets"),
            account(AccountCategory::CryptoFairValueAdj, "1150", "Crypto Fair Value Adjustment"),
            account(AccountCategory::TransfersIn, "3100", "Transfers In"),
            account(AccountCategory::UnrealizedGainLoss, "3200", "Unrealized Gain/Loss"),
            account(AccountCategory::Rewards, "4100", "Reward Income"),
            account(AccountCategory::RealizedGainLoss, "4200", "Realized Gain/Loss"),
            account(AccountCategory::Fees, "5100", "Transaction Fees"),
        ]))
    }
}

impl ChartOfAccounts {
    pub fn account(&self, category: AccountCategory) -> DomainResult<&Account> {
        self.0
            .get(&category)
            .ok_or_else(|| DomainError::not_found(format!("account for category {}", category)))
    }

    /// Replaces the account a category posts to.
    pub fn with_account(mut self, category: AccountCategory, account: Account) -> Self {
        self.0.insert(category, account);
        self
    }

    fn missing(&self) -> Vec<AccountCategory> {
        AccountCategory::ALL
            .into_iter()
            .filter(|c| !self.0.contains_key(c))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub chart_of_accounts: ChartOfAccounts,
    /// Largest debit/credit difference still treated as balanced.
    pub balance_tolerance: Decimal,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            chart_of_accounts: ChartOfAccounts::default(),
            balance_tolerance: Decimal::ZERO,
        }
    }
}

impl LedgerConfig {
    pub const ENV_VAR: &'static str = "COINBOOK_LEDGER_CONFIG";

    pub fn from_json(json: &str) -> DomainResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DomainError::config(e.to_string()))?;
        config.validate()
    }

    pub fn from_path(path: impl AsRef<Path>) -> DomainResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| DomainError::config(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Reads the file named by [`Self::ENV_VAR`], or the defaults when unset.
    pub fn from_env() -> DomainResult<Self> {
        match std::env::var(Self::ENV_VAR) {
            Ok(path) => Self::from_path(path),
            Err(_) => {
                tracing::warn!("{} not set; using default chart of accounts", Self::ENV_VAR);
                Ok(Self::default())
            }
        }
    }

    fn validate(self) -> DomainResult<Self> {
        if self.balance_tolerance.is_sign_negative() {
            return Err(DomainError::config("balance_tolerance must not be negative"));
        }
        let missing = self.chart_of_accounts.missing();
        if !missing.is_empty() {
            let names: Vec<_> = missing.iter().map(|c| c.as_str()).collect();
            return Err(DomainError::config(format!(
                "chart of accounts is missing {}",
                names.join(", ")
            )));
        }
        Ok(self)
    }
}
