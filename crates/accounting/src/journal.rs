//! Journal posting and trial balance over posted entries.
//!
//! Posting resolves each ledger entry against the chart of accounts and
//! rejects entry sets whose debits and credits do not match.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use coinbook_core::{DomainError, DomainResult, JournalId, TransactionId};

use crate::config::{Account, LedgerConfig};
use crate::entry::LedgerEntry;
use crate::entry_config::AccountKind;
use crate::transaction::{LedgerTransaction, TxType};

/// One posted line: a ledger entry and the account it landed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalLine {
    pub account: Account,
    pub entry: LedgerEntry,
}

/// A balanced set of lines posted for one transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub journal_id: JournalId,
    pub transaction_id: TransactionId,
    pub tx_type: TxType,
    pub occurred_at: DateTime<Utc>,
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    pub fn debit_total(&self) -> Decimal {
        totals(self.lines.iter().map(|l| &l.entry)).0
    }

    pub fn credit_total(&self) -> Decimal {
        totals(self.lines.iter().map(|l| &l.entry)).1
    }
}

/// (debit total, credit total) of entry values.
fn totals<'a>(entries: impl IntoIterator<Item = &'a LedgerEntry>) -> (Decimal, Decimal) {
    entries
        .into_iter()
        .fold((Decimal::ZERO, Decimal::ZERO), |(debit, credit), e| {
            if e.side.is_debit() {
                (debit + e.value, credit)
            } else {
                (debit, credit + e.value)
            }
        })
}

#[derive(Debug, Clone, Default)]
pub struct Journal {
    config: LedgerConfig,
}

impl Journal {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Posts every entry `tx` produces.
    pub fn post<T: LedgerTransaction>(&self, tx: &T) -> DomainResult<JournalEntry> {
        let entries = tx.entries()?;
        self.post_entries(*tx.id(), tx.tx_type(), tx.occurred_at(), entries)
    }

    pub fn post_entries(
        &self,
        transaction_id: TransactionId,
        tx_type: TxType,
        occurred_at: DateTime<Utc>,
        entries: Vec<LedgerEntry>,
    ) -> DomainResult<JournalEntry> {
        if entries.is_empty() {
            return Err(DomainError::validation("journal entry must have lines"));
        }

        let (debit_total, credit_total) = totals(&entries);
        if (debit_total - credit_total).abs() > self.config.balance_tolerance {
            tracing::debug!(
                %transaction_id,
                %debit_total,
                %credit_total,
                "rejected unbalanced journal entry"
            );
            return Err(DomainError::invariant(format!(
                "debits must equal credits (debits={}, credits={})",
                debit_total, credit_total
            )));
        }

        let chart = &self.config.chart_of_accounts;
        let lines = entries
            .into_iter()
            .map(|entry| -> DomainResult<JournalLine> {
                let account = chart.account(entry.class.account)?.clone();
                Ok(JournalLine { account, entry })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        tracing::debug!(%transaction_id, %tx_type, lines = lines.len(), "posted journal entry");
        Ok(JournalEntry {
            journal_id: JournalId::new(),
            transaction_id,
            tx_type,
            occurred_at,
            lines,
        })
    }
}

/// Running balance of one account.
///
/// Balances are signed (debit-positive convention).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_code: String,
    pub account_name: String,
    pub kind: AccountKind,
    pub balance: Decimal,
}

/// Per-account balances over posted journal entries, keyed by account code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrialBalance {
    balances: BTreeMap<String, AccountBalance>,
}

impl TrialBalance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a JournalEntry>) -> Self {
        let mut tb = Self::new();
        for entry in entries {
            tb.apply(entry);
        }
        tb
    }

    pub fn apply(&mut self, entry: &JournalEntry) {
        for line in &entry.lines {
            let rm = self
                .balances
                .entry(line.account.code.clone())
                .or_insert_with(|| AccountBalance {
                    account_code: line.account.code.clone(),
                    account_name: line.account.name.clone(),
                    kind: line.account.kind,
                    balance: Decimal::ZERO,
                });
            rm.balance += line.entry.signed_value();
        }
    }

    pub fn get(&self, code: &str) -> Option<&AccountBalance> {
        self.balances.get(code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &AccountBalance> + '_ {
        self.balances.values()
    }

    /// Sum of all balances; zero when every applied entry was balanced.
    pub fn net(&self) -> Decimal {
        self.balances.values().map(|b| b.balance).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetLeg, AssetLegs, Position};
    use crate::entry::EntryBuilder;
    use crate::entry_config::{CASH, CRYPTO, EntryTemplate};
    use crate::transaction::{ClosingLot, ClosingSchedule, Reward, Sell};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn entry(template: EntryTemplate, value: Decimal) -> LedgerEntry {
        EntryBuilder::new(template, Position::Base, "BTC", TxType::Buy)
            .value(value)
            .build()
    }

    #[test]
    fn posts_balanced_reward() {
        let legs = AssetLegs::new(AssetLeg::crypto("ETH", dec!(0.1), dec!(2000)));
        let reward = Reward::new(legs, Utc::now());
        let posted = Journal::default().post(&reward).unwrap();

        assert_eq!(posted.transaction_id, *coinbook_core::Entity::id(&reward));
        assert_eq!(posted.tx_type, TxType::Reward);
        assert_eq!(posted.lines.len(), 2);
        assert_eq!(posted.lines[0].account.code, "4100");
        assert_eq!(posted.lines[1].account.code, "1100");
        assert_eq!(posted.debit_total(), dec!(200));
        assert_eq!(posted.credit_total(), dec!(200));
    }

    #[test]
    fn unbalanced_entry_is_rejected() {
        let entries = vec![
            entry(EntryTemplate::debit(CRYPTO), dec!(100)),
            entry(EntryTemplate::credit(CASH), dec!(90)),
        ];
        let err = Journal::default()
            .post_entries(TransactionId::new(), TxType::Buy, Utc::now(), entries)
            .unwrap_err();
        match err {
            DomainError::InvariantViolation(msg) if msg.contains("debits must equal credits") => {}
            _ => panic!("Expected invariant violation for unbalanced entry"),
        }
    }

    #[test]
    fn empty_entry_is_rejected() {
        let err = Journal::default()
            .post_entries(TransactionId::new(), TxType::Buy, Utc::now(), Vec::new())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn tolerance_absorbs_rounding() {
        let entries = vec![
            entry(EntryTemplate::debit(CRYPTO), dec!(100.004)),
            entry(EntryTemplate::credit(CASH), dec!(100)),
        ];
        let journal = Journal::new(LedgerConfig {
            balance_tolerance: dec!(0.01),
            ..LedgerConfig::default()
        });
        assert!(
            journal
                .post_entries(TransactionId::new(), TxType::Buy, Utc::now(), entries)
                .is_ok()
        );
    }

    #[test]
    fn trial_balance_tracks_gain_accounts() {
        let legs = AssetLegs::new(AssetLeg::crypto("BTC", dec!(2), dec!(150)))
            .with_quote(AssetLeg::fiat("USD", dec!(300), dec!(1)));
        let schedule = ClosingSchedule::new().lot(Position::Base, (dec!(100), dec!(2)));
        let sell = Sell::new(legs, schedule, Utc::now()).unwrap();
        let posted = Journal::default().post(&sell).unwrap();

        let tb = TrialBalance::from_entries([&posted]);
        assert_eq!(tb.net(), Decimal::ZERO);
        assert_eq!(tb.get("1000").unwrap().balance, dec!(300));
        assert_eq!(tb.get("1100").unwrap().balance, dec!(-200));
        assert_eq!(tb.get("1150").unwrap().balance, dec!(100));
        assert_eq!(tb.get("3200").unwrap().balance, dec!(-100));
        assert_eq!(tb.get("4200").unwrap().balance, dec!(-100));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any sell whose lots cover the base quantity posts, and the
        /// trial balance over the posting nets to zero.
        #[test]
        fn covered_sells_post_balanced(
            lots in prop::collection::vec((1i64..100_000i64, 1i64..1_000i64), 1..6),
            close_cents in 1i64..100_000i64,
        ) {
            let close_price = Decimal::new(close_cents, 2);
            let schedule: ClosingSchedule = lots
                .iter()
                .map(|(price, qty)| {
                    let lot = ClosingLot::new(Decimal::new(*price, 2), Decimal::new(*qty, 3));
                    (Position::Base, lot)
                })
                .collect();
            let qty = schedule.total_quantity(Position::Base);
            let proceeds = qty * close_price;
            let legs = AssetLegs::new(AssetLeg::crypto("BTC", qty, close_price))
                .with_quote(AssetLeg::fiat("USD", proceeds, Decimal::ONE));

            let sell = Sell::new(legs, schedule, Utc::now()).unwrap();
            let posted = Journal::default().post(&sell).unwrap();
            prop_assert_eq!(posted.debit_total(), posted.credit_total());
            prop_assert_eq!(TrialBalance::from_entries([&posted]).net(), Decimal::ZERO);
        }
    }
}
