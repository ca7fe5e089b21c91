use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use coinbook_core::{DomainError, DomainResult, Entity, TransactionId};

use crate::asset::{AssetLeg, AssetLegs, Position};
use crate::balances::BalanceDeltas;
use crate::entry::LedgerEntry;
use crate::entry_config::{AccountClass, CASH, CRYPTO, EntryTemplate, FEES};

use super::{AffectedBalances, BaseTx, ClosingSchedule, LedgerTransaction, TaxableTx, TxType};

const FEE_EXPENSE: EntryTemplate = EntryTemplate::debit(FEES);

/// Holdings account a leg lives in.
fn holding_account(leg: &AssetLeg) -> AccountClass {
    if leg.is_fiat { CASH } else { CRYPTO }
}

/// Disposal of the base asset for the quote asset.
///
/// Entries: closing entries for every scheduled lot, the proceeds debit on
/// the quote leg, then the fee expense (plus, for a non-taxable fee, the
/// credit removing the fee holding at its current value).
#[derive(Debug, Clone, PartialEq)]
pub struct Sell {
    taxable: TaxableTx,
    schedule: ClosingSchedule,
}

impl Sell {
    /// Fails when `legs` has no quote leg to book the proceeds against, or
    /// when `schedule` closes lots of anything but the base and a taxable fee.
    pub fn new(
        legs: AssetLegs,
        schedule: ClosingSchedule,
        occurred_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        legs.require(Position::Quote)?;
        let taxable = TaxableTx::new(TxType::Sell, legs, occurred_at);
        if let Some(position) = schedule
            .positions()
            .find(|p| *p != Position::Base && !taxable.is_taxable(*p))
        {
            return Err(DomainError::validation(format!(
                "sell cannot close lots of non-taxable leg `{}`",
                position
            )));
        }
        Ok(Self { taxable, schedule })
    }

    pub fn with_id(self, id: TransactionId) -> Self {
        Self {
            taxable: TaxableTx::from_base(self.taxable.base().clone().with_id(id)),
            schedule: self.schedule,
        }
    }

    pub fn taxable(&self) -> &TaxableTx {
        &self.taxable
    }

    pub fn schedule(&self) -> &ClosingSchedule {
        &self.schedule
    }

    fn base(&self) -> &BaseTx {
        self.taxable.base()
    }

    fn proceeds_entry(&self) -> DomainResult<LedgerEntry> {
        let quote = self.base().asset(Position::Quote)?;
        let template = EntryTemplate::debit(holding_account(quote));
        Ok(self.base().create_entry(template, Position::Quote)?.build())
    }

    fn fee_entries(&self) -> DomainResult<Vec<LedgerEntry>> {
        let Some(fee) = self.base().legs().fee() else {
            return Ok(Vec::new());
        };

        let mut entries = vec![
            self.base()
                .create_entry(FEE_EXPENSE, Position::Fee)?
                .tx_type(TxType::Fee)
                .quantity(Decimal::ZERO)
                .build(),
        ];
        // Taxable fees leave the books through their closing lots instead.
        if !self.taxable.is_taxable(Position::Fee) {
            let template = EntryTemplate::credit(holding_account(fee));
            entries.push(
                self.base()
                    .create_entry(template, Position::Fee)?
                    .tx_type(TxType::Fee)
                    .build(),
            );
        }
        Ok(entries)
    }
}

impl Entity for Sell {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        self.taxable.id()
    }
}

impl LedgerTransaction for Sell {
    fn tx_type(&self) -> TxType {
        self.base().tx_type()
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        self.base().occurred_at()
    }

    fn legs(&self) -> &AssetLegs {
        self.base().legs()
    }

    fn entries(&self) -> DomainResult<Vec<LedgerEntry>> {
        let mut entries = self.taxable.closing_entries(&self.schedule)?;
        entries.push(self.proceeds_entry()?);
        entries.extend(self.fee_entries()?);
        Ok(entries)
    }
}

impl AffectedBalances for Sell {
    fn affected_balances(&self) -> BalanceDeltas {
        let legs = self.base().legs();
        let mut deltas = BalanceDeltas::new();
        deltas.add(&legs.base().symbol, -legs.base().quantity);
        if let Some(quote) = legs.quote() {
            deltas.add(&quote.symbol, quote.quantity);
        }
        if let Some(fee) = legs.fee() {
            deltas.add(&fee.symbol, -fee.quantity);
        }
        deltas
    }
}
