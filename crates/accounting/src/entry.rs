//! Ledger entries and the builder that materializes them from templates.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use coinbook_core::ValueObject;

use crate::asset::{AssetLeg, Position};
use crate::entry_config::{AccountClass, EntryTemplate, Side};
use crate::transaction::TxType;

/// One side of a double-entry record, ready for posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub side: Side,
    #[serde(flatten)]
    pub class: AccountClass,
    /// Leg of the source transaction this entry books.
    pub mkt: Position,
    pub symbol: String,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    pub quantity: Decimal,
    /// Opening (cost-basis) price.
    pub quote: Decimal,
    /// Current price; only set on closing entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close_quote: Option<Decimal>,
    pub value: Decimal,
}

impl ValueObject for LedgerEntry {}

impl LedgerEntry {
    /// Value with debit positive, credit negative.
    pub fn signed_value(&self) -> Decimal {
        if self.side.is_debit() {
            self.value
        } else {
            -self.value
        }
    }
}

/// Field overrides merged over a template.
///
/// Every setter replaces whatever an earlier call (or the seeding
/// constructor) wrote, so the last write wins.
#[derive(Debug, Clone)]
#[must_use]
pub struct EntryBuilder {
    template: EntryTemplate,
    mkt: Position,
    symbol: String,
    tx_type: TxType,
    quantity: Decimal,
    quote: Decimal,
    close_quote: Option<Decimal>,
    value: Decimal,
}

impl EntryBuilder {
    /// Numeric fields start at zero.
    pub fn new(
        template: EntryTemplate,
        mkt: Position,
        symbol: impl Into<String>,
        tx_type: TxType,
    ) -> Self {
        Self {
            template,
            mkt,
            symbol: symbol.into(),
            tx_type,
            quantity: Decimal::ZERO,
            quote: Decimal::ZERO,
            close_quote: None,
            value: Decimal::ZERO,
        }
    }

    /// Seeded with the leg's quantity, price and market value.
    pub fn for_leg(
        template: EntryTemplate,
        mkt: Position,
        leg: &AssetLeg,
        tx_type: TxType,
    ) -> Self {
        Self::new(template, mkt, &leg.symbol, tx_type)
            .quantity(leg.quantity)
            .quote(leg.usd_price)
            .value(leg.value())
    }

    pub fn side(mut self, side: Side) -> Self {
        self.template.side = side;
        self
    }

    pub fn tx_type(mut self, tx_type: TxType) -> Self {
        self.tx_type = tx_type;
        self
    }

    pub fn quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn quote(mut self, quote: Decimal) -> Self {
        self.quote = quote;
        self
    }

    pub fn close_quote(mut self, close_quote: Decimal) -> Self {
        self.close_quote = Some(close_quote);
        self
    }

    pub fn value(mut self, value: Decimal) -> Self {
        self.value = value;
        self
    }

    pub fn build(self) -> LedgerEntry {
        LedgerEntry {
            side: self.template.side,
            class: self.template.class,
            mkt: self.mkt,
            symbol: self.symbol,
            tx_type: self.tx_type,
            quantity: self.quantity,
            quote: self.quote,
            close_quote: self.close_quote,
            value: self.value,
        }
    }
}
