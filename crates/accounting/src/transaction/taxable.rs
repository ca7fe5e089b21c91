use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use coinbook_core::{DomainResult, Entity, TransactionId, ValueObject};

use crate::asset::{AssetLegs, Position};
use crate::entry::{EntryBuilder, LedgerEntry};
use crate::entry_config::{
    CRYPTO, CRYPTO_FAIR_VALUE_ADJ, EntryTemplate, REALIZED_GAIN_LOSS, UNREALIZED_GAIN_LOSS,
};

use super::{BaseTx, TxType};

/// Removes the lot's original cost basis.
pub const CLOSE_CRYPTO: EntryTemplate = EntryTemplate::credit(CRYPTO);
/// Reverses the mark-to-market adjustment accrued on the lot.
pub const CLOSE_FAIR_VALUE: EntryTemplate = EntryTemplate::credit(CRYPTO_FAIR_VALUE_ADJ);
/// Takes the accrued gain out of unrealized...
pub const CLOSE_UNREALIZED_GAINS: EntryTemplate = EntryTemplate::debit(UNREALIZED_GAIN_LOSS);
/// ...and recognizes it as realized.
pub const CLOSE_REALIZED_GAINS: EntryTemplate = EntryTemplate::credit(REALIZED_GAIN_LOSS);

/// A historical cost-basis layer of a position being disposed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingLot {
    pub open_price: Decimal,
    pub quantity: Decimal,
}

impl ValueObject for ClosingLot {}

impl ClosingLot {
    pub fn new(open_price: Decimal, quantity: Decimal) -> Self {
        Self {
            open_price,
            quantity,
        }
    }

    pub fn open_value(&self) -> Decimal {
        self.open_price * self.quantity
    }
}

impl From<(Decimal, Decimal)> for ClosingLot {
    fn from((open_price, quantity): (Decimal, Decimal)) -> Self {
        Self::new(open_price, quantity)
    }
}

/// Lots to close, grouped by position.
///
/// Positions keep the order they were first added in; lots keep insertion
/// order within their position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "Vec<(Position, Vec<ClosingLot>)>",
    into = "Vec<(Position, Vec<ClosingLot>)>"
)]
pub struct ClosingSchedule {
    groups: Vec<(Position, Vec<ClosingLot>)>,
}

impl ClosingSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lot(mut self, position: Position, lot: impl Into<ClosingLot>) -> Self {
        self.push(position, lot);
        self
    }

    pub fn push(&mut self, position: Position, lot: impl Into<ClosingLot>) {
        let lot = lot.into();
        match self.groups.iter_mut().find(|(p, _)| *p == position) {
            Some((_, lots)) => lots.push(lot),
            None => self.groups.push((position, vec![lot])),
        }
    }

    pub fn lots(&self, position: Position) -> &[ClosingLot] {
        self.groups
            .iter()
            .find(|(p, _)| *p == position)
            .map(|(_, lots)| lots.as_slice())
            .unwrap_or(&[])
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.groups.iter().map(|(p, _)| *p)
    }

    /// Every lot, in closing order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &ClosingLot)> + '_ {
        self.groups
            .iter()
            .flat_map(|(p, lots)| lots.iter().map(move |lot| (*p, lot)))
    }

    pub fn total_quantity(&self, position: Position) -> Decimal {
        self.lots(position).iter().map(|l| l.quantity).sum()
    }

    /// Number of lots across all positions.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, lots)| lots.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Groups repeating a position merge into the first one.
impl From<Vec<(Position, Vec<ClosingLot>)>> for ClosingSchedule {
    fn from(groups: Vec<(Position, Vec<ClosingLot>)>) -> Self {
        groups
            .into_iter()
            .flat_map(|(p, lots)| lots.into_iter().map(move |lot| (p, lot)))
            .collect()
    }
}

impl From<ClosingSchedule> for Vec<(Position, Vec<ClosingLot>)> {
    fn from(schedule: ClosingSchedule) -> Self {
        schedule.groups
    }
}

impl FromIterator<(Position, ClosingLot)> for ClosingSchedule {
    fn from_iter<I: IntoIterator<Item = (Position, ClosingLot)>>(iter: I) -> Self {
        let mut schedule = Self::new();
        for (position, lot) in iter {
            schedule.push(position, lot);
        }
        schedule
    }
}

/// A transaction that disposes of assets and so realizes gains.
///
/// Each concrete disposal (see [`Sell`](super::Sell)) opens whatever it
/// receives itself; this type only closes what leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct TaxableTx {
    base: BaseTx,
    taxable_assets: Vec<Position>,
}

impl TaxableTx {
    pub fn new(tx_type: TxType, legs: AssetLegs, occurred_at: DateTime<Utc>) -> Self {
        Self::from_base(BaseTx::new(tx_type, legs, occurred_at))
    }

    pub fn from_base(base: BaseTx) -> Self {
        // Stablecoin fees move value without a gain or loss.
        let taxable_assets = match base.legs().fee() {
            Some(fee) if !fee.is_stable => vec![Position::Fee],
            _ => Vec::new(),
        };
        Self {
            base,
            taxable_assets,
        }
    }

    pub fn base(&self) -> &BaseTx {
        &self.base
    }

    /// Legs, besides the disposed base, whose disposal is a taxable event.
    pub fn taxable_assets(&self) -> &[Position] {
        &self.taxable_assets
    }

    pub fn is_taxable(&self, position: Position) -> bool {
        self.taxable_assets.contains(&position)
    }

    /// Closing entries for every lot in `schedule`, position by position.
    pub fn closing_entries(&self, schedule: &ClosingSchedule) -> DomainResult<Vec<LedgerEntry>> {
        let mut all_entries = Vec::with_capacity(schedule.len() * 4);
        for (position, lot) in schedule.iter() {
            all_entries.extend(self.create_closing_entry_set(position, lot)?);
        }
        tracing::debug!(
            tx_id = %self.base.id(),
            tx_type = %self.base.tx_type(),
            lots = schedule.len(),
            entries = all_entries.len(),
            "built closing entries"
        );
        Ok(all_entries)
    }

    /// Closes one lot: cost basis, fair-value adjustment, unrealized reversal,
    /// realized recognition, in that order.
    ///
    /// Only the cost-basis entry carries quantity; the other three are value
    /// reclassifications and must not move position totals.
    pub fn create_closing_entry_set(
        &self,
        position: Position,
        lot: &ClosingLot,
    ) -> DomainResult<[LedgerEntry; 4]> {
        let tx_asset = self.base.asset(position)?;
        let closing_val = tx_asset.usd_price * lot.quantity;
        let open_val = lot.open_value();
        let change_val = closing_val - open_val;
        let tx_type = if position == Position::Fee {
            TxType::Fee
        } else {
            self.base.tx_type()
        };

        let entry = |template: EntryTemplate| {
            EntryBuilder::new(template, position, &tx_asset.symbol, tx_type)
                .quote(lot.open_price)
                .close_quote(tx_asset.usd_price)
        };

        Ok([
            entry(CLOSE_CRYPTO).quantity(lot.quantity).value(open_val).build(),
            entry(CLOSE_FAIR_VALUE).value(-change_val).build(),
            entry(CLOSE_UNREALIZED_GAINS).value(-change_val).build(),
            entry(CLOSE_REALIZED_GAINS).value(change_val).build(),
        ])
    }
}

impl Entity for TaxableTx {
    type Id = TransactionId;

    fn id(&self) -> &Self::Id {
        self.base.id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetLeg;
    use crate::entry_config::Side;
    use coinbook_core::DomainError;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn sell(legs: AssetLegs) -> TaxableTx {
        TaxableTx::new(TxType::Sell, legs, Utc::now())
    }

    fn btc_at(price: Decimal) -> AssetLegs {
        AssetLegs::new(AssetLeg::crypto("BTC", dec!(2), price))
    }

    #[test]
    fn closes_base_lot_into_four_entries() {
        let tx = sell(btc_at(dec!(150)));
        let schedule = ClosingSchedule::new().lot(Position::Base, (dec!(100), dec!(2)));
        let entries = tx.closing_entries(&schedule).unwrap();

        let summary: Vec<_> = entries
            .iter()
            .map(|e| (e.side, e.class, e.quantity, e.value))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Side::Credit, CRYPTO, dec!(2), dec!(200)),
                (Side::Credit, CRYPTO_FAIR_VALUE_ADJ, dec!(0), dec!(-100)),
                (Side::Debit, UNREALIZED_GAIN_LOSS, dec!(0), dec!(-100)),
                (Side::Credit, REALIZED_GAIN_LOSS, dec!(0), dec!(100)),
            ]
        );
        for e in &entries {
            assert_eq!(e.mkt, Position::Base);
            assert_eq!(e.symbol, "BTC");
            assert_eq!(e.tx_type, TxType::Sell);
            assert_eq!(e.quote, dec!(100));
            assert_eq!(e.close_quote, Some(dec!(150)));
        }
    }

    #[test]
    fn loss_flips_adjustment_signs() {
        let tx = sell(btc_at(dec!(80)));
        let [basis, fair_value, unrealized, realized] = tx
            .create_closing_entry_set(Position::Base, &ClosingLot::new(dec!(100), dec!(1)))
            .unwrap();
        assert_eq!(basis.value, dec!(100));
        assert_eq!(fair_value.value, dec!(20));
        assert_eq!(unrealized.value, dec!(20));
        assert_eq!(realized.value, dec!(-20));
    }

    #[test]
    fn fee_lots_are_tagged_fee() {
        let legs = btc_at(dec!(150)).with_fee(AssetLeg::crypto("ETH", dec!(0.01), dec!(2000)));
        let tx = sell(legs);
        let schedule = ClosingSchedule::new().lot(Position::Fee, (dec!(1500), dec!(0.01)));
        let entries = tx.closing_entries(&schedule).unwrap();
        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.tx_type == TxType::Fee));
        assert!(entries.iter().all(|e| e.symbol == "ETH"));
        assert_eq!(entries[3].value, dec!(5));
    }

    #[test]
    fn preserves_position_then_lot_order() {
        let legs = btc_at(dec!(150)).with_fee(AssetLeg::crypto("ETH", dec!(0.02), dec!(2000)));
        let schedule = ClosingSchedule::new()
            .lot(Position::Fee, (dec!(1500), dec!(0.01)))
            .lot(Position::Base, (dec!(100), dec!(1)))
            .lot(Position::Fee, (dec!(1600), dec!(0.01)))
            .lot(Position::Base, (dec!(120), dec!(1)));
        let entries = sell(legs).closing_entries(&schedule).unwrap();

        let basis: Vec<_> = entries
            .iter()
            .step_by(4)
            .map(|e| (e.mkt, e.quote))
            .collect();
        assert_eq!(
            basis,
            vec![
                (Position::Fee, dec!(1500)),
                (Position::Fee, dec!(1600)),
                (Position::Base, dec!(100)),
                (Position::Base, dec!(120)),
            ]
        );
    }

    #[test]
    fn same_input_same_output() {
        let tx = sell(btc_at(dec!(150)));
        let schedule = ClosingSchedule::new()
            .lot(Position::Base, (dec!(100), dec!(1)))
            .lot(Position::Base, (dec!(90), dec!(1)));
        assert_eq!(
            tx.closing_entries(&schedule).unwrap(),
            tx.closing_entries(&schedule).unwrap()
        );
    }

    #[test]
    fn empty_schedule_yields_nothing() {
        let tx = sell(btc_at(dec!(150)));
        assert!(tx.closing_entries(&ClosingSchedule::new()).unwrap().is_empty());
    }

    #[test]
    fn lot_for_missing_leg_fails() {
        let tx = sell(btc_at(dec!(150)));
        let schedule = ClosingSchedule::new().lot(Position::Fee, (dec!(1), dec!(1)));
        let err = tx.closing_entries(&schedule).unwrap_err();
        assert_eq!(err, DomainError::not_found("asset leg `fee`"));
    }

    #[test]
    fn stable_fee_is_not_taxable() {
        let stable = sell(btc_at(dec!(1)).with_fee(AssetLeg::stable("USDC", dec!(1), dec!(1))));
        assert!(stable.taxable_assets().is_empty());

        let bnb = AssetLeg::crypto("BNB", dec!(0.01), dec!(300));
        let volatile = sell(btc_at(dec!(1)).with_fee(bnb));
        assert_eq!(volatile.taxable_assets(), &[Position::Fee]);
        assert!(volatile.is_taxable(Position::Fee));

        assert!(sell(btc_at(dec!(1))).taxable_assets().is_empty());
    }

    #[test]
    fn schedule_totals_by_position() {
        let schedule: ClosingSchedule = [
            (Position::Base, ClosingLot::new(dec!(10), dec!(1.5))),
            (Position::Base, ClosingLot::new(dec!(12), dec!(0.5))),
        ]
        .into_iter()
        .collect();
        assert_eq!(schedule.total_quantity(Position::Base), dec!(2));
        assert_eq!(schedule.total_quantity(Position::Fee), dec!(0));
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule.positions().collect::<Vec<_>>(), vec![Position::Base]);
    }

    #[test]
    fn repeated_positions_merge_when_deserialized() {
        let json = serde_json::json!([
            ["base", [{ "open_price": "100", "quantity": "1" }]],
            ["fee", [{ "open_price": "1500", "quantity": "0.01" }]],
            ["base", [{ "open_price": "120", "quantity": "3" }]],
        ]);
        let schedule: ClosingSchedule = serde_json::from_value(json).unwrap();
        assert_eq!(schedule.len(), 3);
        assert_eq!(schedule.total_quantity(Position::Base), dec!(4));
        assert_eq!(
            schedule.positions().collect::<Vec<_>>(),
            vec![Position::Base, Position::Fee]
        );

        let back: ClosingSchedule =
            serde_json::from_value(serde_json::to_value(&schedule).unwrap()).unwrap();
        assert_eq!(back, schedule);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: each entry's value follows its formula, and only the
        /// cost-basis entry carries quantity.
        #[test]
        fn closing_values_follow_formulas(
            open_cents in 0i64..10_000_000i64,
            close_cents in 0i64..10_000_000i64,
            qty_units in 1i64..1_000_000i64,
        ) {
            let open_price = Decimal::new(open_cents, 2);
            let close_price = Decimal::new(close_cents, 2);
            let qty = Decimal::new(qty_units, 4);

            let legs = AssetLegs::new(AssetLeg::crypto("BTC", qty, close_price));
            let tx = TaxableTx::new(TxType::Trade, legs, Utc::now());
            let [basis, fair_value, unrealized, realized] = tx
                .create_closing_entry_set(Position::Base, &ClosingLot::new(open_price, qty))
                .unwrap();

            let change = close_price * qty - open_price * qty;
            prop_assert_eq!(basis.value, open_price * qty);
            prop_assert_eq!(fair_value.value, -change);
            prop_assert_eq!(unrealized.value, -change);
            prop_assert_eq!(realized.value, change);

            prop_assert_eq!(basis.quantity, qty);
            prop_assert!(fair_value.quantity.is_zero());
            prop_assert!(unrealized.quantity.is_zero());
            prop_assert!(realized.quantity.is_zero());
        }
    }
}
