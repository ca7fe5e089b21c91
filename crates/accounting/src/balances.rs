//! Per-symbol holdings deltas handed to the external balance tracker.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::asset::AssetLegs;

/// Signed quantity change per asset symbol.
///
/// Deltas for the same symbol accumulate; a base and fee in the same asset
/// net out rather than overwrite each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BalanceDeltas(BTreeMap<String, Decimal>);

impl BalanceDeltas {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inflow of the base leg, outflow of any fee leg.
    pub fn inflow(legs: &AssetLegs) -> Self {
        let mut deltas = Self::new();
        deltas.add(&legs.base().symbol, legs.base().quantity);
        if let Some(fee) = legs.fee() {
            deltas.add(&fee.symbol, -fee.quantity);
        }
        deltas
    }

    pub fn add(&mut self, symbol: &str, delta: Decimal) {
        *self.0.entry(symbol.to_string()).or_default() += delta;
    }

    pub fn merge(&mut self, other: &BalanceDeltas) {
        for (symbol, delta) in other.iter() {
            self.add(symbol, delta);
        }
    }

    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.0.get(symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> + '_ {
        self.0.iter().map(|(s, d)| (s.as_str(), *d))
    }
}
