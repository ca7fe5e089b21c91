//! Asset legs of a transaction.

use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use coinbook_core::{DomainError, DomainResult, ValueObject};

/// Named leg of a transaction; also the `mkt` key of the entries it produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Base,
    Quote,
    Fee,
}

impl Position {
    pub const fn as_str(self) -> &'static str {
        match self {
            Position::Base => "base",
            Position::Quote => "quote",
            Position::Fee => "fee",
        }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base" => Ok(Position::Base),
            "quote" => Ok(Position::Quote),
            "fee" => Ok(Position::Fee),
            _ => Err(DomainError::validation(format!(
                "'{}' is not a valid position",
                s
            ))),
        }
    }
}

/// One asset moved by a transaction, priced at the transaction's time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLeg {
    pub symbol: String,
    pub quantity: Decimal,
    /// Current market price in USD.
    pub usd_price: Decimal,
    #[serde(default)]
    pub is_fiat: bool,
    #[serde(default)]
    pub is_stable: bool,
}

impl ValueObject for AssetLeg {}

impl AssetLeg {
    pub fn crypto(symbol: impl Into<String>, quantity: Decimal, usd_price: Decimal) -> Self {
        Self {
            symbol: symbol.into(),
            quantity,
            usd_price,
            is_fiat: false,
            is_stable: false,
        }
    }

    /// Fiat currency; also stable in value.
    pub fn fiat(symbol: impl Into<String>, quantity: Decimal, usd_price: Decimal) -> Self {
        Self {
            is_fiat: true,
            is_stable: true,
            ..Self::crypto(symbol, quantity, usd_price)
        }
    }

    /// Stablecoin: crypto, but pegged.
    pub fn stable(symbol: impl Into<String>, quantity: Decimal, usd_price: Decimal) -> Self {
        Self {
            is_stable: true,
            ..Self::crypto(symbol, quantity, usd_price)
        }
    }

    /// Market value of the whole leg.
    pub fn value(&self) -> Decimal {
        self.quantity * self.usd_price
    }
}

/// The legs owned by a transaction. `base` is always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetLegs {
    base: AssetLeg,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quote: Option<AssetLeg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fee: Option<AssetLeg>,
}

impl AssetLegs {
    pub fn new(base: AssetLeg) -> Self {
        Self {
            base,
            quote: None,
            fee: None,
        }
    }

    pub fn with_quote(mut self, quote: AssetLeg) -> Self {
        self.quote = Some(quote);
        self
    }

    pub fn with_fee(mut self, fee: AssetLeg) -> Self {
        self.fee = Some(fee);
        self
    }

    pub fn base(&self) -> &AssetLeg {
        &self.base
    }

    pub fn quote(&self) -> Option<&AssetLeg> {
        self.quote.as_ref()
    }

    pub fn fee(&self) -> Option<&AssetLeg> {
        self.fee.as_ref()
    }

    pub fn get(&self, position: Position) -> Option<&AssetLeg> {
        match position {
            Position::Base => Some(&self.base),
            Position::Quote => self.quote.as_ref(),
            Position::Fee => self.fee.as_ref(),
        }
    }

    /// Like [`get`](Self::get), but an absent leg is an error.
    pub fn require(&self, position: Position) -> DomainResult<&AssetLeg> {
        self.get(position)
            .ok_or_else(|| DomainError::not_found(format!("asset leg `{}`", position)))
    }

    pub fn contains(&self, position: Position) -> bool {
        self.get(position).is_some()
    }

    /// Present legs in `base`, `quote`, `fee` order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, &AssetLeg)> + '_ {
        [Position::Base, Position::Quote, Position::Fee]
            .into_iter()
            .filter_map(|p| self.get(p).map(|leg| (p, leg)))
    }
}
