//! Value object trait: equality by value, not identity.
//!
//! Asset legs, closing lots and ledger entries have **no identity** - they are
//! defined entirely by their field values.

/// Marker trait for value objects.
///
/// Value objects are **immutable** once built and **compared by value**. To
/// "modify" one, build a new one (see the entry builder in the accounting crate).
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct ClosingLot {
///     open_price: Decimal,
///     quantity: Decimal,
/// }
///
/// impl ValueObject for ClosingLot {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
