//! Entity trait: identity that survives across the records derived from it.

/// Entity marker + minimal interface.
///
/// Transactions are entities: every ledger entry and journal posting built
/// from one refers back to it by id.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
