//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Catalog snapshots (locations, products) are compared by identity when the
/// transfer workflow filters or deduplicates them, never by their other fields.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;

    /// True when both entities carry the same identifier.
    fn same_identity_as<O>(&self, other: &O) -> bool
    where
        O: Entity<Id = Self::Id>,
    {
        self.id() == other.id()
    }
}
