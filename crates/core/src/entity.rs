//! Entity trait: identity that survives edits.

/// Entity marker + minimal interface.
pub trait Entity {
    /// Identifier type; stable across state changes.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
