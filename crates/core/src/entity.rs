//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Used for records that have an identity but no state machine of their own
/// (health checks, inventory units).
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
