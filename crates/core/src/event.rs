//! Domain event contract shared by all aggregates.

use chrono::{DateTime, Utc};

/// A domain event emitted by an aggregate.
///
/// Events are facts: immutable, versioned, append-only.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name (e.g. "products.draft.created").
    fn event_type(&self) -> &'static str;

    /// Schema version for this event type.
    fn version(&self) -> u32;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
