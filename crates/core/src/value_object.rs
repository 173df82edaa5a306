//! Value object trait: equality by value, not identity.

/// Marker trait for immutable values compared attribute-by-attribute.
///
/// An option key such as `"color"` is a value object: two keys derived from
/// `"Color"` and `"COLOR"` are the same key. A variant draft is not; it keeps its
/// identity (the SKU) while its price or stock is edited.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
