//! `storefront-core` — domain building blocks shared by the storefront crates.
//!
//! Everything here is **pure**: no IO, no clocks, no global state.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod event;
pub mod id;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use event::Event;
pub use id::AggregateId;
pub use value_object::ValueObject;
