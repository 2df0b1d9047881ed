//! Traits at the pricing boundary.

pub mod priceable;

pub use priceable::Priceable;
