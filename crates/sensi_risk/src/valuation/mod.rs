//! Scenario valuation.
//!
//! This module provides:
//! - [`ValuationDriver`]: fills an [`NpvCube`](crate::cube::NpvCube) from a
//!   scenario set and a portfolio of [`Priceable`](sensi_core::traits::Priceable) trades
//! - [`FailureIndex`]: cells that could not be priced
//! - [`CancellationToken`]: coarse-grained cancellation between scenarios

mod cancel;
mod driver;
mod failures;

pub use cancel::CancellationToken;
pub use driver::{Valuation, ValuationConfig, ValuationDriver, ValuationError, ValuationStats};
pub use failures::{FailureIndex, PricingFailureRecord};
