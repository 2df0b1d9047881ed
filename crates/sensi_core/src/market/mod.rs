//! Market data: risk factor keys, immutable snapshots and scenario views.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  MarketSnapshot  - base quotes, never mutated│
//! │  QuoteMap        - sparse shifted quotes     │
//! │        │  apply()                            │
//! │        ▼                                     │
//! │  MarketView      - base + patched objects    │
//! └──────────────────────────────────────────────┘
//! ```

mod error;
mod object;
pub mod risk_factor;
mod snapshot;
mod view;

pub use error::MarketDataError;
pub use object::{GridSurface, MarketObject, PillarCurve, SPOT_LABEL};
pub use risk_factor::{
    FactorKeyError, RiskFactorKey, RiskFactorKind, ShiftGeometry, KEY_SEPARATOR,
};
#[cfg(feature = "serde")]
pub use snapshot::{MarketData, MarketEntry, MarketObjectData};
pub use snapshot::{MarketSnapshot, QuoteMap};
pub use view::MarketView;
