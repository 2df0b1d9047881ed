//! # sensi_models: Reference instruments
//!
//! Small, fully specified instruments priced on a [`sensi_core::market::MarketView`],
//! each with a closed-form sensitivity that bump-and-revalue results can be
//! checked against:
//!
//! | Instrument | Market inputs | Closed-form reference |
//! |------------|---------------|-----------------------|
//! | [`VanillaSwap`] | discount + index curve | pillar deltas on both curves |
//! | [`EuropeanSwaption`] | curves + swaption vol | Black vega |
//! | [`FxForward`] | FX spot + two discount curves | spot delta |
//! | [`FxOption`] | FX spot + curves + FX vol | Garman-Kohlhagen spot delta |
//!
//! Instruments are dispatched statically through the [`Instrument`] enum and
//! wrapped in a [`Trade`] that implements [`sensi_core::traits::Priceable`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod analytical;
pub mod instruments;

pub use instruments::{
    EuropeanSwaption, FxForward, FxOption, Instrument, InstrumentError, OptionType,
    SwapDirection, Trade, VanillaSwap,
};
