//! Dealer gamma exposure (GEX) analysis over a normalized option chain.
//!
//! Dealers are modeled as long calls and short puts against customer flow, so call gamma
//! counts positive and put gamma negative. This is the common industry convention and is
//! not reconciled against any broker's published figures.

pub mod analyzer;
pub mod types;

pub use analyzer::{analyze, classify};
pub use types::{GammaRegime, GexSignal, GexSnapshot, StrikeExposure};
