//! GEX result types.

use std::collections::BTreeMap;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sign of aggregate dealer gamma.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GammaRegime {
    /// Dealers long gamma: hedging dampens moves.
    Positive,
    /// Dealers short gamma: hedging amplifies moves.
    Negative,
    Unknown,
}

impl std::fmt::Display for GammaRegime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Positive => write!(f, "positive"),
            Self::Negative => write!(f, "negative"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// Trading signal derived from the gamma profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GexSignal {
    MeanReversion,
    Acceleration,
    MagnetPin,
}

impl std::fmt::Display for GexSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MeanReversion => write!(f, "MEAN_REVERSION"),
            Self::Acceleration => write!(f, "ACCELERATION"),
            Self::MagnetPin => write!(f, "MAGNET_PIN"),
        }
    }
}

/// Dollar gamma at one strike, summed across included expirations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrikeExposure {
    pub strike: Decimal,
    /// Non-negative.
    pub call_gex: f64,
    /// Non-positive.
    pub put_gex: f64,
    pub net_gex: f64,
    pub open_interest: u64,
}

/// Gamma profile for one symbol.
///
/// A snapshot with `error` set is not authoritative: levels are absent and the regime is
/// [`GammaRegime::Unknown`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GexSnapshot {
    pub symbol: String,
    pub spot: Decimal,
    pub max_dte: i64,
    pub strikes: BTreeMap<Decimal, StrikeExposure>,
    pub total_gex: f64,
    pub call_wall: Option<Decimal>,
    pub put_wall: Option<Decimal>,
    pub zero_gamma_level: Option<Decimal>,
    pub regime: GammaRegime,
    pub signal: Option<GexSignal>,
    /// Strikes whose absolute net exposure clears the major-level threshold, ascending.
    pub major_levels: Vec<Decimal>,
    pub error: Option<String>,
}

impl GexSnapshot {
    pub(crate) fn failed(symbol: &str, spot: Decimal, max_dte: i64, error: String) -> Self {
        Self {
            symbol: symbol.to_string(),
            spot,
            max_dte,
            strikes: BTreeMap::new(),
            total_gex: 0.0,
            call_wall: None,
            put_wall: None,
            zero_gamma_level: None,
            regime: GammaRegime::Unknown,
            signal: None,
            major_levels: Vec::new(),
            error: Some(error),
        }
    }

    pub const fn is_authoritative(&self) -> bool {
        self.error.is_none()
    }

    /// Signed exposure at `strike`, if that strike carried usable data.
    pub fn net_exposure(&self, strike: Decimal) -> Option<f64> {
        self.strikes.get(&strike).map(|s| s.net_gex)
    }

    pub fn total_gex_millions(&self) -> f64 {
        self.total_gex / 1_000_000.0
    }

    /// Signed distance of `level` from spot, in percent of spot.
    pub fn distance_pct(&self, level: Decimal) -> Option<f64> {
        if self.spot.is_zero() {
            return None;
        }
        ((level - self.spot) / self.spot * Decimal::ONE_HUNDRED).to_f64()
    }
}
