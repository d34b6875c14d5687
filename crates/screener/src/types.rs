//! Candidate and screening result types.

use chrono::NaiveDate;
use premium_core::OptionRight;
use premium_gex::{GammaRegime, GexSignal};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Contract multiplier used for buying power figures.
const SHARES_PER_CONTRACT: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegSide {
    Long,
    Short,
}

/// One leg of a spread, priced at the quote mid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub strike: Decimal,
    pub side: LegSide,
    pub right: OptionRight,
    pub delta: Option<f64>,
    pub price: Decimal,
}

impl Leg {
    pub const fn reference(&self) -> LegRef {
        LegRef {
            right: self.right,
            strike: self.strike,
        }
    }
}

/// Two-leg vertical credit spread: same right, same expiration, opposite sides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadCandidate {
    pub symbol: String,
    pub expiration: NaiveDate,
    pub dte: i64,
    pub right: OptionRight,
    pub short: Leg,
    pub long: Leg,
    pub width: Decimal,
    pub credit: Decimal,
}

impl SpreadCandidate {
    /// Max loss per share.
    pub fn max_loss(&self) -> Decimal {
        self.width - self.credit
    }

    /// Buying power effect for one spread.
    pub fn buying_power_effect(&self) -> Decimal {
        self.max_loss() * Decimal::from(SHARES_PER_CONTRACT)
    }

    /// Credit as a percentage of width.
    pub fn credit_pct_of_width(&self) -> Decimal {
        if self.width.is_zero() {
            return Decimal::ZERO;
        }
        self.credit / self.width * Decimal::ONE_HUNDRED
    }

    pub fn legs(&self) -> [&Leg; 2] {
        [&self.short, &self.long]
    }
}

/// A put spread and a call spread on the same expiration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IronCondorCandidate {
    pub put_spread: SpreadCandidate,
    pub call_spread: SpreadCandidate,
}

impl IronCondorCandidate {
    pub fn credit(&self) -> Decimal {
        self.put_spread.credit + self.call_spread.credit
    }

    /// Only one side can finish in the money, so risk is set by the wider side.
    pub fn width(&self) -> Decimal {
        self.put_spread.width.max(self.call_spread.width)
    }

    pub fn max_loss(&self) -> Decimal {
        self.width() - self.credit()
    }

    pub fn buying_power_effect(&self) -> Decimal {
        self.max_loss() * Decimal::from(SHARES_PER_CONTRACT)
    }

    /// Both sides share one expiration.
    pub const fn dte(&self) -> i64 {
        self.put_spread.dte
    }

    pub fn legs(&self) -> [&Leg; 4] {
        [
            &self.put_spread.short,
            &self.put_spread.long,
            &self.call_spread.short,
            &self.call_spread.long,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Candidate {
    Vertical(SpreadCandidate),
    IronCondor(IronCondorCandidate),
}

impl Candidate {
    pub fn strategy_type(&self) -> &'static str {
        match self {
            Self::Vertical(s) if s.right == OptionRight::Put => "Put Vertical",
            Self::Vertical(_) => "Call Vertical",
            Self::IronCondor(_) => "Iron Condor",
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            Self::Vertical(s) => &s.symbol,
            Self::IronCondor(ic) => &ic.put_spread.symbol,
        }
    }

    pub fn credit(&self) -> Decimal {
        match self {
            Self::Vertical(s) => s.credit,
            Self::IronCondor(ic) => ic.credit(),
        }
    }

    pub fn width(&self) -> Decimal {
        match self {
            Self::Vertical(s) => s.width,
            Self::IronCondor(ic) => ic.width(),
        }
    }

    pub const fn dte(&self) -> i64 {
        match self {
            Self::Vertical(s) => s.dte,
            Self::IronCondor(ic) => ic.dte(),
        }
    }

    pub fn legs(&self) -> Vec<&Leg> {
        match self {
            Self::Vertical(s) => s.legs().to_vec(),
            Self::IronCondor(ic) => ic.legs().to_vec(),
        }
    }

    pub fn short_legs(&self) -> impl Iterator<Item = &Leg> {
        self.legs().into_iter().filter(|leg| leg.side == LegSide::Short)
    }
}

/// Why a symbol produced no candidates before any strike was examined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    IvrGateBlocked { ivr: f64, threshold: f64 },
    NoEligibleExpiration,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IvrGateBlocked { ivr, threshold } => {
                write!(f, "IVR {ivr:.1} below threshold {threshold:.1}")
            }
            Self::NoEligibleExpiration => write!(f, "no eligible monthly expiration"),
        }
    }
}

/// Builder output for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSet {
    pub symbol: String,
    pub expiration: Option<NaiveDate>,
    pub dte: Option<i64>,
    pub verticals: Vec<SpreadCandidate>,
    pub iron_condors: Vec<IronCondorCandidate>,
    pub skip: Option<SkipReason>,
}

impl CandidateSet {
    pub(crate) fn skipped(symbol: &str, reason: SkipReason) -> Self {
        Self {
            symbol: symbol.to_string(),
            expiration: None,
            dte: None,
            verticals: Vec::new(),
            iron_condors: Vec::new(),
            skip: Some(reason),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.verticals.is_empty() && self.iron_condors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.verticals.len() + self.iron_condors.len()
    }

    /// Verticals first (put side, then call side), then iron condors.
    pub fn into_candidates(self) -> Vec<Candidate> {
        self.verticals
            .into_iter()
            .map(Candidate::Vertical)
            .chain(self.iron_condors.into_iter().map(Candidate::IronCondor))
            .collect()
    }
}

/// Identifies a leg inside a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegRef {
    pub right: OptionRight,
    pub strike: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WarningReason {
    ShortPutBelowPutWall { put_wall: Decimal },
    ShortCallAboveCallWall { call_wall: Decimal },
}

/// A short leg sitting on the wrong side of a gamma wall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GexWarning {
    pub leg: LegRef,
    pub reason: WarningReason,
}

impl std::fmt::Display for GexWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.reason {
            WarningReason::ShortPutBelowPutWall { put_wall } => write!(
                f,
                "short put below put wall ({} < {put_wall})",
                self.leg.strike
            ),
            WarningReason::ShortCallAboveCallWall { call_wall } => write!(
                f,
                "short call above call wall ({} > {call_wall})",
                self.leg.strike
            ),
        }
    }
}

/// Gamma context attached to a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GexContext {
    pub regime: GammaRegime,
    pub signal: Option<GexSignal>,
    pub call_wall: Option<Decimal>,
    pub put_wall: Option<Decimal>,
    pub warnings: Vec<GexWarning>,
}

/// A candidate ready for reporting. `gex` is `None` when no authoritative profile was available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyTarget {
    pub candidate: Candidate,
    pub gex: Option<GexContext>,
}

impl StrategyTarget {
    pub fn warnings(&self) -> &[GexWarning] {
        self.gex
            .as_ref()
            .map(|ctx| ctx.warnings.as_slice())
            .unwrap_or_default()
    }
}
