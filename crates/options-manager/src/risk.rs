//! Account risk check run before a screening cycle.
//!
//! Pure computation over balances and holdings the caller already fetched: buying power
//! usage, per-position concentration, and portfolio delta/theta against a target band.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub use premium_core::RiskConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalances {
    pub net_liquidating_value: Decimal,
    pub equity_buying_power: Decimal,
    #[serde(default)]
    pub cash_balance: Decimal,
    #[serde(default)]
    pub day_trade_excess: Option<Decimal>,
}

/// One holding as reported by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub symbol: String,
    pub mark: Decimal,
    /// Signed: negative for short.
    pub quantity: Decimal,
    #[serde(default = "one")]
    pub multiplier: Decimal,
    /// Per-contract greeks; `None` when the feed did not deliver them.
    #[serde(default)]
    pub delta: Option<Decimal>,
    #[serde(default)]
    pub theta: Option<Decimal>,
}

fn one() -> Decimal {
    Decimal::ONE
}

impl Holding {
    pub fn market_value(&self) -> Decimal {
        (self.mark * self.quantity * self.multiplier).abs()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub balances: AccountBalances,
    #[serde(default)]
    pub holdings: Vec<Holding>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ThetaStatus {
    Ok,
    Low { target: Decimal },
    High { target: Decimal },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeWarning {
    pub symbol: String,
    pub pct_of_nlv: Decimal,
}

impl std::fmt::Display for SizeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:.2}% of NLV", self.symbol, self.pct_of_nlv)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReport {
    pub nlv: Decimal,
    pub bp_usage_pct: Decimal,
    pub max_bp_usage_pct: Decimal,
    pub portfolio_delta: Decimal,
    pub portfolio_theta: Decimal,
    pub theta_status: ThetaStatus,
    pub size_warnings: Vec<SizeWarning>,
    /// Set when the broker reports a negative day-trade excess.
    pub negative_day_trade_excess: Option<Decimal>,
    /// Holdings left out of the greek totals for lack of data.
    pub missing_greeks: usize,
}

impl RiskReport {
    pub fn bp_over_limit(&self) -> bool {
        self.bp_usage_pct > self.max_bp_usage_pct
    }

    /// Whether a new screening cycle must not proceed without an explicit override.
    pub fn blocks_screening(&self) -> bool {
        self.bp_over_limit()
    }
}

/// Builds the risk report for an account.
///
/// A non-positive net liquidation value gives zero percentages rather than a division.
pub fn assess(account: &AccountSnapshot, config: &RiskConfig) -> RiskReport {
    let hundred = Decimal::ONE_HUNDRED;
    let nlv = account.balances.net_liquidating_value;
    let pct_of_nlv = |amount: Decimal| {
        if nlv > Decimal::ZERO {
            amount / nlv * hundred
        } else {
            Decimal::ZERO
        }
    };

    let bp_usage_pct = pct_of_nlv(nlv - account.balances.equity_buying_power);

    let size_warnings: Vec<SizeWarning> = account
        .holdings
        .iter()
        .map(|h| SizeWarning {
            symbol: h.symbol.clone(),
            pct_of_nlv: pct_of_nlv(h.market_value()),
        })
        .filter(|w| w.pct_of_nlv > config.max_position_pct)
        .collect();

    let mut portfolio_delta = Decimal::ZERO;
    let mut portfolio_theta = Decimal::ZERO;
    let mut missing_greeks = 0;
    for h in &account.holdings {
        match (h.delta, h.theta) {
            (Some(delta), Some(theta)) => {
                portfolio_delta += delta * h.multiplier * h.quantity;
                portfolio_theta += theta * h.multiplier * h.quantity;
            }
            _ => missing_greeks += 1,
        }
    }

    let theta_low = nlv * config.theta_low_pct / hundred;
    let theta_high = nlv * config.theta_high_pct / hundred;
    let theta_status = if portfolio_theta < theta_low {
        ThetaStatus::Low { target: theta_low }
    } else if portfolio_theta > theta_high {
        ThetaStatus::High { target: theta_high }
    } else {
        ThetaStatus::Ok
    };

    let negative_day_trade_excess = account
        .balances
        .day_trade_excess
        .filter(|excess| *excess < Decimal::ZERO);

    let report = RiskReport {
        nlv,
        bp_usage_pct,
        max_bp_usage_pct: config.max_bp_usage_pct,
        portfolio_delta,
        portfolio_theta,
        theta_status,
        size_warnings,
        negative_day_trade_excess,
        missing_greeks,
    };

    if report.bp_over_limit() {
        warn!(
            bp_usage_pct = %report.bp_usage_pct.round_dp(2),
            limit = %config.max_bp_usage_pct,
            "Buying power usage over limit"
        );
    }
    for w in &report.size_warnings {
        warn!(symbol = w.symbol, pct_of_nlv = %w.pct_of_nlv.round_dp(2), "Position oversized");
    }
    if missing_greeks > 0 {
        warn!(missing_greeks, "Greeks unavailable for some holdings, totals are partial");
    }
    info!(
        nlv = %nlv,
        bp_usage_pct = %report.bp_usage_pct.round_dp(2),
        delta = %report.portfolio_delta,
        theta = %report.portfolio_theta,
        theta_status = ?report.theta_status,
        "Account risk assessed"
    );

    report
}
