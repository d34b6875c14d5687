use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub screener: ScreenerConfig,
    pub gex: GexConfig,
    pub manager: ManagerConfig,
    pub risk: RiskConfig,
}

/// Candidate screening rules and pipeline limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenerConfig {
    /// Absolute delta the short strike is matched against.
    pub target_delta: f64,
    /// Symbols whose IV rank is below this are skipped entirely.
    pub min_ivr: f64,
    /// Preferred days to expiration for the working expiration.
    pub target_dte: i64,
    /// Minimum credit as a fraction of spread width.
    pub min_credit_ratio: Decimal,
    /// Upper bound on symbols evaluated at the same time.
    pub max_concurrent_symbols: usize,
    /// Per-symbol market data fetch timeout (seconds).
    pub fetch_timeout_secs: u64,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            target_delta: 0.30,
            min_ivr: 25.0,
            target_dte: 45,
            min_credit_ratio: Decimal::ONE / Decimal::from(3),
            max_concurrent_symbols: 4,
            fetch_timeout_secs: 10,
        }
    }
}

/// Gamma exposure analysis parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GexConfig {
    /// Only contracts expiring within this many days are included.
    pub max_dte: i64,
    /// Shares per contract.
    pub contract_multiplier: f64,
    /// Strikes outside `spot * (1 +/- strike_range_pct)` are ignored.
    pub strike_range_pct: f64,
    /// Spot within this fraction of the zero-gamma level forces a pin signal.
    pub pin_band_pct: f64,
    /// Minimum absolute net exposure (dollars) for a strike to count as a major level.
    pub major_level_threshold: f64,
}

impl Default for GexConfig {
    fn default() -> Self {
        Self {
            max_dte: 30,
            contract_multiplier: 100.0,
            strike_range_pct: 0.20,
            pin_band_pct: 0.005,
            major_level_threshold: 50_000_000.0,
        }
    }
}

/// Position lifecycle rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// How often the monitor ticks (seconds).
    pub poll_interval_secs: u64,
    /// Fraction of entry credit captured that closes the position (0.50 = 50%).
    pub profit_target_pct: Decimal,
    /// Positions at or below this DTE are closed regardless of P&L.
    pub time_stop_dte: i64,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            profit_target_pct: Decimal::new(50, 2),
            time_stop_dte: 21,
        }
    }
}

/// Account-level risk limits checked before a screening run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Buying power usage (percent of net liquidation value) above which screening is blocked.
    pub max_bp_usage_pct: Decimal,
    /// A single position worth more than this percent of net liquidation value is flagged.
    pub max_position_pct: Decimal,
    /// Daily portfolio theta target band, in percent of net liquidation value.
    pub theta_low_pct: Decimal,
    pub theta_high_pct: Decimal,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_bp_usage_pct: Decimal::from(50),
            max_position_pct: Decimal::from(5),
            theta_low_pct: Decimal::new(1, 1),
            theta_high_pct: Decimal::new(5, 1),
        }
    }
}
