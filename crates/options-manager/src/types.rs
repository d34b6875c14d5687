//! Types for short-premium position management.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use premium_core::ManagerConfig;

/// Lifecycle state of a position. Every state except `Open` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionStatus {
    Open,
    ClosedProfit,
    ClosedTimeStop,
    ClosedManual,
}

impl PositionStatus {
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Open)
    }
}

/// An open credit spread or iron condor tracked by the manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: i64,
    pub symbol: String,
    /// Net premium received per share at entry.
    pub entry_credit: Decimal,
    pub width: Decimal,
    pub opened_at: DateTime<Utc>,
    pub expiration: NaiveDate,
    pub status: PositionStatus,
}

impl Position {
    /// Fraction of entry credit captured if closed at `cost_to_close`.
    ///
    /// `None` when the entry credit is not positive.
    pub fn profit_ratio(&self, cost_to_close: Decimal) -> Option<Decimal> {
        if self.entry_credit <= Decimal::ZERO {
            return None;
        }
        Some((self.entry_credit - cost_to_close) / self.entry_credit)
    }

    /// Days until expiration as of `today`.
    pub fn days_to_expiry(&self, today: NaiveDate) -> i64 {
        (self.expiration - today).num_days()
    }

    /// Max loss per share.
    pub fn max_loss(&self) -> Decimal {
        self.width - self.entry_credit
    }

    pub const fn is_open(&self) -> bool {
        matches!(self.status, PositionStatus::Open)
    }
}

/// Latest market state of a position, supplied on each monitoring tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionMark {
    /// Debit to buy the position back now, per share.
    pub cost_to_close: Decimal,
    pub dte: i64,
}

/// Reason for closing a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    ProfitTarget,
    TimeStop,
    Manual,
}

impl CloseReason {
    /// Terminal status this reason transitions to.
    pub const fn status(self) -> PositionStatus {
        match self {
            Self::ProfitTarget => PositionStatus::ClosedProfit,
            Self::TimeStop => PositionStatus::ClosedTimeStop,
            Self::Manual => PositionStatus::ClosedManual,
        }
    }
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProfitTarget => write!(f, "profit_target"),
            Self::TimeStop => write!(f, "time_stop"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Instruction to the order-management side to close a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseDirective {
    pub position_id: i64,
    pub reason: CloseReason,
}
