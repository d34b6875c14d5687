//! Deterministic options position management.
//!
//! Runs as a long-lived service that:
//! - Loads open positions and their latest marks from a [`PositionBook`]
//! - Closes at the profit target, checked before the time stop
//! - Closes anything at or inside the time-stop DTE, winning or losing
//! - Emits close directives to a [`DirectiveSink`]
//!
//! [`risk::assess`] checks account-level limits (buying power usage, position size, theta
//! band) before new positions are screened.
//!
//! No discretion in the exit path: all rules are deterministic.

pub mod lifecycle;
pub mod risk;
pub mod service;
pub mod stops;
pub mod targets;
pub mod types;

pub use lifecycle::{apply_tick, close_manual, evaluate, LifecycleError};
pub use risk::{
    assess, AccountBalances, AccountSnapshot, Holding, RiskConfig, RiskReport, SizeWarning,
    ThetaStatus,
};
pub use service::{run, run_tick, DirectiveSink, PositionBook};
pub use types::{
    CloseDirective, CloseReason, ManagerConfig, Position, PositionMark, PositionStatus,
};
