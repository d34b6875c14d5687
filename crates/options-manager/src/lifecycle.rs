//! Position state machine.
//!
//! `Open` moves to exactly one terminal state. On a tick the profit target is checked before
//! the time stop, so a position meeting both closes as `ClosedProfit`. `ClosedManual` is only
//! reachable through [`close_manual`].

use thiserror::Error;
use tracing::info;

use crate::stops::check_time_stop;
use crate::targets::check_profit_target;
use crate::types::{
    CloseDirective, CloseReason, ManagerConfig, Position, PositionMark, PositionStatus,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LifecycleError {
    #[error("position {id} is already closed ({status:?})")]
    AlreadyClosed { id: i64, status: PositionStatus },
}

/// Decides the transition for one tick without touching the position.
///
/// Pure: the same position and mark always give the same answer.
pub fn evaluate(pos: &Position, mark: &PositionMark, config: &ManagerConfig) -> Option<CloseReason> {
    if pos.status.is_terminal() {
        return None;
    }

    check_profit_target(pos, mark, config).or_else(|| check_time_stop(pos, mark, config))
}

/// Evaluates a tick and applies the resulting transition.
///
/// Returns the directive for the order-management side when the position leaves `Open`.
pub fn apply_tick(
    pos: &mut Position,
    mark: &PositionMark,
    config: &ManagerConfig,
) -> Option<CloseDirective> {
    let reason = evaluate(pos, mark, config)?;
    Some(transition(pos, reason))
}

/// Closes a position on an external instruction.
///
/// # Errors
///
/// Returns [`LifecycleError::AlreadyClosed`] if the position is already terminal.
pub fn close_manual(pos: &mut Position) -> Result<CloseDirective, LifecycleError> {
    if pos.status.is_terminal() {
        return Err(LifecycleError::AlreadyClosed {
            id: pos.id,
            status: pos.status,
        });
    }
    Ok(transition(pos, CloseReason::Manual))
}

fn transition(pos: &mut Position, reason: CloseReason) -> CloseDirective {
    let from = pos.status;
    pos.status = reason.status();
    info!(
        id = pos.id,
        symbol = pos.symbol,
        ?from,
        to = ?pos.status,
        %reason,
        "Position closed"
    );
    CloseDirective {
        position_id: pos.id,
        reason,
    }
}
