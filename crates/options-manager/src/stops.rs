//! Time stop rule.

use crate::types::{CloseReason, ManagerConfig, Position, PositionMark};

/// Close anything at or inside `time_stop_dte`, winning or losing.
pub fn check_time_stop(
    pos: &Position,
    mark: &PositionMark,
    config: &ManagerConfig,
) -> Option<CloseReason> {
    if mark.dte > config.time_stop_dte {
        return None;
    }

    let is_losing = mark.cost_to_close > pos.entry_credit;
    tracing::warn!(
        id = pos.id,
        symbol = pos.symbol,
        dte = mark.dte,
        is_losing,
        pnl_per_share = %(pos.entry_credit - mark.cost_to_close),
        "Time stop triggered"
    );
    Some(CloseReason::TimeStop)
}
