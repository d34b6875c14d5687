//! Profit target rule.

use tracing::info;

use crate::types::{CloseReason, ManagerConfig, Position, PositionMark};

/// Close once the captured fraction of entry credit reaches `profit_target_pct`.
pub fn check_profit_target(
    pos: &Position,
    mark: &PositionMark,
    config: &ManagerConfig,
) -> Option<CloseReason> {
    let ratio = pos.profit_ratio(mark.cost_to_close)?;

    if ratio >= config.profit_target_pct {
        info!(
            id = pos.id,
            symbol = pos.symbol,
            profit_ratio = %ratio,
            target = %config.profit_target_pct,
            "Profit target hit"
        );
        return Some(CloseReason::ProfitTarget);
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PositionStatus;
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn make_position(entry_credit: Decimal) -> Position {
        Position {
            id: 1,
            symbol: "IWM".to_string(),
            entry_credit,
            width: dec!(3),
            opened_at: Utc::now(),
            expiration: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
            status: PositionStatus::Open,
        }
    }

    fn mark(cost_to_close: Decimal) -> PositionMark {
        PositionMark {
            cost_to_close,
            dte: 30,
        }
    }

    #[test]
    fn exactly_half_captured_hits_target() {
        let pos = make_position(dec!(1.20));
        let action = check_profit_target(&pos, &mark(dec!(0.60)), &ManagerConfig::default());
        assert_eq!(action, Some(CloseReason::ProfitTarget));
    }

    #[test]
    fn below_target_holds() {
        let pos = make_position(dec!(1.20));
        let action = check_profit_target(&pos, &mark(dec!(0.61)), &ManagerConfig::default());
        assert!(action.is_none());
    }

    #[test]
    fn zero_entry_credit_never_hits_target() {
        let pos = make_position(dec!(0));
        let action = check_profit_target(&pos, &mark(dec!(0)), &ManagerConfig::default());
        assert!(action.is_none());
    }
}
