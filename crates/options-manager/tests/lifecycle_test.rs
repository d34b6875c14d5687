use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use premium_options_manager::{
    run_tick, CloseDirective, CloseReason, DirectiveSink, ManagerConfig, Position, PositionBook,
    PositionMark, PositionStatus,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::sync::Mutex;

#[derive(Default)]
struct MemoryBook {
    positions: Mutex<HashMap<i64, (Position, PositionMark)>>,
    fail_saves: bool,
}

impl MemoryBook {
    async fn insert(&self, pos: Position, mark: PositionMark) {
        self.positions.lock().await.insert(pos.id, (pos, mark));
    }

    async fn set_mark(&self, id: i64, mark: PositionMark) {
        if let Some(entry) = self.positions.lock().await.get_mut(&id) {
            entry.1 = mark;
        }
    }

    async fn status(&self, id: i64) -> PositionStatus {
        self.positions.lock().await[&id].0.status
    }
}

#[async_trait]
impl PositionBook for MemoryBook {
    async fn open_positions(&self) -> Result<Vec<(Position, PositionMark)>> {
        let mut open: Vec<_> = self
            .positions
            .lock()
            .await
            .values()
            .filter(|(pos, _)| pos.is_open())
            .cloned()
            .collect();
        open.sort_by_key(|(pos, _)| pos.id);
        Ok(open)
    }

    async fn save(&self, position: &Position) -> Result<()> {
        if self.fail_saves {
            return Err(anyhow!("store unavailable"));
        }
        let mut positions = self.positions.lock().await;
        let entry = positions
            .get_mut(&position.id)
            .ok_or_else(|| anyhow!("unknown position {}", position.id))?;
        entry.0 = position.clone();
        Ok(())
    }
}

#[derive(Default)]
struct RecordingSink {
    received: Mutex<Vec<CloseDirective>>,
    offline: AtomicBool,
}

#[async_trait]
impl DirectiveSink for RecordingSink {
    async fn submit(&self, directive: CloseDirective) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(anyhow!("order desk unreachable"));
        }
        self.received.lock().await.push(directive);
        Ok(())
    }
}

fn position(id: i64, entry_credit: Decimal) -> Position {
    Position {
        id,
        symbol: "SPY".to_string(),
        entry_credit,
        width: dec!(5),
        opened_at: Utc::now(),
        expiration: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
        status: PositionStatus::Open,
    }
}

fn mark(cost_to_close: Decimal, dte: i64) -> PositionMark {
    PositionMark { cost_to_close, dte }
}

#[tokio::test]
async fn tick_closes_only_positions_that_meet_a_rule() {
    let book = MemoryBook::default();
    book.insert(position(1, dec!(1.60)), mark(dec!(0.70), 30)).await; // profit
    book.insert(position(2, dec!(1.60)), mark(dec!(2.10), 21)).await; // time stop, losing
    book.insert(position(3, dec!(1.60)), mark(dec!(1.20), 35)).await; // hold
    let sink = RecordingSink::default();

    let directives = run_tick(&book, &sink, &ManagerConfig::default())
        .await
        .unwrap();

    assert_eq!(
        directives,
        vec![
            CloseDirective {
                position_id: 1,
                reason: CloseReason::ProfitTarget
            },
            CloseDirective {
                position_id: 2,
                reason: CloseReason::TimeStop
            },
        ]
    );
    assert_eq!(*sink.received.lock().await, directives);
    assert_eq!(book.status(1).await, PositionStatus::ClosedProfit);
    assert_eq!(book.status(2).await, PositionStatus::ClosedTimeStop);
    assert_eq!(book.status(3).await, PositionStatus::Open);
}

#[tokio::test]
async fn closed_positions_are_not_revisited() {
    let book = MemoryBook::default();
    book.insert(position(1, dec!(1.00)), mark(dec!(0.50), 25)).await;
    let sink = RecordingSink::default();
    let config = ManagerConfig::default();

    run_tick(&book, &sink, &config).await.unwrap();
    assert_eq!(book.status(1).await, PositionStatus::ClosedProfit);

    book.set_mark(1, mark(dec!(3.00), 5)).await;
    let second = run_tick(&book, &sink, &config).await.unwrap();

    assert!(second.is_empty());
    assert_eq!(book.status(1).await, PositionStatus::ClosedProfit);
    assert_eq!(sink.received.lock().await.len(), 1);
}

#[tokio::test]
async fn failed_submit_keeps_position_open_and_retries_next_tick() {
    let book = MemoryBook::default();
    book.insert(position(5, dec!(1.00)), mark(dec!(0.30), 35)).await;
    let sink = RecordingSink::default();
    let config = ManagerConfig::default();

    sink.offline.store(true, Ordering::SeqCst);
    let first = run_tick(&book, &sink, &config).await.unwrap();
    assert!(first.is_empty());
    assert_eq!(book.status(5).await, PositionStatus::Open);

    sink.offline.store(false, Ordering::SeqCst);
    let second = run_tick(&book, &sink, &config).await.unwrap();
    let expected = vec![CloseDirective {
        position_id: 5,
        reason: CloseReason::ProfitTarget,
    }];
    assert_eq!(second, expected);
    assert_eq!(*sink.received.lock().await, expected);
    assert_eq!(book.status(5).await, PositionStatus::ClosedProfit);
}

#[tokio::test]
async fn failed_save_repeats_delivered_directive() {
    let book = MemoryBook {
        fail_saves: true,
        ..MemoryBook::default()
    };
    book.insert(position(9, dec!(1.00)), mark(dec!(0.20), 40)).await;
    let sink = RecordingSink::default();
    let config = ManagerConfig::default();

    let first = run_tick(&book, &sink, &config).await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(book.status(9).await, PositionStatus::Open);

    // status never persisted, so the same close goes out again
    let second = run_tick(&book, &sink, &config).await.unwrap();
    assert_eq!(second, first);
    assert_eq!(sink.received.lock().await.len(), 2);
}

#[tokio::test]
async fn custom_thresholds_apply() {
    let book = MemoryBook::default();
    book.insert(position(4, dec!(2.00)), mark(dec!(1.10), 28)).await;
    let sink = RecordingSink::default();
    let config = ManagerConfig {
        profit_target_pct: dec!(0.40),
        time_stop_dte: 14,
        ..ManagerConfig::default()
    };

    let directives = run_tick(&book, &sink, &config).await.unwrap();

    assert_eq!(directives.len(), 1);
    assert_eq!(directives[0].reason, CloseReason::ProfitTarget);
}
