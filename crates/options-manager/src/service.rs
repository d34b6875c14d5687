//! Monitoring loop: hands each open position's latest mark to the state machine and
//! forwards close directives.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::lifecycle::apply_tick;
use crate::types::{CloseDirective, ManagerConfig, Position, PositionMark};

/// External store of positions. The manager does not own positions between ticks.
#[async_trait]
pub trait PositionBook: Send + Sync {
    /// Open positions paired with their latest mark.
    async fn open_positions(&self) -> Result<Vec<(Position, PositionMark)>>;

    /// Persists a position whose status changed.
    async fn save(&self, position: &Position) -> Result<()>;
}

/// Receiver of close instructions (order management lives outside this crate).
#[async_trait]
pub trait DirectiveSink: Send + Sync {
    async fn submit(&self, directive: CloseDirective) -> Result<()>;
}

/// One monitoring pass. Returns the directives delivered to the sink.
///
/// A directive is submitted before the new status is persisted, so a failed submit leaves
/// the position open and the next tick emits it again. Delivery is at-least-once: a save
/// that fails after a successful submit repeats the directive on the next tick.
///
/// # Errors
///
/// Returns an error if open positions cannot be loaded.
pub async fn run_tick<B, S>(
    book: &B,
    sink: &S,
    config: &ManagerConfig,
) -> Result<Vec<CloseDirective>>
where
    B: PositionBook + ?Sized,
    S: DirectiveSink + ?Sized,
{
    let positions = book.open_positions().await?;
    let mut directives = Vec::new();

    for (mut pos, mark) in positions {
        let Some(directive) = apply_tick(&mut pos, &mark, config) else {
            continue;
        };

        if let Err(e) = sink.submit(directive.clone()).await {
            error!(
                id = pos.id,
                error = %e,
                "Failed to submit close directive, position stays open"
            );
            continue;
        }
        if let Err(e) = book.save(&pos).await {
            warn!(
                id = pos.id,
                error = %e,
                "Failed to persist closed status, directive will repeat"
            );
        }
        directives.push(directive);
    }

    Ok(directives)
}

/// Run the position manager loop.
///
/// Ticks every `config.poll_interval_secs` seconds until the task is cancelled.
pub async fn run<B, S>(book: B, sink: S, config: ManagerConfig) -> Result<()>
where
    B: PositionBook,
    S: DirectiveSink,
{
    info!(
        poll_secs = config.poll_interval_secs,
        profit_target = %config.profit_target_pct,
        time_stop_dte = config.time_stop_dte,
        "Position manager started"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(config.poll_interval_secs));

    loop {
        interval.tick().await;

        match run_tick(&book, &sink, &config).await {
            Ok(directives) if !directives.is_empty() => {
                info!(count = directives.len(), "Close directives emitted");
            }
            Ok(_) => {}
            Err(e) => error!(error = %e, "Failed to load open positions"),
        }
    }
}
