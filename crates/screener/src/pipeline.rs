//! One screening cycle over a list of symbols with bounded concurrency.
//!
//! Each symbol is fetched, normalized, then screened and gamma-profiled in parallel on a
//! shared immutable snapshot before the two results are joined by the enricher. Symbols
//! share no state, so the only coordination is the concurrency permit.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use premium_core::{normalize, ChainSnapshot, GexConfig, RawChain, ScreenerConfig};
use premium_gex::GexSnapshot;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::builder::build_candidates;
use crate::enrich::enrich;
use crate::types::{SkipReason, StrategyTarget};

/// Everything the market data collaborator hands over for one symbol.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolInputs {
    pub chain: RawChain,
    pub spot: Decimal,
    /// IV rank in percent; `None` when the upstream rank is unavailable.
    #[serde(default)]
    pub ivr: Option<f64>,
}

/// Source of chain snapshots (broker API, cache, files).
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    async fn fetch(&self, symbol: &str) -> Result<SymbolInputs>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SymbolOutcome {
    Screened {
        targets: Vec<StrategyTarget>,
        gex: GexSnapshot,
        skip: Option<SkipReason>,
    },
    /// Fetch failed or timed out; retried next cycle.
    Skipped { reason: String },
    /// Malformed chain payload.
    Failed { error: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub outcome: SymbolOutcome,
}

impl SymbolReport {
    fn skipped(symbol: &str, reason: String) -> Self {
        Self {
            symbol: symbol.to_string(),
            outcome: SymbolOutcome::Skipped { reason },
        }
    }

    fn failed(symbol: &str, error: String) -> Self {
        Self {
            symbol: symbol.to_string(),
            outcome: SymbolOutcome::Failed { error },
        }
    }

    pub fn targets(&self) -> &[StrategyTarget] {
        match &self.outcome {
            SymbolOutcome::Screened { targets, .. } => targets,
            _ => &[],
        }
    }
}

/// Per-outcome counts for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSummary {
    pub screened: usize,
    pub skipped: usize,
    pub failed: usize,
    pub targets: usize,
}

impl CycleSummary {
    pub fn tally(reports: &[SymbolReport]) -> Self {
        reports.iter().fold(Self::default(), |mut acc, r| {
            match r.outcome {
                SymbolOutcome::Screened { .. } => acc.screened += 1,
                SymbolOutcome::Skipped { .. } => acc.skipped += 1,
                SymbolOutcome::Failed { .. } => acc.failed += 1,
            }
            acc.targets += r.targets().len();
            acc
        })
    }
}

pub struct Screener<S> {
    source: Arc<S>,
    config: ScreenerConfig,
    gex_config: GexConfig,
}

impl<S: MarketDataSource> Screener<S> {
    #[must_use]
    pub const fn new(source: Arc<S>, config: ScreenerConfig, gex_config: GexConfig) -> Self {
        Self {
            source,
            config,
            gex_config,
        }
    }

    /// Runs one cycle. Reports come back in the order of `symbols`.
    pub async fn screen(&self, symbols: &[String]) -> Vec<SymbolReport> {
        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_symbols.max(1)));

        let futures: Vec<_> = symbols
            .iter()
            .map(|symbol| {
                let permits = Arc::clone(&permits);
                async move {
                    let Ok(_permit) = permits.acquire().await else {
                        return SymbolReport::skipped(symbol, "worker pool closed".to_string());
                    };
                    self.screen_symbol(symbol).await
                }
            })
            .collect();

        let reports: Vec<SymbolReport> = futures_util::future::join_all(futures).await;

        let summary = CycleSummary::tally(&reports);
        info!(
            symbols = symbols.len(),
            screened = summary.screened,
            skipped = summary.skipped,
            failed = summary.failed,
            targets = summary.targets,
            "Screening cycle complete"
        );

        reports
    }

    async fn screen_symbol(&self, symbol: &str) -> SymbolReport {
        let timeout = Duration::from_secs(self.config.fetch_timeout_secs);
        let inputs = match tokio::time::timeout(timeout, self.source.fetch(symbol)).await {
            Ok(Ok(inputs)) => inputs,
            Ok(Err(e)) => {
                warn!(symbol, error = %e, "Market data fetch failed, skipping this cycle");
                return SymbolReport::skipped(symbol, format!("fetch failed: {e}"));
            }
            Err(_) => {
                warn!(
                    symbol,
                    timeout_secs = self.config.fetch_timeout_secs,
                    "Market data fetch timed out, skipping this cycle"
                );
                return SymbolReport::skipped(
                    symbol,
                    format!("fetch timed out after {}s", self.config.fetch_timeout_secs),
                );
            }
        };

        let snapshot = match normalize(&inputs.chain, inputs.spot) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                warn!(symbol, error = %e, "Malformed chain");
                return SymbolReport::failed(symbol, e.to_string());
            }
        };

        match evaluate(snapshot, inputs.ivr, &self.config, &self.gex_config).await {
            Ok((targets, gex, skip)) => SymbolReport {
                symbol: symbol.to_string(),
                outcome: SymbolOutcome::Screened { targets, gex, skip },
            },
            Err(e) => SymbolReport::failed(symbol, e.to_string()),
        }
    }
}

/// Screens and gamma-profiles one snapshot in parallel, then joins them.
///
/// # Errors
///
/// Returns an error only if a worker task panics.
pub async fn evaluate(
    snapshot: Arc<ChainSnapshot>,
    ivr: Option<f64>,
    config: &ScreenerConfig,
    gex_config: &GexConfig,
) -> Result<(Vec<StrategyTarget>, GexSnapshot, Option<SkipReason>)> {
    let candidates = {
        let snapshot = Arc::clone(&snapshot);
        let config = config.clone();
        tokio::task::spawn_blocking(move || build_candidates(&snapshot, &config, ivr))
    };
    let gex = {
        let snapshot = Arc::clone(&snapshot);
        let gex_config = gex_config.clone();
        tokio::task::spawn_blocking(move || premium_gex::analyze(&snapshot, &gex_config))
    };

    let (candidates, gex) = tokio::try_join!(candidates, gex)?;
    let skip = candidates.skip.clone();
    let targets = enrich(candidates.into_candidates(), Some(&gex));

    Ok((targets, gex, skip))
}
