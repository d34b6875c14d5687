//! File-backed adapters for the screener and manager ports.
//!
//! Market data is read from `<dir>/<SYMBOL>.json`, one [`SymbolInputs`] document per symbol.
//! Positions live in a single JSON array of `{ "position": .., "mark": .. }` records that
//! an external process keeps marked.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use premium_options_manager::{
    AccountSnapshot, CloseDirective, DirectiveSink, Position, PositionBook, PositionMark,
};
use premium_screener::{MarketDataSource, SymbolInputs};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub struct JsonDirSource {
    dir: PathBuf,
}

impl JsonDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.json", symbol.to_uppercase()))
    }
}

#[async_trait]
impl MarketDataSource for JsonDirSource {
    async fn fetch(&self, symbol: &str) -> Result<SymbolInputs> {
        let path = self.path_for(symbol);
        let bytes = tokio::fs::read(&path)
            .await
            .with_context(|| format!("reading {}", path.display()))?;
        let inputs: SymbolInputs = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing {}", path.display()))?;
        debug!(symbol, path = %path.display(), "Loaded chain");
        Ok(inputs)
    }
}

/// Reads an account snapshot (`{ "balances": .., "holdings": [..] }`).
pub async fn load_account(path: &Path) -> Result<AccountSnapshot> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parsing {}", path.display()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookEntry {
    pub position: Position,
    pub mark: PositionMark,
}

/// Position book over one JSON file. Reads on every call so external mark updates are seen.
pub struct JsonPositionBook {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonPositionBook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub async fn entries(&self) -> Result<Vec<BookEntry>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        let entries = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(entries)
    }

    pub async fn find(&self, id: i64) -> Result<Position> {
        self.entries()
            .await?
            .into_iter()
            .map(|entry| entry.position)
            .find(|pos| pos.id == id)
            .ok_or_else(|| anyhow!("position {id} not found in {}", self.path.display()))
    }

    async fn write_entries(&self, entries: &[BookEntry]) -> Result<()> {
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, serde_json::to_vec_pretty(entries)?).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl PositionBook for JsonPositionBook {
    async fn open_positions(&self) -> Result<Vec<(Position, PositionMark)>> {
        Ok(self
            .entries()
            .await?
            .into_iter()
            .filter(|entry| entry.position.is_open())
            .map(|entry| (entry.position, entry.mark))
            .collect())
    }

    async fn save(&self, position: &Position) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.entries().await?;
        let entry = entries
            .iter_mut()
            .find(|entry| entry.position.id == position.id)
            .ok_or_else(|| anyhow!("position {} not found", position.id))?;
        entry.position = position.clone();
        self.write_entries(&entries).await
    }
}

/// Logs every directive and optionally appends it as a JSON line.
pub struct DirectiveLog {
    path: Option<PathBuf>,
}

impl DirectiveLog {
    pub const fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    async fn append(path: &Path, directive: &CloseDirective) -> Result<()> {
        let mut line = serde_json::to_vec(directive)?;
        line.push(b'\n');
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("opening {}", path.display()))?;
        file.write_all(&line).await?;
        Ok(())
    }
}

#[async_trait]
impl DirectiveSink for DirectiveLog {
    async fn submit(&self, directive: CloseDirective) -> Result<()> {
        info!(
            position_id = directive.position_id,
            reason = %directive.reason,
            "Close directive"
        );
        if let Some(path) = &self.path {
            Self::append(path, &directive).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use premium_options_manager::{run_tick, CloseReason, ManagerConfig, PositionStatus};
    use rust_decimal_macros::dec;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("premium-cli-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn entry(id: i64, cost_to_close: rust_decimal::Decimal, dte: i64) -> BookEntry {
        BookEntry {
            position: Position {
                id,
                symbol: "SPY".to_string(),
                entry_credit: dec!(1.00),
                width: dec!(3),
                opened_at: Utc::now(),
                expiration: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
                status: PositionStatus::Open,
            },
            mark: PositionMark { cost_to_close, dte },
        }
    }

    #[tokio::test]
    async fn account_snapshot_defaults_multiplier_and_greeks() {
        let path = scratch_dir("account").join("account.json");
        std::fs::write(
            &path,
            r#"{
                "balances": { "net_liquidating_value": "50000", "equity_buying_power": "20000" },
                "holdings": [ { "symbol": "QQQ", "mark": "400", "quantity": "10" } ]
            }"#,
        )
        .unwrap();

        let account = load_account(&path).await.unwrap();
        assert_eq!(account.holdings[0].multiplier, dec!(1));
        assert!(account.holdings[0].theta.is_none());
        assert_eq!(account.balances.day_trade_excess, None);
    }

    #[tokio::test]
    async fn missing_market_data_file_is_an_error() {
        let source = JsonDirSource::new(scratch_dir("missing"));
        assert!(source.fetch("nope").await.is_err());
    }

    #[tokio::test]
    async fn tick_persists_status_and_appends_directives() {
        let dir = scratch_dir("book");
        let book_path = dir.join("positions.json");
        let log_path = dir.join("directives.jsonl");
        let _ = std::fs::remove_file(&log_path);
        std::fs::write(
            &book_path,
            serde_json::to_vec(&vec![entry(1, dec!(0.40), 30), entry(2, dec!(0.90), 40)]).unwrap(),
        )
        .unwrap();

        let book = JsonPositionBook::new(&book_path);
        let sink = DirectiveLog::new(Some(log_path.clone()));
        let directives = run_tick(&book, &sink, &ManagerConfig::default())
            .await
            .unwrap();

        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].reason, CloseReason::ProfitTarget);
        assert_eq!(book.find(1).await.unwrap().status, PositionStatus::ClosedProfit);
        assert_eq!(book.find(2).await.unwrap().status, PositionStatus::Open);

        let logged = std::fs::read_to_string(&log_path).unwrap();
        let parsed: CloseDirective = serde_json::from_str(logged.trim()).unwrap();
        assert_eq!(parsed, directives[0]);
    }
}
