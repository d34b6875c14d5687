use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use premium_core::{GexConfig, RawChain, RawExpiration, RawQuote, RawStrike, ScreenerConfig};
use premium_screener::{
    Candidate, CycleSummary, MarketDataSource, Screener, SkipReason, SymbolInputs, SymbolOutcome,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// $1 strikes 91..=109 around spot 100, one monthly expiration 46 days out.
fn sample_chain(symbol: &str) -> RawChain {
    let strikes = (90..=110)
        .map(|k| {
            let strike = Decimal::from(k);
            let distance = (k - 100_i64).abs();
            let delta = 0.5 - 0.05 * distance as f64;
            let put = (91..100).contains(&k).then(|| RawQuote {
                bid: Decimal::from(k - 90) * dec!(0.40) - dec!(0.05),
                ask: Decimal::from(k - 90) * dec!(0.40) + dec!(0.05),
                delta: Some(-delta),
                gamma: Some(0.02),
                open_interest: Some(1_000),
            });
            let call = (101..110).contains(&k).then(|| RawQuote {
                bid: Decimal::from(110 - k) * dec!(0.40) - dec!(0.05),
                ask: Decimal::from(110 - k) * dec!(0.40) + dec!(0.05),
                delta: Some(delta),
                gamma: Some(0.02),
                open_interest: Some(1_500),
            });
            RawStrike {
                strike_price: strike,
                call,
                put,
            }
        })
        .filter(|s| s.call.is_some() || s.put.is_some())
        .collect();

    RawChain {
        symbol: symbol.to_string(),
        as_of: Utc.with_ymd_and_hms(2026, 1, 5, 15, 0, 0).unwrap(),
        expirations: vec![RawExpiration {
            expiration_date: NaiveDate::from_ymd_opt(2026, 2, 20).unwrap(),
            expiration_type: None,
            strikes,
        }],
    }
}

struct InMemorySource {
    inputs: HashMap<String, SymbolInputs>,
}

#[async_trait]
impl MarketDataSource for InMemorySource {
    async fn fetch(&self, symbol: &str) -> Result<SymbolInputs> {
        self.inputs
            .get(symbol)
            .cloned()
            .ok_or_else(|| anyhow!("no data for {symbol}"))
    }
}

fn gex_config() -> GexConfig {
    GexConfig {
        max_dte: 60,
        ..GexConfig::default()
    }
}

fn inputs(symbol: &str, ivr: Option<f64>) -> SymbolInputs {
    SymbolInputs {
        chain: sample_chain(symbol),
        spot: dec!(100),
        ivr,
    }
}

#[tokio::test]
async fn screens_each_symbol_and_keeps_order() {
    let mut empty = sample_chain("EMPTY");
    empty.expirations[0].strikes.clear();

    let source = InMemorySource {
        inputs: HashMap::from([
            ("SPY".to_string(), inputs("SPY", Some(40.0))),
            ("LOW".to_string(), inputs("LOW", Some(20.0))),
            (
                "EMPTY".to_string(),
                SymbolInputs {
                    chain: empty,
                    spot: dec!(100),
                    ivr: None,
                },
            ),
        ]),
    };
    let screener = Screener::new(Arc::new(source), ScreenerConfig::default(), gex_config());
    let symbols: Vec<String> = ["SPY", "MISSING", "LOW", "EMPTY"]
        .iter()
        .map(ToString::to_string)
        .collect();

    let reports = screener.screen(&symbols).await;
    let order: Vec<&str> = reports.iter().map(|r| r.symbol.as_str()).collect();
    assert_eq!(order, vec!["SPY", "MISSING", "LOW", "EMPTY"]);

    // SPY: put vertical, call vertical, iron condor, all with gamma context
    let SymbolOutcome::Screened { targets, gex, skip } = &reports[0].outcome else {
        panic!("SPY should be screened");
    };
    assert!(skip.is_none());
    assert!(gex.is_authoritative());
    assert_eq!(targets.len(), 3);
    assert!(targets.iter().all(|t| t.gex.is_some()));
    assert!(matches!(targets[2].candidate, Candidate::IronCondor(_)));
    for target in targets {
        let credit = target.candidate.credit();
        assert!(credit * dec!(3) >= target.candidate.width());
    }
    let Candidate::Vertical(put) = &targets[0].candidate else {
        panic!("first target should be the put vertical");
    };
    assert_eq!(put.short.strike, dec!(96));
    assert_eq!(put.long.strike, dec!(93));

    assert!(matches!(reports[1].outcome, SymbolOutcome::Skipped { .. }));

    let SymbolOutcome::Screened { targets, skip, .. } = &reports[2].outcome else {
        panic!("LOW should be screened");
    };
    assert!(targets.is_empty());
    assert!(matches!(skip, Some(SkipReason::IvrGateBlocked { .. })));

    assert!(matches!(reports[3].outcome, SymbolOutcome::Failed { .. }));

    // a malformed chain is a failure, not a skip
    assert_eq!(
        CycleSummary::tally(&reports),
        CycleSummary {
            screened: 2,
            skipped: 1,
            failed: 1,
            targets: 3,
        }
    );
}

struct SlowSource {
    delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl MarketDataSource for SlowSource {
    async fn fetch(&self, symbol: &str) -> Result<SymbolInputs> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(inputs(symbol, None))
    }
}

#[tokio::test(start_paused = true)]
async fn concurrency_is_bounded() {
    let source = Arc::new(SlowSource {
        delay: Duration::from_millis(50),
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let config = ScreenerConfig {
        max_concurrent_symbols: 2,
        ..ScreenerConfig::default()
    };
    let screener = Screener::new(Arc::clone(&source), config, gex_config());
    let symbols: Vec<String> = (0..6).map(|i| format!("SYM{i}")).collect();

    let reports = screener.screen(&symbols).await;
    assert_eq!(reports.len(), 6);
    assert!(source.peak.load(Ordering::SeqCst) <= 2);
    assert!(reports
        .iter()
        .all(|r| matches!(r.outcome, SymbolOutcome::Screened { .. })));
}

#[tokio::test(start_paused = true)]
async fn timed_out_fetch_is_skipped_for_the_cycle() {
    let source = Arc::new(SlowSource {
        delay: Duration::from_secs(60),
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
    });
    let config = ScreenerConfig {
        fetch_timeout_secs: 1,
        ..ScreenerConfig::default()
    };
    let screener = Screener::new(source, config, gex_config());

    let reports = screener.screen(&["SPY".to_string()]).await;
    let SymbolOutcome::Skipped { reason } = &reports[0].outcome else {
        panic!("timed out fetch should be skipped");
    };
    assert!(reason.contains("timed out"));
}
