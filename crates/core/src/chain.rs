//! Chain normalization: raw nested chain payload -> typed, sorted [`ChainSnapshot`].

use std::cmp::Reverse;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ChainError;
use crate::types::{ExpiryCycle, OptionContract, OptionRight};

/// Nested option chain as delivered by the market data collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawChain {
    pub symbol: String,
    pub as_of: DateTime<Utc>,
    pub expirations: Vec<RawExpiration>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawExpiration {
    pub expiration_date: NaiveDate,
    /// Source listing flag ("Regular", "Weekly", "Quarterly", "EOM", ...), if provided.
    #[serde(default)]
    pub expiration_type: Option<String>,
    pub strikes: Vec<RawStrike>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStrike {
    pub strike_price: Decimal,
    #[serde(default)]
    pub call: Option<RawQuote>,
    #[serde(default)]
    pub put: Option<RawQuote>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawQuote {
    pub bid: Decimal,
    pub ask: Decimal,
    #[serde(default)]
    pub delta: Option<f64>,
    #[serde(default)]
    pub gamma: Option<f64>,
    #[serde(default)]
    pub open_interest: Option<u64>,
}

/// All contracts of one expiration, sorted by right then strike.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expiration {
    pub date: NaiveDate,
    pub dte: i64,
    pub cycle: ExpiryCycle,
    /// Unique strikes, ascending.
    pub strikes: Vec<Decimal>,
    pub contracts: Vec<OptionContract>,
}

impl Expiration {
    /// Contracts of one right, ascending by strike.
    pub fn side(&self, right: OptionRight) -> impl Iterator<Item = &OptionContract> + '_ {
        self.contracts.iter().filter(move |c| c.right == right)
    }

    pub fn contract(&self, right: OptionRight, strike: Decimal) -> Option<&OptionContract> {
        self.side(right).find(|c| c.strike == strike)
    }

    /// Smallest gap between adjacent strikes, `None` with fewer than two strikes.
    pub fn strike_increment(&self) -> Option<Decimal> {
        self.strikes
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .filter(|gap| *gap > Decimal::ZERO)
            .min()
    }

    pub const fn is_monthly(&self) -> bool {
        matches!(self.cycle, ExpiryCycle::Monthly)
    }
}

/// Normalized, immutable view of one chain fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub symbol: String,
    pub as_of: DateTime<Utc>,
    pub spot: Decimal,
    /// Ascending by date.
    pub expirations: Vec<Expiration>,
}

impl ChainSnapshot {
    /// Picks the monthly expiration closest to `target_dte`.
    ///
    /// Ties go to the later expiration so entries never start with less time than targeted.
    /// Weekly expirations are never considered.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::NoEligibleExpiration`] when the chain has no monthly expiration.
    pub fn working_expiration(&self, target_dte: i64) -> Result<&Expiration, ChainError> {
        self.expirations
            .iter()
            .filter(|exp| exp.is_monthly())
            .min_by_key(|exp| ((exp.dte - target_dte).abs(), Reverse(exp.dte)))
            .ok_or_else(|| ChainError::NoEligibleExpiration {
                symbol: self.symbol.clone(),
            })
    }

    /// Every contract whose expiration is within `0..=max_dte` days.
    pub fn contracts_within(&self, max_dte: i64) -> impl Iterator<Item = &OptionContract> + '_ {
        self.expirations
            .iter()
            .filter(move |exp| (0..=max_dte).contains(&exp.dte))
            .flat_map(|exp| exp.contracts.iter())
    }

    pub fn contract_count(&self) -> usize {
        self.expirations.iter().map(|exp| exp.contracts.len()).sum()
    }
}

/// Third Friday of the month: the standard monthly expiration date.
pub fn is_standard_monthly(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Fri && (15..=21).contains(&date.day())
}

/// Classifies an expiration. A source flag always wins; the calendar rule applies only
/// when the source gives none.
pub fn classify_expiration(date: NaiveDate, source_flag: Option<&str>) -> ExpiryCycle {
    match source_flag.map(str::to_ascii_lowercase).as_deref() {
        Some("regular" | "monthly") => ExpiryCycle::Monthly,
        Some(_) => ExpiryCycle::Weekly,
        None if is_standard_monthly(date) => ExpiryCycle::Monthly,
        None => ExpiryCycle::Weekly,
    }
}

/// Converts a raw chain payload into a [`ChainSnapshot`].
///
/// Expirations already past the as-of date are dropped.
///
/// # Errors
///
/// Returns a malformed-input [`ChainError`] when the spot is not positive, the payload has no
/// contracts, a quote is negative or crossed, or a strike repeats within an expiration.
pub fn normalize(raw: &RawChain, spot: Decimal) -> Result<ChainSnapshot, ChainError> {
    if spot <= Decimal::ZERO {
        return Err(ChainError::InvalidSpot {
            symbol: raw.symbol.clone(),
            spot,
        });
    }

    let total_contracts: usize = raw
        .expirations
        .iter()
        .flat_map(|exp| exp.strikes.iter())
        .map(|s| usize::from(s.call.is_some()) + usize::from(s.put.is_some()))
        .sum();
    if total_contracts == 0 {
        return Err(ChainError::EmptyChain {
            symbol: raw.symbol.clone(),
        });
    }

    let today = raw.as_of.date_naive();
    let mut expirations = Vec::with_capacity(raw.expirations.len());

    for raw_exp in &raw.expirations {
        let dte = (raw_exp.expiration_date - today).num_days();
        if dte < 0 {
            debug!(
                symbol = raw.symbol,
                expiration = %raw_exp.expiration_date,
                "Dropping expired expiration"
            );
            continue;
        }
        expirations.push(normalize_expiration(&raw.symbol, raw_exp, dte)?);
    }

    expirations.sort_by_key(|exp| exp.date);

    Ok(ChainSnapshot {
        symbol: raw.symbol.clone(),
        as_of: raw.as_of,
        spot,
        expirations,
    })
}

fn normalize_expiration(
    symbol: &str,
    raw: &RawExpiration,
    dte: i64,
) -> Result<Expiration, ChainError> {
    let mut strikes: Vec<Decimal> = raw.strikes.iter().map(|s| s.strike_price).collect();
    strikes.sort();
    if let Some(pair) = strikes.windows(2).find(|pair| pair[0] == pair[1]) {
        return Err(ChainError::DuplicateStrike {
            symbol: symbol.to_string(),
            expiration: raw.expiration_date,
            strike: pair[0],
        });
    }

    let mut contracts = Vec::with_capacity(raw.strikes.len() * 2);
    for strike in &raw.strikes {
        let sides = [(OptionRight::Call, &strike.call), (OptionRight::Put, &strike.put)];
        for (right, quote) in sides {
            let Some(quote) = quote else { continue };
            let contract = OptionContract {
                expiration: raw.expiration_date,
                strike: strike.strike_price,
                right,
                bid: quote.bid,
                ask: quote.ask,
                delta: quote.delta,
                gamma: quote.gamma,
                open_interest: quote.open_interest,
            };
            if quote.bid < Decimal::ZERO || quote.ask < Decimal::ZERO || quote.ask < quote.bid {
                return Err(ChainError::InvalidQuote {
                    contract: format!("{symbol} {}", contract.display_name()),
                    bid: quote.bid,
                    ask: quote.ask,
                });
            }
            contracts.push(contract);
        }
    }
    contracts.sort_by(|a, b| {
        (a.right == OptionRight::Put)
            .cmp(&(b.right == OptionRight::Put))
            .then(a.strike.cmp(&b.strike))
    });

    Ok(Expiration {
        date: raw.expiration_date,
        dte,
        cycle: classify_expiration(raw.expiration_date, raw.expiration_type.as_deref()),
        strikes,
        contracts,
    })
}
