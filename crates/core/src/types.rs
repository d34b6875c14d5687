//! Core option types shared by the screener, the GEX analyzer and the position manager.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Options contract right (call or put).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionRight {
    Call,
    Put,
}

impl std::fmt::Display for OptionRight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "C"),
            Self::Put => write!(f, "P"),
        }
    }
}

/// Listing cycle of an expiration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpiryCycle {
    Monthly,
    Weekly,
}

/// One option from a chain snapshot.
///
/// Greeks and open interest are optional: the upstream feed does not always deliver them
/// and a missing value must stay missing rather than read as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionContract {
    pub expiration: NaiveDate,
    pub strike: Decimal,
    pub right: OptionRight,
    pub bid: Decimal,
    pub ask: Decimal,
    pub delta: Option<f64>,
    pub gamma: Option<f64>,
    pub open_interest: Option<u64>,
}

impl OptionContract {
    /// Midpoint of the quote.
    pub fn mid(&self) -> Decimal {
        (self.bid + self.ask) / Decimal::TWO
    }

    /// True when the contract has a two-sided or one-sided price to trade against.
    pub fn has_quote(&self) -> bool {
        !(self.bid.is_zero() && self.ask.is_zero())
    }

    /// Absolute delta, if the feed supplied one.
    pub fn abs_delta(&self) -> Option<f64> {
        self.delta.map(f64::abs)
    }

    /// Human-readable contract description (e.g., "480P 2026-03-20").
    pub fn display_name(&self) -> String {
        format!("{}{} {}", self.strike, self.right, self.expiration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn contract(bid: Decimal, ask: Decimal) -> OptionContract {
        OptionContract {
            expiration: NaiveDate::from_ymd_opt(2026, 3, 20).unwrap(),
            strike: dec!(480),
            right: OptionRight::Put,
            bid,
            ask,
            delta: Some(-0.31),
            gamma: None,
            open_interest: None,
        }
    }

    #[test]
    fn mid_is_average_of_bid_and_ask() {
        assert_eq!(contract(dec!(1.10), dec!(1.30)).mid(), dec!(1.20));
    }

    #[test]
    fn zero_bid_and_ask_has_no_quote() {
        assert!(!contract(dec!(0), dec!(0)).has_quote());
        assert!(contract(dec!(0), dec!(0.05)).has_quote());
    }

    #[test]
    fn display_name_and_abs_delta() {
        let c = contract(dec!(1), dec!(1.2));
        assert_eq!(c.display_name(), "480P 2026-03-20");
        assert_eq!(c.abs_delta(), Some(0.31));
    }
}
