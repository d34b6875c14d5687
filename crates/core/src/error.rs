use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while turning a raw chain payload into a [`crate::ChainSnapshot`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    /// The payload carried no contracts at all.
    #[error("chain for {symbol} contains no contracts")]
    EmptyChain { symbol: String },

    /// Spot price must be strictly positive.
    #[error("invalid spot price {spot} for {symbol}")]
    InvalidSpot { symbol: String, spot: Decimal },

    /// Negative prices or a crossed market.
    #[error("invalid quote for {contract}: bid {bid}, ask {ask}")]
    InvalidQuote {
        contract: String,
        bid: Decimal,
        ask: Decimal,
    },

    /// The same strike listed twice within one expiration.
    #[error("duplicate strike {strike} in {expiration} for {symbol}")]
    DuplicateStrike {
        symbol: String,
        expiration: chrono::NaiveDate,
        strike: Decimal,
    },

    /// No monthly expiration to trade. Recoverable: the symbol yields no candidates.
    #[error("no eligible monthly expiration for {symbol}")]
    NoEligibleExpiration { symbol: String },
}

impl ChainError {
    /// Malformed input is a hard failure; everything else is a screening outcome.
    pub const fn is_malformed(&self) -> bool {
        !matches!(self, Self::NoEligibleExpiration { .. })
    }
}
