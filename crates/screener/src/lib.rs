//! Short-premium strategy screening.
//!
//! Builds put/call vertical credit spreads and iron condors from a normalized chain,
//! filters them by width and credit rules, and merges in dealer gamma context.
//!
//! The pure pieces ([`build_candidates`], [`enrich`]) take an immutable snapshot and hold no
//! state. [`Screener`] wraps them in a per-cycle, bounded-concurrency pipeline over a
//! [`MarketDataSource`].

pub mod builder;
pub mod enrich;
pub mod pipeline;
pub mod policy;
pub mod types;

pub use builder::{build_candidates, select_short};
pub use enrich::enrich;
pub use pipeline::{
    evaluate, CycleSummary, MarketDataSource, Screener, SymbolInputs, SymbolOutcome, SymbolReport,
};
pub use policy::{credit_meets_minimum, WidthPolicy};
pub use types::{
    Candidate, CandidateSet, GexContext, GexWarning, IronCondorCandidate, Leg, LegRef, LegSide,
    SkipReason, SpreadCandidate, StrategyTarget, WarningReason,
};
