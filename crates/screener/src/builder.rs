//! Candidate construction: delta-matched short strike, narrowest valid long strike,
//! credit filter, iron condor assembly.

use premium_core::{ChainSnapshot, Expiration, OptionContract, OptionRight, ScreenerConfig};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::policy::{credit_meets_minimum, WidthPolicy};
use crate::types::{CandidateSet, IronCondorCandidate, Leg, LegSide, SkipReason, SpreadCandidate};

/// Screens one symbol's chain for put/call verticals and iron condors.
///
/// `ivr` is the externally computed IV rank; `None` means it was unavailable and the gate
/// is not applied.
pub fn build_candidates(
    chain: &ChainSnapshot,
    config: &ScreenerConfig,
    ivr: Option<f64>,
) -> CandidateSet {
    if let Some(ivr) = ivr.filter(|v| *v < config.min_ivr) {
        info!(
            symbol = chain.symbol,
            ivr,
            threshold = config.min_ivr,
            "IVR gate blocked symbol"
        );
        return CandidateSet::skipped(
            &chain.symbol,
            SkipReason::IvrGateBlocked {
                ivr,
                threshold: config.min_ivr,
            },
        );
    }

    let expiration = match chain.working_expiration(config.target_dte) {
        Ok(exp) => exp,
        Err(e) => {
            info!(symbol = chain.symbol, error = %e, "No working expiration");
            return CandidateSet::skipped(&chain.symbol, SkipReason::NoEligibleExpiration);
        }
    };

    let put_spread = build_vertical(chain, expiration, OptionRight::Put, config);
    let call_spread = build_vertical(chain, expiration, OptionRight::Call, config);

    let iron_condors = match (&put_spread, &call_spread) {
        (Some(put), Some(call)) => vec![IronCondorCandidate {
            put_spread: put.clone(),
            call_spread: call.clone(),
        }],
        _ => Vec::new(),
    };
    let verticals: Vec<SpreadCandidate> = [put_spread, call_spread].into_iter().flatten().collect();

    info!(
        symbol = chain.symbol,
        expiration = %expiration.date,
        dte = expiration.dte,
        verticals = verticals.len(),
        iron_condors = iron_condors.len(),
        "Candidate screening complete"
    );

    CandidateSet {
        symbol: chain.symbol.clone(),
        expiration: Some(expiration.date),
        dte: Some(expiration.dte),
        verticals,
        iron_condors,
        skip: None,
    }
}

/// Builds the vertical for one side, or `None` if any rule rejects it.
fn build_vertical(
    chain: &ChainSnapshot,
    expiration: &Expiration,
    right: OptionRight,
    config: &ScreenerConfig,
) -> Option<SpreadCandidate> {
    let Some(increment) = expiration.strike_increment() else {
        debug!(symbol = chain.symbol, %right, "Rejected: fewer than two strikes");
        return None;
    };
    let policy = WidthPolicy::from_increment(increment);

    let Some(short) = select_short(expiration, right, config.target_delta, chain.spot) else {
        debug!(symbol = chain.symbol, %right, "Rejected: no strike with a delta");
        return None;
    };

    let Some(long) = select_long(expiration, short, &policy) else {
        debug!(
            symbol = chain.symbol,
            %right,
            short_strike = %short.strike,
            ?policy,
            "Rejected: no long strike satisfies width policy"
        );
        return None;
    };

    let width = (short.strike - long.strike).abs();
    let credit = short.mid() - long.mid();
    if !credit_meets_minimum(credit, width, config.min_credit_ratio) {
        debug!(
            symbol = chain.symbol,
            %right,
            short_strike = %short.strike,
            long_strike = %long.strike,
            %credit,
            %width,
            "Rejected: credit below minimum fraction of width"
        );
        return None;
    }

    Some(SpreadCandidate {
        symbol: chain.symbol.clone(),
        expiration: expiration.date,
        dte: expiration.dte,
        right,
        short: leg(short, LegSide::Short),
        long: leg(long, LegSide::Long),
        width,
        credit,
    })
}

/// Strike whose absolute delta is nearest `target_delta`; ties go to the strike nearer spot,
/// then to the lower strike.
pub fn select_short(
    expiration: &Expiration,
    right: OptionRight,
    target_delta: f64,
    spot: Decimal,
) -> Option<&OptionContract> {
    expiration
        .side(right)
        .filter(|c| c.has_quote())
        .filter_map(|c| c.abs_delta().map(|delta| ((delta - target_delta).abs(), c)))
        .min_by(|(da, a), (db, b)| {
            da.total_cmp(db)
                .then_with(|| (a.strike - spot).abs().cmp(&(b.strike - spot).abs()))
                .then_with(|| a.strike.cmp(&b.strike))
        })
        .map(|(_, c)| c)
}

/// Walks further out of the money from `short` and returns the first (narrowest) quoted
/// strike whose width the policy accepts.
fn select_long<'a>(
    expiration: &'a Expiration,
    short: &OptionContract,
    policy: &WidthPolicy,
) -> Option<&'a OptionContract> {
    let further_out: Vec<&OptionContract> = match short.right {
        OptionRight::Put => expiration
            .side(OptionRight::Put)
            .filter(|c| c.strike < short.strike)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect(),
        OptionRight::Call => expiration
            .side(OptionRight::Call)
            .filter(|c| c.strike > short.strike)
            .collect(),
    };

    further_out
        .into_iter()
        .filter(|c| c.has_quote())
        .find(|c| policy.allows((short.strike - c.strike).abs()))
}

fn leg(contract: &OptionContract, side: LegSide) -> Leg {
    Leg {
        strike: contract.strike,
        side,
        right: contract.right,
        delta: contract.delta,
        price: contract.mid(),
    }
}
