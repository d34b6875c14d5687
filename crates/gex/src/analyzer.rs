//! Per-strike exposure, walls, zero-gamma interpolation and regime classification.

use std::collections::BTreeMap;

use premium_core::{ChainSnapshot, GexConfig, OptionRight};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::types::{GammaRegime, GexSignal, GexSnapshot, StrikeExposure};

/// Builds the gamma profile of `chain` from contracts expiring within `config.max_dte`.
///
/// Never fails: with fewer than two usable strikes the snapshot comes back with `error`
/// set and no levels.
pub fn analyze(chain: &ChainSnapshot, config: &GexConfig) -> GexSnapshot {
    let spot = chain.spot.to_f64().unwrap_or_default();
    let lower = spot * (1.0 - config.strike_range_pct);
    let upper = spot * (1.0 + config.strike_range_pct);
    // dollar gamma per 1% move
    let scale = config.contract_multiplier * spot * spot * 0.01;

    let mut strikes: BTreeMap<Decimal, StrikeExposure> = BTreeMap::new();
    for contract in chain.contracts_within(config.max_dte) {
        let strike = contract.strike.to_f64().unwrap_or_default();
        if strike < lower || strike > upper {
            continue;
        }
        let (Some(gamma), Some(oi)) = (contract.gamma, contract.open_interest) else {
            continue;
        };

        let exposure = gamma * oi as f64 * scale;
        let entry = strikes.entry(contract.strike).or_insert_with(|| StrikeExposure {
            strike: contract.strike,
            ..StrikeExposure::default()
        });
        match contract.right {
            OptionRight::Call => entry.call_gex += exposure,
            OptionRight::Put => entry.put_gex -= exposure,
        }
        entry.net_gex = entry.call_gex + entry.put_gex;
        entry.open_interest += oi;
    }

    if strikes.len() < 2 {
        warn!(
            symbol = chain.symbol,
            usable_strikes = strikes.len(),
            max_dte = config.max_dte,
            "Insufficient gamma data for GEX"
        );
        return GexSnapshot::failed(
            &chain.symbol,
            chain.spot,
            config.max_dte,
            format!(
                "insufficient gamma data: {} usable strike(s) within {} DTE",
                strikes.len(),
                config.max_dte
            ),
        );
    }

    let total_gex: f64 = strikes.values().map(|s| s.net_gex).sum();
    let (call_wall, put_wall) = find_walls(&strikes);
    let zero_gamma_level = zero_gamma(&strikes);
    let (regime, signal) = classify(total_gex, chain.spot, zero_gamma_level, config.pin_band_pct);
    let major_levels = strikes
        .values()
        .filter(|s| s.net_gex.abs() > config.major_level_threshold)
        .map(|s| s.strike)
        .collect();

    info!(
        symbol = chain.symbol,
        total_gex_m = total_gex / 1_000_000.0,
        call_wall = ?call_wall,
        put_wall = ?put_wall,
        zero_gamma = ?zero_gamma_level,
        %regime,
        signal = ?signal,
        "GEX profile computed"
    );

    GexSnapshot {
        symbol: chain.symbol.clone(),
        spot: chain.spot,
        max_dte: config.max_dte,
        strikes,
        total_gex,
        call_wall,
        put_wall,
        zero_gamma_level,
        regime,
        signal,
        major_levels,
        error: None,
    }
}

/// Call wall: largest positive net exposure. Put wall: most negative. Ties keep the lowest strike.
fn find_walls(strikes: &BTreeMap<Decimal, StrikeExposure>) -> (Option<Decimal>, Option<Decimal>) {
    let mut call_wall: Option<&StrikeExposure> = None;
    let mut put_wall: Option<&StrikeExposure> = None;

    // ascending iteration + strict comparison keeps the lowest strike on ties
    for s in strikes.values() {
        if s.net_gex > 0.0 && call_wall.map_or(true, |w| s.net_gex > w.net_gex) {
            call_wall = Some(s);
        }
        if s.net_gex < 0.0 && put_wall.map_or(true, |w| s.net_gex < w.net_gex) {
            put_wall = Some(s);
        }
    }

    (call_wall.map(|w| w.strike), put_wall.map(|w| w.strike))
}

/// Price where cumulative net exposure (lowest strike upward) first changes sign,
/// linearly interpolated between the two bracketing strikes.
///
/// A cumulative sum that lands exactly on zero at a strike and then continues to the other
/// sign crosses at that strike. Touching zero and returning to the same sign is no crossing.
fn zero_gamma(strikes: &BTreeMap<Decimal, StrikeExposure>) -> Option<Decimal> {
    let mut cumulative = 0.0;
    // last strike with a non-zero running total
    let mut anchor: Option<(Decimal, f64)> = None;
    // first strike since the anchor where the running total sat exactly on zero
    let mut touched_zero: Option<Decimal> = None;

    for s in strikes.values() {
        cumulative += s.net_gex;
        if cumulative == 0.0 {
            if anchor.is_some() && touched_zero.is_none() {
                touched_zero = Some(s.strike);
            }
            continue;
        }

        if let Some((prev_strike, prev_cum)) = anchor {
            if prev_cum.signum() != cumulative.signum() {
                if let Some(level) = touched_zero {
                    return Some(level);
                }
                let fraction = prev_cum / (prev_cum - cumulative);
                let fraction = Decimal::try_from(fraction).ok()?;
                return Some(prev_strike + (s.strike - prev_strike) * fraction);
            }
        }
        anchor = Some((s.strike, cumulative));
        touched_zero = None;
    }

    None
}

/// Regime from the sign of total exposure; spot inside `pin_band_pct` of the zero-gamma
/// level overrides the signal with [`GexSignal::MagnetPin`].
pub fn classify(
    total_gex: f64,
    spot: Decimal,
    zero_gamma_level: Option<Decimal>,
    pin_band_pct: f64,
) -> (GammaRegime, Option<GexSignal>) {
    let (regime, signal) = if total_gex > 0.0 {
        (GammaRegime::Positive, Some(GexSignal::MeanReversion))
    } else if total_gex < 0.0 {
        (GammaRegime::Negative, Some(GexSignal::Acceleration))
    } else {
        (GammaRegime::Unknown, None)
    };

    let pinned = zero_gamma_level
        .filter(|_| !spot.is_zero())
        .and_then(|level| ((spot - level).abs() / spot).to_f64())
        .is_some_and(|distance| distance <= pin_band_pct);

    if pinned {
        (regime, Some(GexSignal::MagnetPin))
    } else {
        (regime, signal)
    }
}
