//! Attaches gamma context to candidates and flags short legs beyond the walls.

use premium_core::OptionRight;
use premium_gex::GexSnapshot;
use tracing::debug;

use crate::types::{Candidate, GexContext, GexWarning, StrategyTarget, WarningReason};

/// Merges a GEX profile into each candidate.
///
/// A missing or non-authoritative profile leaves every candidate without context; screening
/// is never blocked on gamma data.
pub fn enrich(candidates: Vec<Candidate>, gex: Option<&GexSnapshot>) -> Vec<StrategyTarget> {
    let Some(gex) = gex.filter(|g| g.is_authoritative()) else {
        debug!("GEX unavailable, passing candidates through");
        return candidates
            .into_iter()
            .map(|candidate| StrategyTarget { candidate, gex: None })
            .collect();
    };

    candidates
        .into_iter()
        .map(|candidate| {
            let warnings = wall_warnings(&candidate, gex);
            StrategyTarget {
                gex: Some(GexContext {
                    regime: gex.regime,
                    signal: gex.signal,
                    call_wall: gex.call_wall,
                    put_wall: gex.put_wall,
                    warnings,
                }),
                candidate,
            }
        })
        .collect()
}

fn wall_warnings(candidate: &Candidate, gex: &GexSnapshot) -> Vec<GexWarning> {
    let mut warnings = Vec::new();

    for leg in candidate.short_legs() {
        match (leg.right, gex.put_wall, gex.call_wall) {
            (OptionRight::Put, Some(put_wall), _) if leg.strike < put_wall => {
                warnings.push(GexWarning {
                    leg: leg.reference(),
                    reason: WarningReason::ShortPutBelowPutWall { put_wall },
                });
            }
            (OptionRight::Call, _, Some(call_wall)) if leg.strike > call_wall => {
                warnings.push(GexWarning {
                    leg: leg.reference(),
                    reason: WarningReason::ShortCallAboveCallWall { call_wall },
                });
            }
            _ => {}
        }
    }

    warnings
}
