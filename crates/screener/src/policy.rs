//! Width and credit rules for vertical spreads.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Allowed spread widths, derived from an expiration's strike increment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum WidthPolicy {
    /// $1 strikes: at least `min` wide.
    AtLeast { min: Decimal },
    /// $5 strikes: at most `max` wide.
    AtMost { max: Decimal },
    /// Any other increment: a whole number of increments, no upper bound.
    MultipleOf { increment: Decimal },
}

impl WidthPolicy {
    pub fn from_increment(increment: Decimal) -> Self {
        if increment == Decimal::ONE {
            Self::AtLeast {
                min: Decimal::from(3),
            }
        } else if increment == Decimal::from(5) {
            Self::AtMost {
                max: Decimal::from(5),
            }
        } else {
            Self::MultipleOf { increment }
        }
    }

    pub fn allows(&self, width: Decimal) -> bool {
        if width <= Decimal::ZERO {
            return false;
        }
        match *self {
            Self::AtLeast { min } => width >= min,
            Self::AtMost { max } => width <= max,
            Self::MultipleOf { increment } => {
                !increment.is_zero() && (width % increment).is_zero()
            }
        }
    }
}

/// `credit / width >= min_ratio`.
///
/// A ratio equal to `1 / 3` (the default, which `Decimal` can only hold rounded) is compared
/// exactly as `credit * 3 >= width`; any other ratio as `credit >= width * min_ratio`.
pub fn credit_meets_minimum(credit: Decimal, width: Decimal, min_ratio: Decimal) -> bool {
    if credit <= Decimal::ZERO || width <= Decimal::ZERO {
        return false;
    }
    let three = Decimal::from(3);
    if min_ratio == Decimal::ONE / three {
        credit * three >= width
    } else {
        credit >= width * min_ratio
    }
}
