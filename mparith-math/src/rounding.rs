//! Rounding modes and rounding return codes

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use rug::float::Round;
use serde::{Deserialize, Serialize};

use crate::error::NumError;

/// Rounding direction used by real and complex results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Round to nearest, ties to even
    #[default]
    Nearest,
    /// Round toward zero
    Zero,
    /// Round toward +Infinity
    Up,
    /// Round toward -Infinity
    Down,
    /// Round away from zero (real results only)
    AwayZero,
}

impl RoundingMode {
    /// The back end's rounding parameter
    pub fn to_round(self) -> Round {
        match self {
            RoundingMode::Nearest => Round::Nearest,
            RoundingMode::Zero => Round::Zero,
            RoundingMode::Up => Round::Up,
            RoundingMode::Down => Round::Down,
            RoundingMode::AwayZero => Round::AwayZero,
        }
    }

    /// Whether the mode may be used for a complex component
    pub fn is_complex_mode(self) -> bool {
        self != RoundingMode::AwayZero
    }

    /// Name used in context representations
    pub fn name(self) -> &'static str {
        match self {
            RoundingMode::Nearest => "RoundToNearest",
            RoundingMode::Zero => "RoundToZero",
            RoundingMode::Up => "RoundUp",
            RoundingMode::Down => "RoundDown",
            RoundingMode::AwayZero => "RoundAwayZero",
        }
    }

    /// Whether a result of the given sign rounded in this mode moves away
    /// from zero when it cannot be represented
    pub(crate) fn rounds_away(self, negative: bool) -> bool {
        match self {
            RoundingMode::Nearest | RoundingMode::AwayZero => true,
            RoundingMode::Zero => false,
            RoundingMode::Up => !negative,
            RoundingMode::Down => negative,
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RoundingMode {
    type Err = NumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RoundToNearest" | "Nearest" => Ok(RoundingMode::Nearest),
            "RoundToZero" | "Zero" => Ok(RoundingMode::Zero),
            "RoundUp" | "Up" => Ok(RoundingMode::Up),
            "RoundDown" | "Down" => Ok(RoundingMode::Down),
            "RoundAwayZero" | "AwayZero" => Ok(RoundingMode::AwayZero),
            other => Err(NumError::ValueOutOfDomain(format!("invalid value for round mode: {}", other))),
        }
    }
}

/// Direction in which a rounded result differs from the exact value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReturnCode {
    /// The result is exact
    #[default]
    Exact,
    /// The result is greater than the exact value
    RoundedUp,
    /// The result is less than the exact value
    RoundedDown,
    /// The result is NaN and has no ordering with respect to the exact value
    NotComparable,
}

impl ReturnCode {
    /// Interpret a back-end ternary value
    pub fn from_ordering(ord: Ordering) -> Self {
        match ord {
            Ordering::Equal => ReturnCode::Exact,
            Ordering::Greater => ReturnCode::RoundedUp,
            Ordering::Less => ReturnCode::RoundedDown,
        }
    }

    /// The back-end ternary value; `NotComparable` maps to `Equal`
    pub fn to_ordering(self) -> Ordering {
        match self {
            ReturnCode::RoundedUp => Ordering::Greater,
            ReturnCode::RoundedDown => Ordering::Less,
            ReturnCode::Exact | ReturnCode::NotComparable => Ordering::Equal,
        }
    }

    /// Whether rounding changed the value
    pub fn is_inexact(self) -> bool {
        matches!(self, ReturnCode::RoundedUp | ReturnCode::RoundedDown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_names() {
        assert_eq!("RoundUp".parse::<RoundingMode>().unwrap(), RoundingMode::Up);
        assert_eq!("Zero".parse::<RoundingMode>().unwrap(), RoundingMode::Zero);
        assert!(matches!("sideways".parse::<RoundingMode>(), Err(NumError::ValueOutOfDomain(_))));
    }

    #[test]
    fn test_away_zero_not_complex() {
        assert!(!RoundingMode::AwayZero.is_complex_mode());
        assert!(RoundingMode::Down.is_complex_mode());
    }

    #[test]
    fn test_return_code_round_trip() {
        for ord in [Ordering::Less, Ordering::Equal, Ordering::Greater] {
            assert_eq!(ReturnCode::from_ordering(ord).to_ordering(), ord);
        }
        assert!(!ReturnCode::NotComparable.is_inexact());
    }

    #[test]
    fn test_rounds_away() {
        assert!(RoundingMode::Up.rounds_away(false));
        assert!(!RoundingMode::Up.rounds_away(true));
        assert!(RoundingMode::Down.rounds_away(true));
        assert!(!RoundingMode::Zero.rounds_away(false));
    }
}
