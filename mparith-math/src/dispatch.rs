//! Promotion ladder
//!
//! A binary operation runs on the most specific path both operand kinds are
//! compatible with: integer, then rational, then real, then complex. The path
//! is a function of the two kinds only. Operations that do not exist on every
//! path cap the ladder; operands that only fit above the cap are a type error.

use log::trace;

use crate::error::{NumError, NumResult};
use crate::operand::Operand;
use crate::value::Kind;

/// Evaluation path of a binary operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Path {
    /// Exact integer arithmetic
    Integer,
    /// Exact rational arithmetic
    Rational,
    /// Rounded real arithmetic
    Real,
    /// Rounded complex arithmetic
    Complex,
}

impl Path {
    /// Whether an operand of this kind can take part in this path
    pub fn accepts(self, kind: Kind) -> bool {
        match self {
            Path::Integer => kind == Kind::Integer,
            Path::Rational => matches!(kind, Kind::Integer | Kind::Rational),
            Path::Real => kind != Kind::Complex,
            Path::Complex => true,
        }
    }
}

/// The most specific path accepting both kinds
pub fn ladder(a: Kind, b: Kind) -> Path {
    use Kind::*;

    match (a, b) {
        (Integer, Integer) => Path::Integer,
        (Integer | Rational, Integer | Rational) => Path::Rational,
        (Complex, _) | (_, Complex) => Path::Complex,
        (Real, _) | (_, Real) => Path::Real,
    }
}

/// Select the path for an operation that exists up to `ceiling`
pub fn select(a: Kind, b: Kind, ceiling: Path, op: &str) -> NumResult<Path> {
    let path = ladder(a, b);
    if path > ceiling {
        return Err(NumError::TypeMismatch(format!(
            "{} not supported for {} and {} operands",
            op, a, b
        )));
    }
    trace!("{}: {} x {} -> {:?} path", op, a, b, path);
    Ok(path)
}

/// Select the path for two operands
pub fn select_for(a: &Operand<'_>, b: &Operand<'_>, ceiling: Path, op: &str) -> NumResult<Path> {
    select(a.kind(), b.kind(), ceiling, op)
}
