//! Operation arguments
//!
//! An [`Operand`] is a borrowed view of anything an operation accepts: a
//! [`NumericValue`] or one of the host types (machine integer, double,
//! decimal) that the ladder treats as an integer, real or rational.

use std::borrow::Cow;
use std::cmp::Ordering;

use num_bigint::BigInt;
use num_rational::BigRational;
use rug::Float;
use rust_decimal::Decimal;

use crate::convert::{
    bigint_to_rug, decimal_to_rational, f64_to_float, i64_to_float, integer_to_float,
    rational_to_rug,
};
use crate::value::{Kind, NumericValue};

/// An argument to a numeric operation
#[derive(Debug, Clone, Copy)]
pub enum Operand<'a> {
    /// Host machine integer
    Int(i64),
    /// Host double
    Float(f64),
    /// Host decimal, treated as an exact rational
    Decimal(Decimal),
    /// A numeric value
    Value(&'a NumericValue),
}

impl<'a> Operand<'a> {
    /// The kind this operand counts as on the promotion ladder
    pub fn kind(&self) -> Kind {
        match self {
            Operand::Int(_) => Kind::Integer,
            Operand::Float(_) => Kind::Real,
            Operand::Decimal(_) => Kind::Rational,
            Operand::Value(v) => v.kind(),
        }
    }

    /// Whether the operand is a NaN (in any component)
    pub fn is_nan(&self) -> bool {
        match self {
            Operand::Float(f) => f.is_nan(),
            Operand::Value(v) => v.is_nan(),
            Operand::Int(_) | Operand::Decimal(_) => false,
        }
    }

    pub(crate) fn to_bigint(self) -> Option<BigInt> {
        match self {
            Operand::Int(i) => Some(BigInt::from(i)),
            Operand::Value(NumericValue::Integer(i)) => Some(i.clone()),
            _ => None,
        }
    }

    pub(crate) fn to_rational(self) -> Option<BigRational> {
        match self {
            Operand::Int(i) => Some(BigRational::from_integer(BigInt::from(i))),
            Operand::Decimal(d) => Some(decimal_to_rational(&d)),
            Operand::Value(NumericValue::Integer(i)) => Some(BigRational::from_integer(i.clone())),
            Operand::Value(NumericValue::Rational(r)) => Some(r.clone()),
            _ => None,
        }
    }

    /// Lower to a real-path argument; `None` for complex operands
    pub(crate) fn real_arg(self) -> Option<RealArg<'a>> {
        let arg = match self {
            Operand::Int(i) => RealArg::Small(i),
            Operand::Float(f) => RealArg::Double(f),
            Operand::Decimal(d) => RealArg::Ratio(rational_to_rug(&decimal_to_rational(&d))),
            Operand::Value(NumericValue::Integer(i)) => RealArg::Big(bigint_to_rug(i)),
            Operand::Value(NumericValue::Rational(r)) => RealArg::Ratio(rational_to_rug(r)),
            Operand::Value(NumericValue::Real(r)) => RealArg::Float(Cow::Borrowed(r.as_float())),
            Operand::Value(NumericValue::Complex(_)) => return None,
        };
        Some(arg)
    }

    pub(crate) fn scalar(self) -> Option<Scalar> {
        let scalar = match self {
            Operand::Int(i) => Scalar::Exact(rug::Rational::from(i)),
            Operand::Float(f) => Scalar::Float(f64_to_float(f)),
            Operand::Decimal(d) => Scalar::Exact(rational_to_rug(&decimal_to_rational(&d))),
            Operand::Value(NumericValue::Integer(i)) => Scalar::Exact(rug::Rational::from(bigint_to_rug(i))),
            Operand::Value(NumericValue::Rational(r)) => Scalar::Exact(rational_to_rug(r)),
            Operand::Value(NumericValue::Real(r)) => Scalar::Float(r.as_float().clone()),
            Operand::Value(NumericValue::Complex(_)) => return None,
        };
        Some(scalar)
    }

    pub(crate) fn complex_parts(self) -> (Scalar, Scalar) {
        match self {
            Operand::Value(NumericValue::Complex(c)) => (
                Scalar::Float(c.as_complex().real().clone()),
                Scalar::Float(c.as_complex().imag().clone()),
            ),
            other => (
                other.scalar().unwrap_or_else(|| Scalar::Exact(rug::Rational::new())),
                Scalar::Exact(rug::Rational::new()),
            ),
        }
    }
}

impl<'a> From<i64> for Operand<'a> {
    fn from(value: i64) -> Self {
        Operand::Int(value)
    }
}

impl<'a> From<i32> for Operand<'a> {
    fn from(value: i32) -> Self {
        Operand::Int(i64::from(value))
    }
}

impl<'a> From<f64> for Operand<'a> {
    fn from(value: f64) -> Self {
        Operand::Float(value)
    }
}

impl<'a> From<Decimal> for Operand<'a> {
    fn from(value: Decimal) -> Self {
        Operand::Decimal(value)
    }
}

impl<'a> From<&'a NumericValue> for Operand<'a> {
    fn from(value: &'a NumericValue) -> Self {
        Operand::Value(value)
    }
}

/// A real-path argument in the cheapest form the back end accepts
#[derive(Debug, Clone)]
pub(crate) enum RealArg<'a> {
    Float(Cow<'a, Float>),
    Small(i64),
    Big(rug::Integer),
    Ratio(rug::Rational),
    Double(f64),
}

impl<'a> RealArg<'a> {
    /// Convert to a float; only rationals are rounded, at `prec` bits
    pub(crate) fn to_float(&self, prec: u32) -> Cow<'_, Float> {
        match self {
            RealArg::Float(f) => Cow::Borrowed(f.as_ref()),
            RealArg::Small(i) => Cow::Owned(i64_to_float(*i)),
            RealArg::Big(i) => Cow::Owned(integer_to_float(i)),
            RealArg::Ratio(r) => Cow::Owned(Float::with_val(prec, r)),
            RealArg::Double(d) => Cow::Owned(f64_to_float(*d)),
        }
    }

    pub(crate) fn is_nan(&self) -> bool {
        match self {
            RealArg::Float(f) => f.is_nan(),
            RealArg::Double(d) => d.is_nan(),
            _ => false,
        }
    }

    /// Strictly negative; NaN and zeros are not
    pub(crate) fn is_negative(&self) -> bool {
        match self {
            RealArg::Float(f) => f.cmp0() == Some(Ordering::Less),
            RealArg::Small(i) => *i < 0,
            RealArg::Big(i) => i.cmp0() == Ordering::Less,
            RealArg::Ratio(r) => r.cmp0() == Ordering::Less,
            RealArg::Double(d) => *d < 0.0,
        }
    }

    pub(crate) fn is_integer(&self) -> bool {
        match self {
            RealArg::Float(f) => f.is_integer(),
            RealArg::Small(_) | RealArg::Big(_) => true,
            RealArg::Ratio(r) => *r.denom() == 1,
            RealArg::Double(d) => d.is_finite() && d.fract() == 0.0,
        }
    }
}

/// A real quantity held either exactly or as a float
#[derive(Debug, Clone)]
pub(crate) enum Scalar {
    Exact(rug::Rational),
    Float(Float),
}

impl Scalar {
    pub(crate) fn compare(&self, other: &Scalar) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Exact(a), Scalar::Exact(b)) => Some(a.cmp(b)),
            (Scalar::Float(a), Scalar::Float(b)) => a.partial_cmp(b),
            (Scalar::Float(a), Scalar::Exact(b)) => a.partial_cmp(b),
            (Scalar::Exact(a), Scalar::Float(b)) => b.partial_cmp(a).map(Ordering::reverse),
        }
    }
}

/// Value equality across kinds; NaN is never equal to anything
pub(crate) fn values_equal(a: &Operand<'_>, b: &Operand<'_>) -> bool {
    let (a_re, a_im) = a.complex_parts();
    let (b_re, b_im) = b.complex_parts();
    a_re.compare(&b_re) == Some(Ordering::Equal) && a_im.compare(&b_im) == Some(Ordering::Equal)
}
