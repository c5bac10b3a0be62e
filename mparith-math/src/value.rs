//! Numeric values
//!
//! [`NumericValue`] is the closed set of kinds every operation produces:
//! exact integers and rationals, and rounded reals and complex numbers. A
//! rounded value remembers the direction in which it was rounded and the
//! rounding mode that produced it.

use std::cmp::Ordering;
use std::fmt;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;
use rug::{Complex, Float};

use crate::context::{prec_max, prec_min};
use crate::error::{NumError, NumResult};
use crate::operand::{values_equal, Operand};
use crate::rounding::{ReturnCode, RoundingMode};

/// Kinds of numeric values, ordered from most to least specific
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// Arbitrary-precision integer
    Integer,
    /// Exact rational
    Rational,
    /// Rounded binary floating point
    Real,
    /// Pair of rounded reals
    Complex,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Integer => "integer",
            Kind::Rational => "rational",
            Kind::Real => "real",
            Kind::Complex => "complex",
        };
        f.write_str(name)
    }
}

pub(crate) fn check_prec(prec: u32) -> NumResult<u32> {
    if prec < prec_min() || prec > prec_max() {
        Err(NumError::ValueOutOfDomain(format!("invalid precision {}", prec)))
    } else {
        Ok(prec)
    }
}

/// An arbitrary-precision binary floating point value
#[derive(Debug, Clone)]
pub struct Real {
    value: Float,
    rc: ReturnCode,
    round: RoundingMode,
}

impl Real {
    /// Wrap an exactly known float
    pub fn new(value: Float) -> Self {
        Self {
            value,
            rc: ReturnCode::Exact,
            round: RoundingMode::Nearest,
        }
    }

    pub(crate) fn rounded(value: Float, ord: Ordering, round: RoundingMode) -> Self {
        let rc = if value.is_nan() {
            ReturnCode::NotComparable
        } else {
            ReturnCode::from_ordering(ord)
        };
        Self { value, rc, round }
    }

    /// Exact real for a machine double
    pub fn from_f64(value: f64) -> Self {
        Self::new(Float::with_val(f64::MANTISSA_DIGITS, value))
    }

    /// Round a machine double to the given precision
    pub fn with_prec(prec: u32, value: f64) -> NumResult<Self> {
        let prec = check_prec(prec)?;
        let (value, ord) = Float::with_val_round(prec, value, rug::float::Round::Nearest);
        Ok(Self::rounded(value, ord, RoundingMode::Nearest))
    }

    /// Parse a decimal string, rounding to nearest at the given precision
    pub fn parse(text: &str, prec: u32) -> NumResult<Self> {
        let prec = check_prec(prec)?;
        let parsed = Float::parse(text)
            .map_err(|e| NumError::ValueOutOfDomain(format!("invalid real '{}': {}", text, e)))?;
        let (value, ord) = Float::with_val_round(prec, parsed, rug::float::Round::Nearest);
        Ok(Self::rounded(value, ord, RoundingMode::Nearest))
    }

    /// Not-a-number at the given precision
    pub fn nan(prec: u32) -> NumResult<Self> {
        let value = Float::with_val(check_prec(prec)?, rug::float::Special::Nan);
        Ok(Self::rounded(value, Ordering::Equal, RoundingMode::Nearest))
    }

    /// Signed infinity at the given precision
    pub fn infinity(prec: u32, negative: bool) -> NumResult<Self> {
        let special = if negative {
            rug::float::Special::NegInfinity
        } else {
            rug::float::Special::Infinity
        };
        Ok(Self::new(Float::with_val(check_prec(prec)?, special)))
    }

    /// The underlying float
    pub fn as_float(&self) -> &Float {
        &self.value
    }

    /// Unwrap into the underlying float
    pub fn into_float(self) -> Float {
        self.value
    }

    /// Precision in bits
    pub fn prec(&self) -> u32 {
        self.value.prec()
    }

    /// Direction of the rounding that produced this value
    pub fn rc(&self) -> ReturnCode {
        self.rc
    }

    /// Rounding mode that produced this value
    pub fn round_mode(&self) -> RoundingMode {
        self.round
    }

    /// Check for NaN
    pub fn is_nan(&self) -> bool {
        self.value.is_nan()
    }

    /// Check for either infinity
    pub fn is_infinite(&self) -> bool {
        self.value.is_infinite()
    }

    /// Check for a finite value
    pub fn is_finite(&self) -> bool {
        self.value.is_finite()
    }

    /// Check for either zero
    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Check the sign bit
    pub fn is_sign_negative(&self) -> bool {
        self.value.is_sign_negative()
    }

    /// Nearest machine double
    pub fn to_f64(&self) -> f64 {
        self.value.to_f64()
    }

    /// Re-round to another precision
    pub fn round_to(&self, prec: u32, mode: RoundingMode) -> NumResult<Real> {
        let prec = check_prec(prec)?;
        let (value, ord) = Float::with_val_round(prec, &self.value, mode.to_round());
        Ok(Self::rounded(value, ord, mode))
    }
}

impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// An arbitrary-precision complex value
#[derive(Debug, Clone)]
pub struct ComplexValue {
    value: Complex,
    rc: (ReturnCode, ReturnCode),
    round: (RoundingMode, RoundingMode),
}

impl ComplexValue {
    /// Wrap an exactly known complex number
    pub fn new(value: Complex) -> Self {
        Self {
            value,
            rc: (ReturnCode::Exact, ReturnCode::Exact),
            round: (RoundingMode::Nearest, RoundingMode::Nearest),
        }
    }

    pub(crate) fn rounded(
        value: Complex,
        ord: (Ordering, Ordering),
        round: (RoundingMode, RoundingMode),
    ) -> Self {
        let component = |part: &Float, ord: Ordering| {
            if part.is_nan() {
                ReturnCode::NotComparable
            } else {
                ReturnCode::from_ordering(ord)
            }
        };
        let rc = (component(value.real(), ord.0), component(value.imag(), ord.1));
        Self { value, rc, round }
    }

    /// Build from two reals, keeping each component's precision
    pub fn from_parts(re: &Real, im: &Real) -> Self {
        let value = Complex::with_val((re.prec(), im.prec()), (re.as_float(), im.as_float()));
        Self {
            value,
            rc: (re.rc(), im.rc()),
            round: (re.round_mode(), im.round_mode()),
        }
    }

    /// Exact complex value from two machine doubles
    pub fn from_f64(re: f64, im: f64) -> Self {
        Self::new(Complex::with_val(f64::MANTISSA_DIGITS, (re, im)))
    }

    /// The real component
    pub fn real(&self) -> Real {
        Real {
            value: self.value.real().clone(),
            rc: self.rc.0,
            round: self.round.0,
        }
    }

    /// The imaginary component
    pub fn imag(&self) -> Real {
        Real {
            value: self.value.imag().clone(),
            rc: self.rc.1,
            round: self.round.1,
        }
    }

    /// The underlying complex number
    pub fn as_complex(&self) -> &Complex {
        &self.value
    }

    /// Unwrap into the underlying complex number
    pub fn into_complex(self) -> Complex {
        self.value
    }

    /// Component precisions
    pub fn prec(&self) -> (u32, u32) {
        self.value.prec()
    }

    /// Component rounding directions
    pub fn rc(&self) -> (ReturnCode, ReturnCode) {
        self.rc
    }

    /// Component rounding modes
    pub fn round_mode(&self) -> (RoundingMode, RoundingMode) {
        self.round
    }

    /// Both components are zero
    pub fn is_zero(&self) -> bool {
        self.value.real().is_zero() && self.value.imag().is_zero()
    }

    /// Either component is NaN
    pub fn is_nan(&self) -> bool {
        self.value.real().is_nan() || self.value.imag().is_nan()
    }

    /// Both components are finite
    pub fn is_finite(&self) -> bool {
        self.value.real().is_finite() && self.value.imag().is_finite()
    }
}

impl PartialEq for ComplexValue {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Display for ComplexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// A value of any numeric kind
#[derive(Debug, Clone)]
pub enum NumericValue {
    /// Arbitrary-precision integer
    Integer(BigInt),
    /// Canonical rational
    Rational(BigRational),
    /// Rounded real
    Real(Real),
    /// Rounded complex
    Complex(ComplexValue),
}

impl NumericValue {
    /// Build an integer value
    pub fn integer(value: impl Into<BigInt>) -> Self {
        NumericValue::Integer(value.into())
    }

    /// Build a canonical rational value
    pub fn rational(numer: impl Into<BigInt>, denom: impl Into<BigInt>) -> NumResult<Self> {
        let denom = denom.into();
        if denom.is_zero() {
            return Err(NumError::DivisionByZero("zero denominator".to_string()));
        }
        Ok(NumericValue::Rational(BigRational::new(numer.into(), denom)))
    }

    /// The value's kind
    pub fn kind(&self) -> Kind {
        match self {
            NumericValue::Integer(_) => Kind::Integer,
            NumericValue::Rational(_) => Kind::Rational,
            NumericValue::Real(_) => Kind::Real,
            NumericValue::Complex(_) => Kind::Complex,
        }
    }

    /// The integer, if this is one
    pub fn as_integer(&self) -> Option<&BigInt> {
        match self {
            NumericValue::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// The rational, if this is one
    pub fn as_rational(&self) -> Option<&BigRational> {
        match self {
            NumericValue::Rational(r) => Some(r),
            _ => None,
        }
    }

    /// The real, if this is one
    pub fn as_real(&self) -> Option<&Real> {
        match self {
            NumericValue::Real(r) => Some(r),
            _ => None,
        }
    }

    /// The complex value, if this is one
    pub fn as_complex(&self) -> Option<&ComplexValue> {
        match self {
            NumericValue::Complex(c) => Some(c),
            _ => None,
        }
    }

    /// Check for NaN in any component
    pub fn is_nan(&self) -> bool {
        match self {
            NumericValue::Integer(_) | NumericValue::Rational(_) => false,
            NumericValue::Real(r) => r.is_nan(),
            NumericValue::Complex(c) => c.is_nan(),
        }
    }

    /// Check for zero
    pub fn is_zero(&self) -> bool {
        match self {
            NumericValue::Integer(i) => i.is_zero(),
            NumericValue::Rational(r) => r.is_zero(),
            NumericValue::Real(r) => r.is_zero(),
            NumericValue::Complex(c) => c.is_zero(),
        }
    }
}

impl PartialEq for NumericValue {
    fn eq(&self, other: &Self) -> bool {
        values_equal(&Operand::Value(self), &Operand::Value(other))
    }
}

impl fmt::Display for NumericValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericValue::Integer(i) => write!(f, "{}", i),
            NumericValue::Rational(r) => write!(f, "{}/{}", r.numer(), r.denom()),
            NumericValue::Real(r) => write!(f, "{}", r),
            NumericValue::Complex(c) => write!(f, "{}", c),
        }
    }
}

impl From<i64> for NumericValue {
    fn from(value: i64) -> Self {
        NumericValue::Integer(BigInt::from(value))
    }
}

impl From<i32> for NumericValue {
    fn from(value: i32) -> Self {
        NumericValue::Integer(BigInt::from(value))
    }
}

impl From<BigInt> for NumericValue {
    fn from(value: BigInt) -> Self {
        NumericValue::Integer(value)
    }
}

impl From<BigRational> for NumericValue {
    fn from(value: BigRational) -> Self {
        NumericValue::Rational(value)
    }
}

impl From<Real> for NumericValue {
    fn from(value: Real) -> Self {
        NumericValue::Real(value)
    }
}

impl From<ComplexValue> for NumericValue {
    fn from(value: ComplexValue) -> Self {
        NumericValue::Complex(value)
    }
}
