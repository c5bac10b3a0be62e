//! Marshalling between the exact value types and the back end
//!
//! Integers and rationals are held as `num` types; the rounded back end works
//! on `rug` types. Every conversion here is exact except the explicitly
//! rounded `*_to_float_round` helpers.

use std::cmp::Ordering;

use num_bigint::{BigInt, Sign};
use num_rational::BigRational;
use rug::float::Round;
use rug::integer::Order;
use rug::Float;
use rust_decimal::Decimal;

use crate::context::prec_min;

/// Convert a `BigInt` into a back-end integer
pub fn bigint_to_rug(value: &BigInt) -> rug::Integer {
    let (sign, bytes) = value.to_bytes_le();
    let magnitude = rug::Integer::from_digits(&bytes, Order::Lsf);
    if sign == Sign::Minus {
        -magnitude
    } else {
        magnitude
    }
}

/// Convert a back-end integer into a `BigInt`
pub fn rug_to_bigint(value: &rug::Integer) -> BigInt {
    let bytes = value.to_digits::<u8>(Order::Lsf);
    let sign = match value.cmp0() {
        Ordering::Less => Sign::Minus,
        Ordering::Equal => Sign::NoSign,
        Ordering::Greater => Sign::Plus,
    };
    BigInt::from_bytes_le(sign, &bytes)
}

/// Convert a canonical `BigRational` into a back-end rational
pub fn rational_to_rug(value: &BigRational) -> rug::Rational {
    rug::Rational::from((bigint_to_rug(value.numer()), bigint_to_rug(value.denom())))
}

/// Convert a back-end rational into a `BigRational`
pub fn rug_to_rational(value: &rug::Rational) -> BigRational {
    BigRational::new_raw(rug_to_bigint(value.numer()), rug_to_bigint(value.denom()))
}

/// Exact rational value of a decimal: mantissa / 10^scale
pub fn decimal_to_rational(value: &Decimal) -> BigRational {
    let numerator = BigInt::from(value.mantissa());
    let denominator = BigInt::from(10).pow(value.scale());
    BigRational::new(numerator, denominator)
}

/// Exact rational value of a finite float; `None` for NaN and infinities
pub fn float_to_rational(value: &Float) -> Option<BigRational> {
    value.to_rational().map(|r| rug_to_rational(&r))
}

/// Exact float for an integer, with just enough precision to hold it
pub fn integer_to_float(value: &rug::Integer) -> Float {
    let bits = value.significant_bits().max(prec_min());
    Float::with_val(bits, value)
}

/// Exact float for a machine integer
pub fn i64_to_float(value: i64) -> Float {
    Float::with_val(64, value)
}

/// Exact float for a machine double
pub fn f64_to_float(value: f64) -> Float {
    Float::with_val(f64::MANTISSA_DIGITS, value)
}

/// Round a rational to a float of the given precision
pub fn rational_to_float_round(value: &rug::Rational, prec: u32, round: Round) -> (Float, Ordering) {
    Float::with_val_round(prec, value, round)
}
