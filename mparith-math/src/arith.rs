//! Binary arithmetic
//!
//! Every binary operation is described by a [`BinaryOp`] implementation and
//! evaluated by one driver: select the ladder path, run the exact integer or
//! rational kernel when one applies, otherwise round once on the real or
//! complex path and post-process the result.
//!
//! The real path keeps the back end's mixed-type primitives (float with
//! machine integer, big integer, rational or double) as fast paths. Each of
//! them rounds exactly once, so the result is the same as converting both
//! operands to floats and rounding the operation.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use rug::float::{Round, Special};
use rug::ops::Pow as _;
use rug::{Complex, Float};

use crate::cleanup::{finish_complex, finish_real, in_range, lower_complex, lower_real, raise};
use crate::context::Context;
use crate::convert::{
    bigint_to_rug, f64_to_float, i64_to_float, integer_to_float, rational_to_float_round,
};
use crate::current::with_context;
use crate::dispatch::{select_for, Path};
use crate::error::{NumError, NumResult};
use crate::flags::Flags;
use crate::operand::{Operand, RealArg};
use crate::value::NumericValue;

type Rounded = (Float, Ordering);
type ComplexRounded = (Complex, (Ordering, Ordering));

/// A binary operation over the promotion ladder
pub(crate) trait BinaryOp {
    /// Operation name used in trap errors
    const NAME: &'static str;
    /// Highest path on which the operation exists
    const CEILING: Path = Path::Complex;

    /// Exact integer kernel; `None` sends the operands to the real path
    fn integer(_ctx: &mut Context, _a: &BigInt, _b: &BigInt) -> NumResult<Option<NumericValue>> {
        Ok(None)
    }

    /// Exact rational kernel; `None` sends the operands to the real path
    fn rational(
        _ctx: &mut Context,
        _a: &BigRational,
        _b: &BigRational,
    ) -> NumResult<Option<NumericValue>> {
        Ok(None)
    }

    fn float_float(prec: u32, round: Round, a: &Float, b: &Float) -> Rounded;

    fn float_small(prec: u32, round: Round, a: &Float, b: i64) -> Rounded {
        Self::float_float(prec, round, a, &i64_to_float(b))
    }

    fn float_big(prec: u32, round: Round, a: &Float, b: &rug::Integer) -> Rounded {
        Self::float_float(prec, round, a, &integer_to_float(b))
    }

    fn float_ratio(prec: u32, round: Round, a: &Float, b: &rug::Rational, guard: u32) -> Rounded {
        Self::float_float(prec, round, a, &Float::with_val(guard, b))
    }

    fn float_double(prec: u32, round: Round, a: &Float, b: f64) -> Rounded {
        Self::float_float(prec, round, a, &f64_to_float(b))
    }

    fn small_float(prec: u32, round: Round, a: i64, b: &Float) -> Rounded {
        Self::float_float(prec, round, &i64_to_float(a), b)
    }

    fn double_float(prec: u32, round: Round, a: f64, b: &Float) -> Rounded {
        Self::float_float(prec, round, &f64_to_float(a), b)
    }

    /// Rounded real kernel
    fn real(ctx: &Context, a: &RealArg<'_>, b: &RealArg<'_>) -> Rounded {
        let prec = ctx.precision();
        let round = ctx.rug_round();
        let guard = ctx.guarded_precision();
        match (a, b) {
            (RealArg::Float(x), RealArg::Float(y)) => Self::float_float(prec, round, x, y),
            (RealArg::Float(x), RealArg::Small(n)) => Self::float_small(prec, round, x, *n),
            (RealArg::Float(x), RealArg::Big(n)) => Self::float_big(prec, round, x, n),
            (RealArg::Float(x), RealArg::Ratio(q)) => Self::float_ratio(prec, round, x, q, guard),
            (RealArg::Float(x), RealArg::Double(d)) => Self::float_double(prec, round, x, *d),
            (RealArg::Small(n), RealArg::Float(y)) => Self::small_float(prec, round, *n, y),
            (RealArg::Double(d), RealArg::Float(y)) => Self::double_float(prec, round, *d, y),
            _ => Self::float_float(prec, round, &a.to_float(guard), &b.to_float(guard)),
        }
    }

    /// Whether the real operands leave the real domain
    fn escapes_real(_a: &RealArg<'_>, _b: &RealArg<'_>) -> bool {
        false
    }

    /// Inspect the operands before they are lowered to the complex path
    fn check_complex(_ctx: &mut Context, _x: &Operand<'_>, _y: &Operand<'_>) -> NumResult<()> {
        Ok(())
    }

    /// Rounded complex kernel
    fn complex(_ctx: &mut Context, _a: &Complex, _b: &Complex) -> NumResult<ComplexRounded> {
        Err(NumError::SystemInconsistency(format!(
            "{} has no complex kernel",
            Self::NAME
        )))
    }
}

fn inconsistent(op: &str) -> NumError {
    NumError::SystemInconsistency(format!("operand conversion failed in {}", op))
}

/// Evaluate a binary operation against a resolved context
pub(crate) fn evaluate<Op: BinaryOp>(
    ctx: &mut Context,
    x: Operand<'_>,
    y: Operand<'_>,
) -> NumResult<NumericValue> {
    let path = select_for(&x, &y, Op::CEILING, Op::NAME)?;
    match path {
        Path::Integer => {
            let (a, b) = match (x.to_bigint(), y.to_bigint()) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(inconsistent(Op::NAME)),
            };
            match Op::integer(ctx, &a, &b)? {
                Some(value) => Ok(value),
                None => real_path::<Op>(ctx, x, y),
            }
        }
        Path::Rational => {
            let (a, b) = match (x.to_rational(), y.to_rational()) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(inconsistent(Op::NAME)),
            };
            match Op::rational(ctx, &a, &b)? {
                Some(value) => Ok(value),
                None => real_path::<Op>(ctx, x, y),
            }
        }
        Path::Real => real_path::<Op>(ctx, x, y),
        Path::Complex => complex_path::<Op>(ctx, x, y),
    }
}

fn real_path<Op: BinaryOp>(
    ctx: &mut Context,
    x: Operand<'_>,
    y: Operand<'_>,
) -> NumResult<NumericValue> {
    let a = lower_real(ctx, x, Op::NAME)?;
    let b = lower_real(ctx, y, Op::NAME)?;
    if Op::CEILING == Path::Complex && ctx.allow_complex() && Op::escapes_real(&a, &b) {
        return complex_path::<Op>(ctx, x, y);
    }
    let (value, ord) = Op::real(ctx, &a, &b);
    finish_real(ctx, value, ord, Op::NAME)
}

fn complex_path<Op: BinaryOp>(
    ctx: &mut Context,
    x: Operand<'_>,
    y: Operand<'_>,
) -> NumResult<NumericValue> {
    Op::check_complex(ctx, &x, &y)?;
    let a = lower_complex(ctx, x, Op::NAME)?;
    let b = lower_complex(ctx, y, Op::NAME)?;
    let (value, ord) = Op::complex(ctx, &a, &b)?;
    finish_complex(ctx, value, ord, Op::NAME)
}

pub(crate) fn binary<'a, 'b, Op: BinaryOp>(
    x: impl Into<Operand<'a>>,
    y: impl Into<Operand<'b>>,
    ctx: Option<&mut Context>,
) -> NumResult<NumericValue> {
    let (x, y) = (x.into(), y.into());
    with_context(ctx, |ctx| evaluate::<Op>(ctx, x, y))
}

fn zero_divisor(op: &str) -> NumError {
    NumError::DivisionByZero(format!("division or modulo by zero in {}", op))
}

macro_rules! rounded {
    ($prec:expr, $round:expr, $expr:expr) => {
        Float::with_val_round($prec, $expr, $round)
    };
}

struct Add;

impl BinaryOp for Add {
    const NAME: &'static str = "addition";

    fn integer(_: &mut Context, a: &BigInt, b: &BigInt) -> NumResult<Option<NumericValue>> {
        Ok(Some(NumericValue::Integer(a + b)))
    }

    fn rational(_: &mut Context, a: &BigRational, b: &BigRational) -> NumResult<Option<NumericValue>> {
        Ok(Some(NumericValue::Rational(a + b)))
    }

    fn float_float(prec: u32, round: Round, a: &Float, b: &Float) -> Rounded {
        rounded!(prec, round, a + b)
    }

    fn float_small(prec: u32, round: Round, a: &Float, b: i64) -> Rounded {
        rounded!(prec, round, a + b)
    }

    fn float_big(prec: u32, round: Round, a: &Float, b: &rug::Integer) -> Rounded {
        rounded!(prec, round, a + b)
    }

    fn float_ratio(prec: u32, round: Round, a: &Float, b: &rug::Rational, _: u32) -> Rounded {
        rounded!(prec, round, a + b)
    }

    fn float_double(prec: u32, round: Round, a: &Float, b: f64) -> Rounded {
        rounded!(prec, round, a + b)
    }

    fn small_float(prec: u32, round: Round, a: i64, b: &Float) -> Rounded {
        rounded!(prec, round, a + b)
    }

    fn double_float(prec: u32, round: Round, a: f64, b: &Float) -> Rounded {
        rounded!(prec, round, a + b)
    }

    fn complex(ctx: &mut Context, a: &Complex, b: &Complex) -> NumResult<ComplexRounded> {
        Ok(Complex::with_val_round(ctx.complex_prec(), a + b, ctx.rug_complex_round()))
    }
}

struct Sub;

impl BinaryOp for Sub {
    const NAME: &'static str = "subtraction";

    fn integer(_: &mut Context, a: &BigInt, b: &BigInt) -> NumResult<Option<NumericValue>> {
        Ok(Some(NumericValue::Integer(a - b)))
    }

    fn rational(_: &mut Context, a: &BigRational, b: &BigRational) -> NumResult<Option<NumericValue>> {
        Ok(Some(NumericValue::Rational(a - b)))
    }

    fn float_float(prec: u32, round: Round, a: &Float, b: &Float) -> Rounded {
        rounded!(prec, round, a - b)
    }

    fn float_small(prec: u32, round: Round, a: &Float, b: i64) -> Rounded {
        rounded!(prec, round, a - b)
    }

    fn float_big(prec: u32, round: Round, a: &Float, b: &rug::Integer) -> Rounded {
        rounded!(prec, round, a - b)
    }

    fn float_ratio(prec: u32, round: Round, a: &Float, b: &rug::Rational, _: u32) -> Rounded {
        rounded!(prec, round, a - b)
    }

    fn float_double(prec: u32, round: Round, a: &Float, b: f64) -> Rounded {
        rounded!(prec, round, a - b)
    }

    fn small_float(prec: u32, round: Round, a: i64, b: &Float) -> Rounded {
        rounded!(prec, round, a - b)
    }

    fn double_float(prec: u32, round: Round, a: f64, b: &Float) -> Rounded {
        rounded!(prec, round, a - b)
    }

    fn complex(ctx: &mut Context, a: &Complex, b: &Complex) -> NumResult<ComplexRounded> {
        Ok(Complex::with_val_round(ctx.complex_prec(), a - b, ctx.rug_complex_round()))
    }
}

struct Mul;

impl BinaryOp for Mul {
    const NAME: &'static str = "multiplication";

    fn integer(_: &mut Context, a: &BigInt, b: &BigInt) -> NumResult<Option<NumericValue>> {
        Ok(Some(NumericValue::Integer(a * b)))
    }

    fn rational(_: &mut Context, a: &BigRational, b: &BigRational) -> NumResult<Option<NumericValue>> {
        Ok(Some(NumericValue::Rational(a * b)))
    }

    fn float_float(prec: u32, round: Round, a: &Float, b: &Float) -> Rounded {
        rounded!(prec, round, a * b)
    }

    fn float_small(prec: u32, round: Round, a: &Float, b: i64) -> Rounded {
        rounded!(prec, round, a * b)
    }

    fn float_big(prec: u32, round: Round, a: &Float, b: &rug::Integer) -> Rounded {
        rounded!(prec, round, a * b)
    }

    fn float_ratio(prec: u32, round: Round, a: &Float, b: &rug::Rational, _: u32) -> Rounded {
        rounded!(prec, round, a * b)
    }

    fn float_double(prec: u32, round: Round, a: &Float, b: f64) -> Rounded {
        rounded!(prec, round, a * b)
    }

    fn small_float(prec: u32, round: Round, a: i64, b: &Float) -> Rounded {
        rounded!(prec, round, a * b)
    }

    fn double_float(prec: u32, round: Round, a: f64, b: &Float) -> Rounded {
        rounded!(prec, round, a * b)
    }

    fn complex(ctx: &mut Context, a: &Complex, b: &Complex) -> NumResult<ComplexRounded> {
        Ok(Complex::with_val_round(ctx.complex_prec(), a * b, ctx.rug_complex_round()))
    }
}

struct Div;

impl BinaryOp for Div {
    const NAME: &'static str = "division";

    fn integer(ctx: &mut Context, a: &BigInt, b: &BigInt) -> NumResult<Option<NumericValue>> {
        if b.is_zero() {
            return Err(NumError::DivisionByZero("division by zero".to_string()));
        }
        if ctx.rational_division() {
            return Ok(Some(NumericValue::Rational(BigRational::new(a.clone(), b.clone()))));
        }
        let exact = rug::Rational::from((bigint_to_rug(a), bigint_to_rug(b)));
        let (value, ord) = rational_to_float_round(&exact, ctx.precision(), ctx.rug_round());
        finish_real(ctx, value, ord, Self::NAME).map(Some)
    }

    fn rational(_: &mut Context, a: &BigRational, b: &BigRational) -> NumResult<Option<NumericValue>> {
        if b.is_zero() {
            return Err(NumError::DivisionByZero("division by zero".to_string()));
        }
        Ok(Some(NumericValue::Rational(a / b)))
    }

    fn float_float(prec: u32, round: Round, a: &Float, b: &Float) -> Rounded {
        rounded!(prec, round, a / b)
    }

    fn float_small(prec: u32, round: Round, a: &Float, b: i64) -> Rounded {
        rounded!(prec, round, a / b)
    }

    fn float_big(prec: u32, round: Round, a: &Float, b: &rug::Integer) -> Rounded {
        rounded!(prec, round, a / b)
    }

    fn float_ratio(prec: u32, round: Round, a: &Float, b: &rug::Rational, _: u32) -> Rounded {
        rounded!(prec, round, a / b)
    }

    fn float_double(prec: u32, round: Round, a: &Float, b: f64) -> Rounded {
        rounded!(prec, round, a / b)
    }

    fn small_float(prec: u32, round: Round, a: i64, b: &Float) -> Rounded {
        rounded!(prec, round, a / b)
    }

    fn double_float(prec: u32, round: Round, a: f64, b: &Float) -> Rounded {
        rounded!(prec, round, a / b)
    }

    // only two in-window complex values can divide by zero; a promoted
    // divisor divides like any other value
    fn check_complex(ctx: &mut Context, x: &Operand<'_>, y: &Operand<'_>) -> NumResult<()> {
        if let (
            Operand::Value(NumericValue::Complex(a)),
            Operand::Value(NumericValue::Complex(b)),
        ) = (x, y)
        {
            let (a, b) = (a.as_complex(), b.as_complex());
            let parts = [a.real(), a.imag(), b.real(), b.imag()];
            let zero_divisor = b.real().is_zero() && b.imag().is_zero();
            if zero_divisor && parts.iter().all(|part| in_range(ctx, part)) {
                raise(ctx, Flags::DIVZERO, Self::NAME)?;
            }
        }
        Ok(())
    }

    fn complex(ctx: &mut Context, a: &Complex, b: &Complex) -> NumResult<ComplexRounded> {
        Ok(Complex::with_val_round(ctx.complex_prec(), a / b, ctx.rug_complex_round()))
    }
}

struct FloorDiv;

impl BinaryOp for FloorDiv {
    const NAME: &'static str = "floor_div()";
    const CEILING: Path = Path::Real;

    fn integer(_: &mut Context, a: &BigInt, b: &BigInt) -> NumResult<Option<NumericValue>> {
        if b.is_zero() {
            return Err(zero_divisor(Self::NAME));
        }
        Ok(Some(NumericValue::Integer(a.div_floor(b))))
    }

    fn rational(_: &mut Context, a: &BigRational, b: &BigRational) -> NumResult<Option<NumericValue>> {
        if b.is_zero() {
            return Err(zero_divisor(Self::NAME));
        }
        Ok(Some(NumericValue::Integer((a / b).floor().to_integer())))
    }

    fn float_float(prec: u32, _round: Round, a: &Float, b: &Float) -> Rounded {
        let (mut q, div_ord) = rounded!(prec, Round::Down, a / b);
        q.floor_mut();
        // the floor is exact unless the quotient had no room for its units bit
        let exact = div_ord == Ordering::Equal
            || q.get_exp().map_or(true, |exp| i64::from(exp) <= i64::from(prec));
        let ord = if exact { Ordering::Equal } else { Ordering::Less };
        (q, ord)
    }
}

struct Modulo;

impl BinaryOp for Modulo {
    const NAME: &'static str = "mod()";
    const CEILING: Path = Path::Real;

    fn integer(_: &mut Context, a: &BigInt, b: &BigInt) -> NumResult<Option<NumericValue>> {
        if b.is_zero() {
            return Err(zero_divisor(Self::NAME));
        }
        Ok(Some(NumericValue::Integer(a.mod_floor(b))))
    }

    fn rational(_: &mut Context, a: &BigRational, b: &BigRational) -> NumResult<Option<NumericValue>> {
        if b.is_zero() {
            return Err(zero_divisor(Self::NAME));
        }
        let q = (a / b).floor();
        Ok(Some(NumericValue::Rational(a - b * q)))
    }

    fn float_float(prec: u32, round: Round, a: &Float, b: &Float) -> Rounded {
        if b.is_zero() || a.is_infinite() || a.is_nan() || b.is_nan() {
            return (Float::with_val(prec, Special::Nan), Ordering::Equal);
        }
        // the truncated remainder is exact at the wider operand precision
        let wide = a.prec().max(b.prec());
        let r = Float::with_val(wide, a % b);
        if r.is_zero() {
            let zero = if b.is_sign_negative() { Special::NegZero } else { Special::Zero };
            return (Float::with_val(prec, zero), Ordering::Equal);
        }
        if r.is_sign_negative() != b.is_sign_negative() {
            rounded!(prec, round, &r + b)
        } else {
            rounded!(prec, round, &r)
        }
    }
}

struct Pow;

impl BinaryOp for Pow {
    const NAME: &'static str = "pow()";

    fn integer(_: &mut Context, a: &BigInt, b: &BigInt) -> NumResult<Option<NumericValue>> {
        if b.sign() == num_bigint::Sign::Minus {
            return Ok(None);
        }
        let exp = b
            .to_u32()
            .ok_or_else(|| NumError::ValueOutOfDomain("pow() outrageous exponent".to_string()))?;
        Ok(Some(NumericValue::Integer(a.pow(exp))))
    }

    fn rational(_: &mut Context, a: &BigRational, b: &BigRational) -> NumResult<Option<NumericValue>> {
        if !b.is_integer() {
            return Ok(None);
        }
        let exp = b
            .to_integer()
            .to_i32()
            .ok_or_else(|| NumError::ValueOutOfDomain("pow() outrageous exponent".to_string()))?;
        if a.is_zero() && exp < 0 {
            return Err(NumError::DivisionByZero("zero to a negative power".to_string()));
        }
        Ok(Some(NumericValue::Rational(a.pow(exp))))
    }

    fn float_float(prec: u32, round: Round, a: &Float, b: &Float) -> Rounded {
        rounded!(prec, round, a.pow(b))
    }

    fn float_small(prec: u32, round: Round, a: &Float, b: i64) -> Rounded {
        let exp = rug::Integer::from(b);
        rounded!(prec, round, a.pow(&exp))
    }

    fn float_big(prec: u32, round: Round, a: &Float, b: &rug::Integer) -> Rounded {
        rounded!(prec, round, a.pow(b))
    }

    fn escapes_real(a: &RealArg<'_>, b: &RealArg<'_>) -> bool {
        a.is_negative() && !b.is_integer() && !b.is_nan()
    }

    fn complex(ctx: &mut Context, a: &Complex, b: &Complex) -> NumResult<ComplexRounded> {
        Ok(Complex::with_val_round(ctx.complex_prec(), a.pow(b), ctx.rug_complex_round()))
    }
}

struct Fmod;

impl BinaryOp for Fmod {
    const NAME: &'static str = "fmod()";
    const CEILING: Path = Path::Real;

    fn float_float(prec: u32, round: Round, a: &Float, b: &Float) -> Rounded {
        rounded!(prec, round, a % b)
    }
}

struct Remainder;

impl BinaryOp for Remainder {
    const NAME: &'static str = "remainder()";
    const CEILING: Path = Path::Real;

    fn float_float(prec: u32, round: Round, a: &Float, b: &Float) -> Rounded {
        // exact at the wider operand precision, then rounded once
        let mut r = Float::with_val(a.prec().max(b.prec()), a);
        r.remainder_mut(b);
        rounded!(prec, round, &r)
    }
}

/// Sum of two operands
pub fn add<'a, 'b>(
    x: impl Into<Operand<'a>>,
    y: impl Into<Operand<'b>>,
    ctx: Option<&mut Context>,
) -> NumResult<NumericValue> {
    binary::<Add>(x, y, ctx)
}

/// Difference of two operands
pub fn sub<'a, 'b>(
    x: impl Into<Operand<'a>>,
    y: impl Into<Operand<'b>>,
    ctx: Option<&mut Context>,
) -> NumResult<NumericValue> {
    binary::<Sub>(x, y, ctx)
}

/// Product of two operands
pub fn mul<'a, 'b>(
    x: impl Into<Operand<'a>>,
    y: impl Into<Operand<'b>>,
    ctx: Option<&mut Context>,
) -> NumResult<NumericValue> {
    binary::<Mul>(x, y, ctx)
}

/// True division
///
/// Two integers divide to a real rounded at the context precision, or to an
/// exact rational when the context enables rational division. Dividing a
/// complex value by a complex zero raises the divide-by-zero flag; a real or
/// integer zero divisor is promoted and divided without it.
pub fn div<'a, 'b>(
    x: impl Into<Operand<'a>>,
    y: impl Into<Operand<'b>>,
    ctx: Option<&mut Context>,
) -> NumResult<NumericValue> {
    binary::<Div>(x, y, ctx)
}

/// Quotient rounded toward negative infinity; not defined for complex values
pub fn floor_div<'a, 'b>(
    x: impl Into<Operand<'a>>,
    y: impl Into<Operand<'b>>,
    ctx: Option<&mut Context>,
) -> NumResult<NumericValue> {
    binary::<FloorDiv>(x, y, ctx)
}

/// Remainder of floor division, carrying the sign of the divisor
pub fn modulo<'a, 'b>(
    x: impl Into<Operand<'a>>,
    y: impl Into<Operand<'b>>,
    ctx: Option<&mut Context>,
) -> NumResult<NumericValue> {
    binary::<Modulo>(x, y, ctx)
}

/// Floor quotient and modulo together
pub fn div_mod<'a, 'b>(
    x: impl Into<Operand<'a>>,
    y: impl Into<Operand<'b>>,
    ctx: Option<&mut Context>,
) -> NumResult<(NumericValue, NumericValue)> {
    let (x, y) = (x.into(), y.into());
    with_context(ctx, |ctx| {
        let q = evaluate::<FloorDiv>(ctx, x, y)?;
        let r = evaluate::<Modulo>(ctx, x, y)?;
        Ok((q, r))
    })
}

/// Raise `x` to the power `y`
///
/// Integer powers with a non-negative exponent and rational powers with an
/// integer exponent are exact. A negative real base with a non-integer
/// exponent gives NaN, or a complex result when the context allows it.
pub fn pow<'a, 'b>(
    x: impl Into<Operand<'a>>,
    y: impl Into<Operand<'b>>,
    ctx: Option<&mut Context>,
) -> NumResult<NumericValue> {
    binary::<Pow>(x, y, ctx)
}

/// Real remainder with the quotient truncated toward zero
pub fn fmod<'a, 'b>(
    x: impl Into<Operand<'a>>,
    y: impl Into<Operand<'b>>,
    ctx: Option<&mut Context>,
) -> NumResult<NumericValue> {
    binary::<Fmod>(x, y, ctx)
}

/// Real remainder with the quotient rounded to nearest even
pub fn remainder<'a, 'b>(
    x: impl Into<Operand<'a>>,
    y: impl Into<Operand<'b>>,
    ctx: Option<&mut Context>,
) -> NumResult<NumericValue> {
    binary::<Remainder>(x, y, ctx)
}
