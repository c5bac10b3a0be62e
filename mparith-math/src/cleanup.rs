//! Post-processing of rounded results
//!
//! Every real and complex primitive funnels its raw result through this
//! module before it is returned:
//!
//! 1. derive the primitive's local flags from its result and return code
//!    (every NaN result is an invalid operation, NaN operands included),
//! 2. subnormalize when the context asks for it,
//! 3. force the exponent into the context's [emin, emax] window,
//! 4. merge the local flags into the context and convert trapped flags into
//!    an error tagged with the operation name.
//!
//! The context's exponent window is applied here rather than through the
//! back end's process-wide bounds, so contexts with different windows never
//! interfere with each other.

use std::cmp::Ordering;

use log::debug;
use rug::float::Special;
use rug::{Complex, Float};

use crate::context::Context;
use crate::error::{NumError, NumResult};
use crate::flags::{Flags, Traps};
use crate::operand::{Operand, RealArg};
use crate::rounding::{ReturnCode, RoundingMode};
use crate::value::{ComplexValue, NumericValue, Real};

/// Merge flags raised by `op` and fail if any of them is trapped
pub(crate) fn raise(ctx: &mut Context, local: Flags, op: &'static str) -> NumResult<()> {
    ctx.raise(local);
    let trapped = ctx.traps() & Traps::for_flags(local);
    match NumError::from_trap(trapped, op) {
        Some(err) => {
            debug!("trapped {:?} in {}", local, op);
            Err(err)
        }
        None => Ok(()),
    }
}

/// Largest finite value with `prec` bits below 2^emax
fn max_finite(prec: u32, emax: i32, negative: bool) -> Float {
    let mantissa = (rug::Integer::from(1) << prec) - 1u32;
    let shift = i64::from(emax) - i64::from(prec);
    let shift = i32::try_from(shift).unwrap_or(if shift < 0 { i32::MIN } else { i32::MAX });
    let value = Float::with_val(prec, mantissa) << shift;
    if negative {
        -value
    } else {
        value
    }
}

/// Smallest positive value with exponent emin, that is 2^(emin-1)
fn min_positive(prec: u32, emin: i32, negative: bool) -> Float {
    let value = Float::with_val(prec, 1) << emin.saturating_sub(1);
    if negative {
        -value
    } else {
        value
    }
}

fn signed_zero(prec: u32, negative: bool) -> Float {
    let special = if negative { Special::NegZero } else { Special::Zero };
    Float::with_val(prec, special)
}

fn is_power_of_two(value: &Float) -> bool {
    match value.get_exp() {
        Some(exp) => {
            let power = Float::with_val(value.prec(), 1) << (exp - 1);
            value.as_abs().partial_cmp(&power) == Some(Ordering::Equal)
        }
        None => false,
    }
}

/// Force a value into the exponent window [emin, emax]
///
/// Overflow yields an infinity or the largest finite value and underflow
/// yields zero or the smallest positive value, depending on whether `mode`
/// rounds away from zero for the value's sign. Returns the new return code
/// and the flags the coercion raised.
pub(crate) fn range_check(
    value: &mut Float,
    ord: Ordering,
    emin: i32,
    emax: i32,
    mode: RoundingMode,
) -> (Ordering, Flags) {
    let exp = match value.get_exp() {
        Some(exp) => exp,
        None => return (ord, Flags::empty()),
    };
    let negative = value.is_sign_negative();
    let prec = value.prec();

    if exp > emax {
        let away = mode.rounds_away(negative);
        *value = if away {
            let special = if negative { Special::NegInfinity } else { Special::Infinity };
            Float::with_val(prec, special)
        } else {
            max_finite(prec, emax, negative)
        };
        let ord = if away != negative { Ordering::Greater } else { Ordering::Less };
        return (ord, Flags::OVERFLOW | Flags::INEXACT);
    }

    if exp < emin {
        let away = if mode == RoundingMode::Nearest {
            let below_half = i64::from(exp) + 1 < i64::from(emin);
            // exactly half of the smallest value: the tie goes to zero unless
            // the exact result was larger in magnitude
            let tie_to_zero = is_power_of_two(value)
                && if negative { ord != Ordering::Greater } else { ord != Ordering::Less };
            !(below_half || tie_to_zero)
        } else {
            mode.rounds_away(negative)
        };
        *value = if away {
            min_positive(prec, emin, negative)
        } else {
            signed_zero(prec, negative)
        };
        let ord = if away != negative { Ordering::Greater } else { Ordering::Less };
        return (ord, Flags::UNDERFLOW | Flags::INEXACT);
    }

    (ord, Flags::empty())
}

/// Check whether a value's exponent lies within the context window
pub(crate) fn in_range(ctx: &Context, value: &Float) -> bool {
    match value.get_exp() {
        Some(exp) => exp >= ctx.emin() && exp <= ctx.emax(),
        None => true,
    }
}

fn settle(
    ctx: &Context,
    mut value: Float,
    mut ord: Ordering,
    round: RoundingMode,
) -> (Float, Ordering, Flags) {
    let mut local = Flags::empty();

    if value.is_nan() {
        return (value, Ordering::Equal, Flags::INVALID);
    }

    if ord != Ordering::Equal {
        local |= Flags::INEXACT;
        // the back end saturated its own exponent range
        if value.is_infinite() {
            local |= Flags::OVERFLOW;
        } else if value.is_zero() {
            local |= Flags::UNDERFLOW;
        }
    }

    if ctx.subnormalize() && value.is_normal() {
        let prec = i32::try_from(value.prec()).unwrap_or(i32::MAX);
        let normal_exp_min = ctx.emin().saturating_add(prec - 1);
        if value.get_exp().map_or(false, |exp| exp < normal_exp_min) {
            ord = value.subnormalize_round(normal_exp_min, ord, round.to_round());
            if ord != Ordering::Equal {
                local |= Flags::UNDERFLOW | Flags::INEXACT;
            }
        }
    }

    let (ord, range_flags) = range_check(&mut value, ord, ctx.emin(), ctx.emax(), round);
    (value, ord, local | range_flags)
}

/// Post-process a rounded real result
pub(crate) fn finish_real(
    ctx: &mut Context,
    value: Float,
    ord: Ordering,
    op: &'static str,
) -> NumResult<NumericValue> {
    let round = ctx.round();
    let (value, ord, local) = settle(ctx, value, ord, round);
    raise(ctx, local, op)?;
    Ok(NumericValue::Real(Real::rounded(value, ord, round)))
}

/// Post-process a rounded complex result, component by component
pub(crate) fn finish_complex(
    ctx: &mut Context,
    value: Complex,
    ord: (Ordering, Ordering),
    op: &'static str,
) -> NumResult<NumericValue> {
    let (re_mode, im_mode) = ctx.complex_round();
    let (re, im) = value.into_real_imag();
    let (re, re_ord, re_flags) = settle(ctx, re, ord.0, re_mode);
    let (im, im_ord, im_flags) = settle(ctx, im, ord.1, im_mode);
    raise(ctx, re_flags | im_flags, op)?;
    let value = Complex::from((re, im));
    Ok(NumericValue::Complex(ComplexValue::rounded(
        value,
        (re_ord, im_ord),
        (re_mode, im_mode),
    )))
}

/// Bring an out-of-window operand back into the window
///
/// With the exponent-bound trap enabled this fails instead.
fn coerce(
    ctx: &mut Context,
    value: &Float,
    rc: ReturnCode,
    round: RoundingMode,
    op: &'static str,
) -> NumResult<Float> {
    if ctx.has_trap(Traps::EXPBOUND) {
        debug!("operand exponent {:?} out of bounds in {}", value.get_exp(), op);
        return Err(NumError::ExponentOutOfBounds(op));
    }
    let mut value = value.clone();
    let (_, flags) = range_check(&mut value, rc.to_ordering(), ctx.emin(), ctx.emax(), round);
    raise(ctx, flags, op)?;
    Ok(value)
}

/// Lower an operand for the real path, coercing out-of-window reals
pub(crate) fn lower_real<'a>(
    ctx: &mut Context,
    x: Operand<'a>,
    op: &'static str,
) -> NumResult<RealArg<'a>> {
    if let Operand::Value(NumericValue::Real(r)) = x {
        if !in_range(ctx, r.as_float()) {
            let value = coerce(ctx, r.as_float(), r.rc(), r.round_mode(), op)?;
            return Ok(RealArg::Float(std::borrow::Cow::Owned(value)));
        }
    }
    x.real_arg().ok_or_else(|| {
        NumError::SystemInconsistency(format!("complex operand reached the real path of {}", op))
    })
}

/// Lower an operand for the complex path, coercing out-of-window components
pub(crate) fn lower_complex(
    ctx: &mut Context,
    x: Operand<'_>,
    op: &'static str,
) -> NumResult<Complex> {
    match x {
        Operand::Value(NumericValue::Complex(c)) => {
            let z = c.as_complex();
            if in_range(ctx, z.real()) && in_range(ctx, z.imag()) {
                return Ok(z.clone());
            }
            let (re_rc, im_rc) = c.rc();
            let (re_mode, im_mode) = c.round_mode();
            let re = coerce(ctx, z.real(), re_rc, re_mode, op)?;
            let im = coerce(ctx, z.imag(), im_rc, im_mode, op)?;
            Ok(Complex::from((re, im)))
        }
        other => {
            let arg = lower_real(ctx, other, op)?;
            let re = arg.to_float(ctx.guarded_precision());
            Ok(Complex::with_val((re.prec(), re.prec()), (re.as_ref(), 0)))
        }
    }
}
