//! Comparisons
//!
//! Comparisons are exact: mixed kinds are compared by value, never by
//! rounding one side. A comparison involving NaN has no order and raises the
//! range-error flag.

use std::cmp::Ordering;

use crate::cleanup::raise;
use crate::context::Context;
use crate::current::with_context;
use crate::dispatch::{select_for, Path};
use crate::error::NumResult;
use crate::flags::Flags;
use crate::operand::{values_equal, Operand};

const CMP: &str = "cmp()";
const EQ: &str = "eq()";

/// Order two operands; `None` when either is NaN
///
/// Complex operands are not ordered and fail with `TypeMismatch`.
pub fn cmp<'a, 'b>(
    x: impl Into<Operand<'a>>,
    y: impl Into<Operand<'b>>,
    ctx: Option<&mut Context>,
) -> NumResult<Option<Ordering>> {
    let (x, y) = (x.into(), y.into());
    with_context(ctx, |ctx| {
        select_for(&x, &y, Path::Real, CMP)?;
        if x.is_nan() || y.is_nan() {
            raise(ctx, Flags::ERANGE, CMP)?;
            return Ok(None);
        }
        let ordering = match (x.scalar(), y.scalar()) {
            (Some(a), Some(b)) => a.compare(&b),
            _ => None,
        };
        Ok(ordering)
    })
}

/// Value equality across all kinds, including complex
pub fn eq<'a, 'b>(
    x: impl Into<Operand<'a>>,
    y: impl Into<Operand<'b>>,
    ctx: Option<&mut Context>,
) -> NumResult<bool> {
    let (x, y) = (x.into(), y.into());
    with_context(ctx, |ctx| {
        select_for(&x, &y, Path::Complex, EQ)?;
        if x.is_nan() || y.is_nan() {
            raise(ctx, Flags::ERANGE, EQ)?;
            return Ok(false);
        }
        Ok(values_equal(&x, &y))
    })
}
