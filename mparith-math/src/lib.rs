//! Numeric context and operand dispatch for multi-precision arithmetic
//!
//! This crate provides the machinery behind arbitrary-precision integer,
//! rational, real and complex arithmetic: a configurable [`Context`] holding
//! precision, rounding, exponent bounds, sticky flags and traps; a promotion
//! ladder that picks the narrowest exact computation path for two operands;
//! and a post-processing step that applies subnormalization, range checks and
//! traps to every rounded result.
//!
//! Operations take an optional context. Without one they run against the
//! current context, which is per thread by default (see [`current`]).

#![warn(clippy::all)]
#![warn(missing_docs)]

pub mod error;
pub mod flags;
pub mod rounding;
pub mod options;
pub mod context;
pub mod current;
pub mod convert;
pub mod value;
pub mod operand;
pub mod dispatch;
mod cleanup;
pub mod arith;
pub mod compare;
pub mod functions;

// Re-export main types
pub use error::{NumError, NumResult};
pub use flags::{Flags, Traps};
pub use rounding::{ReturnCode, RoundingMode};
pub use options::{ContextOptions, Inherit, OptionValue};
pub use context::{
    emax_max, emin_min, prec_max, prec_min, Context, DEFAULT_PRECISION, MAX_GUARD_BITS,
};
pub use current::{
    context_mode, get_current, local_context, set_context_mode, set_current, shared,
    with_current, with_local_context, ContextGuard, ContextMode, ContextRef, LocalContext,
};
pub use value::{ComplexValue, Kind, NumericValue, Real};
pub use operand::Operand;
pub use dispatch::{ladder, Path};
pub use arith::{add, div, div_mod, floor_div, fmod, modulo, mul, pow, remainder, sub};
pub use compare::{cmp, eq};
pub use functions::{
    abs, acos, acosh, agm, ai, asin, asinh, atan, atan2, atanh, cbrt, ceil, check_range,
    const_catalan, const_euler, const_log2, const_pi, cos, cosh, cot, coth, csc, csch, digamma,
    div_2exp, eint, erf, erfc, exp, exp10, exp2, expm1, floor, fma, fms, gamma, hypot, j0, j1, jn,
    li2, lngamma, log, log10, log1p, log2, max2, min2, mul_2exp, neg, plus, rec_sqrt, rint,
    rint_ceil, rint_floor, rint_round, rint_trunc, root, round_away, sec, sech, sin, sin_cos, sinh,
    sinh_cosh, sqrt, square, tan, tanh, trunc, y0, y1, yn, zeta,
};

// Re-export for convenience
pub use num_bigint::BigInt;
pub use num_rational::BigRational;
pub use rust_decimal::Decimal;
