//! Context option table
//!
//! [`ContextOptions`] carries a partial set of context settings. It is what
//! [`Context::configure`](crate::Context::configure) and scoped activation
//! consume, and it can be deserialized from any serde format so an embedder
//! can keep context descriptions in configuration files.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::rounding::RoundingMode;

/// A complex-component setting that either inherits from its parent setting
/// or carries an explicit value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inherit<T> {
    /// Use the parent setting
    Default,
    /// Use this value
    Value(T),
}

impl<T: Copy> Inherit<T> {
    /// Resolve against the parent setting
    pub fn resolve(self, parent: T) -> T {
        match self {
            Inherit::Default => parent,
            Inherit::Value(v) => v,
        }
    }

    /// The explicit value, if any
    pub fn value(self) -> Option<T> {
        match self {
            Inherit::Default => None,
            Inherit::Value(v) => Some(v),
        }
    }
}

impl<T> Default for Inherit<T> {
    fn default() -> Self {
        Inherit::Default
    }
}

impl<T: fmt::Display> fmt::Display for Inherit<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Inherit::Default => f.write_str("Default"),
            Inherit::Value(v) => write!(f, "{}", v),
        }
    }
}

/// Partial set of context options; `None` leaves a setting untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContextOptions {
    /// Working precision of real results, in bits
    pub precision: Option<u32>,
    /// Precision of the real component of complex results
    pub real_prec: Option<Inherit<u32>>,
    /// Precision of the imaginary component of complex results
    pub imag_prec: Option<Inherit<u32>>,
    /// Rounding mode of real results
    pub round: Option<RoundingMode>,
    /// Rounding mode of the real component of complex results
    pub real_round: Option<Inherit<RoundingMode>>,
    /// Rounding mode of the imaginary component of complex results
    pub imag_round: Option<Inherit<RoundingMode>>,
    /// Largest allowed exponent
    pub emax: Option<i32>,
    /// Smallest allowed exponent
    pub emin: Option<i32>,
    /// Allow subnormal results
    pub subnormalize: Option<bool>,
    /// Raise on underflow
    pub trap_underflow: Option<bool>,
    /// Raise on overflow
    pub trap_overflow: Option<bool>,
    /// Raise on inexact results
    pub trap_inexact: Option<bool>,
    /// Raise on invalid operations
    pub trap_invalid: Option<bool>,
    /// Raise on range errors
    pub trap_erange: Option<bool>,
    /// Raise on complex division by zero
    pub trap_divzero: Option<bool>,
    /// Raise when an operand's exponent is outside the current bounds
    pub trap_expbound: Option<bool>,
    /// Let real operations escalate to complex results
    pub allow_complex: Option<bool>,
    /// Make integer true division produce exact rationals
    pub rational_division: Option<bool>,
    /// Extra bits for temporaries that cannot be converted exactly
    pub guard_bits: Option<u32>,
}

impl ContextOptions {
    /// Names accepted by [`Context::set_option`](crate::Context::set_option)
    pub const NAMES: [&'static str; 19] = [
        "precision",
        "real_prec",
        "imag_prec",
        "round",
        "real_round",
        "imag_round",
        "emax",
        "emin",
        "subnormalize",
        "trap_underflow",
        "trap_overflow",
        "trap_inexact",
        "trap_invalid",
        "trap_erange",
        "trap_divzero",
        "trap_expbound",
        "allow_complex",
        "rational_division",
        "guard_bits",
    ];

    /// Create an empty option set
    pub fn new() -> Self {
        Default::default()
    }

    /// Set the working precision
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Set the complex component precisions
    pub fn with_complex_precision(mut self, real: Inherit<u32>, imag: Inherit<u32>) -> Self {
        self.real_prec = Some(real);
        self.imag_prec = Some(imag);
        self
    }

    /// Set the real rounding mode
    pub fn with_round(mut self, round: RoundingMode) -> Self {
        self.round = Some(round);
        self
    }

    /// Set the complex component rounding modes
    pub fn with_complex_round(
        mut self,
        real: Inherit<RoundingMode>,
        imag: Inherit<RoundingMode>,
    ) -> Self {
        self.real_round = Some(real);
        self.imag_round = Some(imag);
        self
    }

    /// Set the exponent window
    pub fn with_exponent_range(mut self, emin: i32, emax: i32) -> Self {
        self.emin = Some(emin);
        self.emax = Some(emax);
        self
    }

    /// Enable or disable subnormal results
    pub fn with_subnormalize(mut self, subnormalize: bool) -> Self {
        self.subnormalize = Some(subnormalize);
        self
    }

    /// Enable or disable the divide-by-zero trap
    pub fn with_trap_divzero(mut self, trap: bool) -> Self {
        self.trap_divzero = Some(trap);
        self
    }

    /// Enable or disable the inexact trap
    pub fn with_trap_inexact(mut self, trap: bool) -> Self {
        self.trap_inexact = Some(trap);
        self
    }

    /// Enable or disable the overflow trap
    pub fn with_trap_overflow(mut self, trap: bool) -> Self {
        self.trap_overflow = Some(trap);
        self
    }

    /// Enable or disable the underflow trap
    pub fn with_trap_underflow(mut self, trap: bool) -> Self {
        self.trap_underflow = Some(trap);
        self
    }

    /// Enable or disable the invalid-operation trap
    pub fn with_trap_invalid(mut self, trap: bool) -> Self {
        self.trap_invalid = Some(trap);
        self
    }

    /// Enable or disable the exponent-bound trap
    pub fn with_trap_expbound(mut self, trap: bool) -> Self {
        self.trap_expbound = Some(trap);
        self
    }

    /// Allow real operations to return complex results
    pub fn with_allow_complex(mut self, allow: bool) -> Self {
        self.allow_complex = Some(allow);
        self
    }

    /// Make integer true division exact
    pub fn with_rational_division(mut self, rational: bool) -> Self {
        self.rational_division = Some(rational);
        self
    }

    /// Set the guard bit count
    pub fn with_guard_bits(mut self, guard_bits: u32) -> Self {
        self.guard_bits = Some(guard_bits);
        self
    }

    /// Whether no option is set
    pub fn is_empty(&self) -> bool {
        *self == ContextOptions::default()
    }
}

/// Dynamically typed option value used by name-based option access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionValue {
    /// Boolean options (`subnormalize`, `trap_*`, `allow_complex`, ...)
    Bool(bool),
    /// Integer options (`precision`, `emax`, `emin`, `guard_bits`, ...)
    Int(i64),
    /// Rounding options
    Round(RoundingMode),
    /// Inherit marker for complex component options
    Default,
}

impl OptionValue {
    /// Short description of the representation, used in error messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "bool",
            OptionValue::Int(_) => "integer",
            OptionValue::Round(_) => "rounding mode",
            OptionValue::Default => "default",
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            OptionValue::Int(i) => write!(f, "{}", i),
            OptionValue::Round(r) => write!(f, "{}", r),
            OptionValue::Default => f.write_str("Default"),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Int(i64::from(value))
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Int(i64::from(value))
    }
}

impl From<RoundingMode> for OptionValue {
    fn from(value: RoundingMode) -> Self {
        OptionValue::Round(value)
    }
}
