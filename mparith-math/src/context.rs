//! Numeric context
//!
//! A [`Context`] holds everything an operation consults besides its operands:
//! working precision, rounding modes, the exponent window, sticky exception
//! flags, trap bits and the promotion policy switches. Operations read the
//! configuration and write only the sticky flags.
//!
//! A context may be marked read-only. Read-only contexts are templates: every
//! setter refuses to modify them, and operations handed one work on a private
//! copy instead.

use std::fmt;

use log::debug;
use rug::float::Round;

use crate::error::{NumError, NumResult};
use crate::flags::{Flags, Traps};
use crate::options::{ContextOptions, Inherit, OptionValue};
use crate::rounding::RoundingMode;

/// Largest accepted guard bit count
pub const MAX_GUARD_BITS: u32 = 1000;

/// Default working precision: the mantissa width of the platform double
pub const DEFAULT_PRECISION: u32 = f64::MANTISSA_DIGITS;

/// Smallest precision the back end accepts
pub fn prec_min() -> u32 {
    rug::float::prec_min()
}

/// Largest precision the back end accepts
pub fn prec_max() -> u32 {
    rug::float::prec_max()
}

/// Smallest exponent the back end can represent
pub fn emin_min() -> i32 {
    rug::float::exp_min()
}

/// Largest exponent the back end can represent
pub fn emax_max() -> i32 {
    rug::float::exp_max()
}

/// Configuration and sticky state consulted by every operation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Context {
    precision: u32,
    real_prec: Inherit<u32>,
    imag_prec: Inherit<u32>,
    round: RoundingMode,
    real_round: Inherit<RoundingMode>,
    imag_round: Inherit<RoundingMode>,
    emax: i32,
    emin: i32,
    subnormalize: bool,
    flags: Flags,
    traps: Traps,
    allow_complex: bool,
    rational_division: bool,
    guard_bits: u32,
    read_only: bool,
}

impl Context {
    /// Create a context with the default configuration
    pub fn new() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
            real_prec: Inherit::Default,
            imag_prec: Inherit::Default,
            round: RoundingMode::Nearest,
            real_round: Inherit::Default,
            imag_round: Inherit::Default,
            emax: emax_max(),
            emin: emin_min(),
            subnormalize: false,
            flags: Flags::empty(),
            traps: Traps::empty(),
            allow_complex: false,
            rational_division: false,
            guard_bits: 0,
            read_only: false,
        }
    }

    /// Create a context from a set of options
    pub fn with_options(options: &ContextOptions) -> NumResult<Self> {
        let mut ctx = Self::new();
        ctx.configure(options)?;
        Ok(ctx)
    }

    /// Create a context matching an IEEE 754 binary interchange format
    ///
    /// Supported widths are 32, 64 and 128 bits.
    pub fn ieee(bitwidth: u32) -> NumResult<Self> {
        let (precision, emax, emin) = match bitwidth {
            32 => (24, 128, -148),
            64 => (53, 1024, -1073),
            128 => (113, 16384, -16493),
            _ => {
                return Err(NumError::ValueOutOfDomain(
                    "bitwidth must be 32, 64, or 128".to_string(),
                ))
            }
        };

        let mut ctx = Self::new();
        ctx.precision = precision;
        ctx.emax = emax;
        ctx.emin = emin;
        ctx.subnormalize = true;
        Ok(ctx)
    }

    /// Copy this context
    ///
    /// The copy starts with all sticky flags cleared and is never read-only.
    pub fn copy(&self) -> Self {
        let mut result = self.clone();
        result.flags = Flags::empty();
        result.read_only = false;
        result
    }

    /// Mark this context as a read-only template
    pub fn into_template(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Check whether this context is a read-only template
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn ensure_writable(&self) -> NumResult<()> {
        if self.read_only {
            Err(NumError::ValueOutOfDomain(
                "context is read-only; modify a copy instead".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    /// Apply a set of options
    ///
    /// All options are validated before any is committed; on error this
    /// context is left unchanged.
    pub fn configure(&mut self, options: &ContextOptions) -> NumResult<()> {
        self.ensure_writable()?;
        let mut scratch = self.clone();

        if let Some(precision) = options.precision {
            scratch.set_precision(precision)?;
        }
        if let Some(real_prec) = options.real_prec {
            scratch.set_real_prec(real_prec)?;
        }
        if let Some(imag_prec) = options.imag_prec {
            scratch.set_imag_prec(imag_prec)?;
        }
        if let Some(real_round) = options.real_round {
            scratch.set_real_round(real_round)?;
        }
        if let Some(imag_round) = options.imag_round {
            scratch.set_imag_round(imag_round)?;
        }
        // Applied after the component modes so away-from-zero overrides them
        if let Some(round) = options.round {
            scratch.set_round(round)?;
        }
        if let Some(emax) = options.emax {
            scratch.set_emax(emax)?;
        }
        if let Some(emin) = options.emin {
            scratch.set_emin(emin)?;
        }
        if let Some(subnormalize) = options.subnormalize {
            scratch.subnormalize = subnormalize;
        }

        let trap_options = [
            (options.trap_underflow, Traps::UNDERFLOW),
            (options.trap_overflow, Traps::OVERFLOW),
            (options.trap_inexact, Traps::INEXACT),
            (options.trap_invalid, Traps::INVALID),
            (options.trap_erange, Traps::ERANGE),
            (options.trap_divzero, Traps::DIVZERO),
            (options.trap_expbound, Traps::EXPBOUND),
        ];
        for (enabled, trap) in trap_options {
            if let Some(enabled) = enabled {
                scratch.traps.set(trap, enabled);
            }
        }

        if let Some(allow_complex) = options.allow_complex {
            scratch.allow_complex = allow_complex;
        }
        if let Some(rational_division) = options.rational_division {
            scratch.rational_division = rational_division;
        }
        if let Some(guard_bits) = options.guard_bits {
            scratch.set_guard_bits(guard_bits)?;
        }

        debug!("context reconfigured: {:?}", options);
        *self = scratch;
        Ok(())
    }

    // Precision

    /// Working precision of real results
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Set the working precision
    pub fn set_precision(&mut self, precision: u32) -> NumResult<()> {
        self.ensure_writable()?;
        self.precision = check_precision("precision", precision)?;
        Ok(())
    }

    /// Effective precision of the real component of complex results
    pub fn real_prec(&self) -> u32 {
        self.real_prec.resolve(self.precision)
    }

    /// Effective precision of the imaginary component of complex results
    pub fn imag_prec(&self) -> u32 {
        self.imag_prec.resolve(self.real_prec())
    }

    /// The stored real component precision setting
    pub fn real_prec_setting(&self) -> Inherit<u32> {
        self.real_prec
    }

    /// The stored imaginary component precision setting
    pub fn imag_prec_setting(&self) -> Inherit<u32> {
        self.imag_prec
    }

    /// Set the real component precision
    pub fn set_real_prec(&mut self, real_prec: Inherit<u32>) -> NumResult<()> {
        self.ensure_writable()?;
        if let Inherit::Value(p) = real_prec {
            check_precision("real_prec", p)?;
        }
        self.real_prec = real_prec;
        Ok(())
    }

    /// Set the imaginary component precision
    pub fn set_imag_prec(&mut self, imag_prec: Inherit<u32>) -> NumResult<()> {
        self.ensure_writable()?;
        if let Inherit::Value(p) = imag_prec {
            check_precision("imag_prec", p)?;
        }
        self.imag_prec = imag_prec;
        Ok(())
    }

    /// Precision pair used for complex results
    pub fn complex_prec(&self) -> (u32, u32) {
        (self.real_prec(), self.imag_prec())
    }

    /// Working precision extended by the guard bits
    pub fn guarded_precision(&self) -> u32 {
        self.precision.saturating_add(self.guard_bits).min(prec_max())
    }

    // Rounding

    /// Rounding mode of real results
    pub fn round(&self) -> RoundingMode {
        self.round
    }

    /// Set the real rounding mode
    ///
    /// Away-from-zero rounding has no complex counterpart, so selecting it
    /// also sets both complex component modes to round-to-nearest.
    pub fn set_round(&mut self, round: RoundingMode) -> NumResult<()> {
        self.ensure_writable()?;
        self.round = round;
        if round == RoundingMode::AwayZero {
            self.real_round = Inherit::Value(RoundingMode::Nearest);
            self.imag_round = Inherit::Value(RoundingMode::Nearest);
        }
        Ok(())
    }

    /// Effective rounding mode of the real component of complex results
    pub fn real_round(&self) -> RoundingMode {
        self.real_round.resolve(self.round)
    }

    /// Effective rounding mode of the imaginary component of complex results
    pub fn imag_round(&self) -> RoundingMode {
        self.imag_round.resolve(self.real_round())
    }

    /// The stored real component rounding setting
    pub fn real_round_setting(&self) -> Inherit<RoundingMode> {
        self.real_round
    }

    /// The stored imaginary component rounding setting
    pub fn imag_round_setting(&self) -> Inherit<RoundingMode> {
        self.imag_round
    }

    /// Set the real component rounding mode
    pub fn set_real_round(&mut self, real_round: Inherit<RoundingMode>) -> NumResult<()> {
        self.ensure_writable()?;
        self.real_round = check_complex_round("real_round", real_round)?;
        Ok(())
    }

    /// Set the imaginary component rounding mode
    pub fn set_imag_round(&mut self, imag_round: Inherit<RoundingMode>) -> NumResult<()> {
        self.ensure_writable()?;
        self.imag_round = check_complex_round("imag_round", imag_round)?;
        Ok(())
    }

    /// Back-end rounding pair used for complex results
    pub fn complex_round(&self) -> (RoundingMode, RoundingMode) {
        let component = |mode: RoundingMode| {
            if mode.is_complex_mode() {
                mode
            } else {
                RoundingMode::Nearest
            }
        };
        (component(self.real_round()), component(self.imag_round()))
    }

    pub(crate) fn rug_round(&self) -> Round {
        self.round.to_round()
    }

    pub(crate) fn rug_complex_round(&self) -> (Round, Round) {
        let (re, im) = self.complex_round();
        (re.to_round(), im.to_round())
    }

    // Exponent window

    /// Largest allowed exponent
    pub fn emax(&self) -> i32 {
        self.emax
    }

    /// Smallest allowed exponent
    pub fn emin(&self) -> i32 {
        self.emin
    }

    /// Set the largest allowed exponent
    pub fn set_emax(&mut self, emax: i32) -> NumResult<()> {
        self.ensure_writable()?;
        if emax < emin_min() || emax > emax_max() {
            return Err(NumError::ValueOutOfDomain(
                "requested maximum exponent is invalid".to_string(),
            ));
        }
        self.emax = emax;
        Ok(())
    }

    /// Set the smallest allowed exponent
    pub fn set_emin(&mut self, emin: i32) -> NumResult<()> {
        self.ensure_writable()?;
        if emin < emin_min() || emin > emax_max() {
            return Err(NumError::ValueOutOfDomain(
                "requested minimum exponent is invalid".to_string(),
            ));
        }
        self.emin = emin;
        Ok(())
    }

    /// Whether subnormal results are produced
    pub fn subnormalize(&self) -> bool {
        self.subnormalize
    }

    /// Enable or disable subnormal results
    pub fn set_subnormalize(&mut self, subnormalize: bool) -> NumResult<()> {
        self.ensure_writable()?;
        self.subnormalize = subnormalize;
        Ok(())
    }

    // Sticky flags

    /// All sticky flags
    pub fn flags(&self) -> Flags {
        self.flags
    }

    /// Check a sticky flag
    pub fn has_flag(&self, flag: Flags) -> bool {
        self.flags.contains(flag)
    }

    /// Set or clear sticky flags
    pub fn set_flag(&mut self, flag: Flags, value: bool) -> NumResult<()> {
        self.ensure_writable()?;
        self.flags.set(flag, value);
        Ok(())
    }

    /// Underflow flag
    pub fn underflow(&self) -> bool {
        self.has_flag(Flags::UNDERFLOW)
    }

    /// Overflow flag
    pub fn overflow(&self) -> bool {
        self.has_flag(Flags::OVERFLOW)
    }

    /// Inexact flag
    pub fn inexact(&self) -> bool {
        self.has_flag(Flags::INEXACT)
    }

    /// Invalid-operation flag
    pub fn invalid(&self) -> bool {
        self.has_flag(Flags::INVALID)
    }

    /// Range-error flag
    pub fn erange(&self) -> bool {
        self.has_flag(Flags::ERANGE)
    }

    /// Division-by-zero flag
    pub fn divzero(&self) -> bool {
        self.has_flag(Flags::DIVZERO)
    }

    /// Clear all sticky flags
    pub fn clear_flags(&mut self) {
        self.flags = Flags::empty();
    }

    /// Merge flags raised by an operation
    pub(crate) fn raise(&mut self, flags: Flags) {
        self.flags |= flags;
    }

    // Traps

    /// All trap bits
    pub fn traps(&self) -> Traps {
        self.traps
    }

    /// Check a trap bit
    pub fn has_trap(&self, trap: Traps) -> bool {
        self.traps.contains(trap)
    }

    /// Enable or disable traps
    pub fn set_trap(&mut self, trap: Traps, enabled: bool) -> NumResult<()> {
        self.ensure_writable()?;
        self.traps.set(trap, enabled);
        Ok(())
    }

    // Promotion policy

    /// Whether real operations may return complex results
    pub fn allow_complex(&self) -> bool {
        self.allow_complex
    }

    /// Allow or forbid complex results from real operations
    pub fn set_allow_complex(&mut self, allow: bool) -> NumResult<()> {
        self.ensure_writable()?;
        self.allow_complex = allow;
        Ok(())
    }

    /// Whether integer true division yields exact rationals
    pub fn rational_division(&self) -> bool {
        self.rational_division
    }

    /// Select exact or rounded integer true division
    pub fn set_rational_division(&mut self, rational: bool) -> NumResult<()> {
        self.ensure_writable()?;
        self.rational_division = rational;
        Ok(())
    }

    /// Extra precision for temporaries that cannot be converted exactly
    pub fn guard_bits(&self) -> u32 {
        self.guard_bits
    }

    /// Set the guard bit count
    pub fn set_guard_bits(&mut self, guard_bits: u32) -> NumResult<()> {
        self.ensure_writable()?;
        if guard_bits > MAX_GUARD_BITS {
            return Err(NumError::ValueOutOfDomain("invalid value for guard_bits".to_string()));
        }
        self.guard_bits = guard_bits;
        Ok(())
    }

    // Name-based access

    /// Read an option by name
    pub fn get_option(&self, name: &str) -> NumResult<OptionValue> {
        let value = match name {
            "precision" => OptionValue::Int(i64::from(self.precision)),
            "real_prec" => OptionValue::Int(i64::from(self.real_prec())),
            "imag_prec" => OptionValue::Int(i64::from(self.imag_prec())),
            "round" => OptionValue::Round(self.round),
            "real_round" => OptionValue::Round(self.real_round()),
            "imag_round" => OptionValue::Round(self.imag_round()),
            "emax" => OptionValue::Int(i64::from(self.emax)),
            "emin" => OptionValue::Int(i64::from(self.emin)),
            "subnormalize" => OptionValue::Bool(self.subnormalize),
            "underflow" => OptionValue::Bool(self.underflow()),
            "overflow" => OptionValue::Bool(self.overflow()),
            "inexact" => OptionValue::Bool(self.inexact()),
            "invalid" => OptionValue::Bool(self.invalid()),
            "erange" => OptionValue::Bool(self.erange()),
            "divzero" => OptionValue::Bool(self.divzero()),
            "allow_complex" => OptionValue::Bool(self.allow_complex),
            "rational_division" => OptionValue::Bool(self.rational_division),
            "guard_bits" => OptionValue::Int(i64::from(self.guard_bits)),
            other => match trap_for_name(other) {
                Some(trap) => OptionValue::Bool(self.has_trap(trap)),
                None => return Err(unknown_option(other)),
            },
        };
        Ok(value)
    }

    /// Set an option by name
    ///
    /// A value of the wrong representation fails with `TypeMismatch`; an
    /// unknown name or a value outside the option's domain fails with
    /// `ValueOutOfDomain`.
    pub fn set_option(&mut self, name: &str, value: OptionValue) -> NumResult<()> {
        self.ensure_writable()?;
        match name {
            "precision" => {
                let p = expect_precision(name, value)?;
                self.set_precision(p)
            }
            "real_prec" | "imag_prec" => {
                let setting = match value {
                    OptionValue::Default => Inherit::Default,
                    other => Inherit::Value(expect_precision(name, other)?),
                };
                if name == "real_prec" {
                    self.set_real_prec(setting)
                } else {
                    self.set_imag_prec(setting)
                }
            }
            "round" => match value {
                OptionValue::Round(mode) => self.set_round(mode),
                other => Err(wrong_kind(name, "rounding mode", other)),
            },
            "real_round" | "imag_round" => {
                let setting = match value {
                    OptionValue::Default => Inherit::Default,
                    OptionValue::Round(mode) => Inherit::Value(mode),
                    other => return Err(wrong_kind(name, "rounding mode", other)),
                };
                if name == "real_round" {
                    self.set_real_round(setting)
                } else {
                    self.set_imag_round(setting)
                }
            }
            "emax" | "emin" => {
                let exp = match value {
                    OptionValue::Int(v) => i32::try_from(v).map_err(|_| {
                        NumError::ValueOutOfDomain(format!("requested {} is invalid", name))
                    })?,
                    other => return Err(wrong_kind(name, "integer", other)),
                };
                if name == "emax" {
                    self.set_emax(exp)
                } else {
                    self.set_emin(exp)
                }
            }
            "guard_bits" => match value {
                OptionValue::Int(v) => {
                    let bits = u32::try_from(v).map_err(|_| {
                        NumError::ValueOutOfDomain("invalid value for guard_bits".to_string())
                    })?;
                    self.set_guard_bits(bits)
                }
                other => Err(wrong_kind(name, "integer", other)),
            },
            _ => {
                let enabled = match value {
                    OptionValue::Bool(b) => b,
                    other => {
                        if is_bool_option(name) {
                            return Err(wrong_kind(name, "bool", other));
                        }
                        return Err(unknown_option(name));
                    }
                };
                match name {
                    "subnormalize" => self.set_subnormalize(enabled),
                    "allow_complex" => self.set_allow_complex(enabled),
                    "rational_division" => self.set_rational_division(enabled),
                    other => {
                        if let Some(trap) = trap_for_name(other) {
                            self.set_trap(trap, enabled)
                        } else if let Some(flag) = flag_for_name(other) {
                            self.set_flag(flag, enabled)
                        } else {
                            Err(unknown_option(other))
                        }
                    }
                }
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = |v: bool| if v { "True" } else { "False" };
        writeln!(
            f,
            "context(precision={}, real_prec={}, imag_prec={},",
            self.precision, self.real_prec, self.imag_prec
        )?;
        writeln!(
            f,
            "        round={}, real_round={}, imag_round={},",
            self.round, self.real_round, self.imag_round
        )?;
        writeln!(f, "        emax={}, emin={},", self.emax, self.emin)?;
        writeln!(f, "        subnormalize={},", b(self.subnormalize))?;
        for (name, flag) in Flags::NAMES {
            writeln!(
                f,
                "        trap_{}={}, {}={},",
                name,
                b(self.traps.contains(Traps::for_flags(flag))),
                name,
                b(self.flags.contains(flag))
            )?;
        }
        writeln!(f, "        trap_expbound={},", b(self.traps.contains(Traps::EXPBOUND)))?;
        writeln!(f, "        allow_complex={},", b(self.allow_complex))?;
        writeln!(f, "        rational_division={},", b(self.rational_division))?;
        write!(f, "        guard_bits={})", self.guard_bits)
    }
}

fn check_precision(name: &str, precision: u32) -> NumResult<u32> {
    if precision < prec_min() || precision > prec_max() {
        Err(NumError::ValueOutOfDomain(format!("invalid value for {}", name)))
    } else {
        Ok(precision)
    }
}

fn check_complex_round(
    name: &str,
    setting: Inherit<RoundingMode>,
) -> NumResult<Inherit<RoundingMode>> {
    match setting {
        Inherit::Value(mode) if !mode.is_complex_mode() => {
            Err(NumError::ValueOutOfDomain(format!("invalid value for {}", name)))
        }
        other => Ok(other),
    }
}

fn expect_precision(name: &str, value: OptionValue) -> NumResult<u32> {
    match value {
        OptionValue::Int(v) => {
            let p = u32::try_from(v)
                .map_err(|_| NumError::ValueOutOfDomain(format!("invalid value for {}", name)))?;
            check_precision(name, p)
        }
        other => Err(wrong_kind(name, "integer", other)),
    }
}

fn wrong_kind(name: &str, expected: &str, got: OptionValue) -> NumError {
    NumError::TypeMismatch(format!("{} must be {}, not {}", name, expected, got.kind_name()))
}

fn unknown_option(name: &str) -> NumError {
    NumError::ValueOutOfDomain(format!("unknown context option '{}'", name))
}

fn trap_for_name(name: &str) -> Option<Traps> {
    let trap = match name {
        "trap_underflow" => Traps::UNDERFLOW,
        "trap_overflow" => Traps::OVERFLOW,
        "trap_inexact" => Traps::INEXACT,
        "trap_invalid" => Traps::INVALID,
        "trap_erange" => Traps::ERANGE,
        "trap_divzero" => Traps::DIVZERO,
        "trap_expbound" => Traps::EXPBOUND,
        _ => return None,
    };
    Some(trap)
}

fn flag_for_name(name: &str) -> Option<Flags> {
    Flags::NAMES.iter().find(|(n, _)| *n == name).map(|(_, flag)| *flag)
}

fn is_bool_option(name: &str) -> bool {
    matches!(name, "subnormalize" | "allow_complex" | "rational_division")
        || trap_for_name(name).is_some()
        || flag_for_name(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_context() {
        let ctx = Context::new();
        assert_eq!(ctx.precision(), 53);
        assert_eq!(ctx.round(), RoundingMode::Nearest);
        assert_eq!(ctx.emax(), emax_max());
        assert_eq!(ctx.emin(), emin_min());
        assert!(!ctx.subnormalize());
        assert!(ctx.flags().is_empty());
        assert!(ctx.traps().is_empty());
        assert_eq!(ctx.guard_bits(), 0);
        assert!(!ctx.is_read_only());
    }

    #[test]
    fn test_component_defaults_resolve() {
        let mut ctx = Context::new();
        ctx.set_precision(100).unwrap();
        assert_eq!(ctx.complex_prec(), (100, 100));

        ctx.set_real_prec(Inherit::Value(80)).unwrap();
        assert_eq!(ctx.complex_prec(), (80, 80));

        ctx.set_imag_prec(Inherit::Value(60)).unwrap();
        assert_eq!(ctx.complex_prec(), (80, 60));

        ctx.set_round(RoundingMode::Up).unwrap();
        assert_eq!(ctx.complex_round(), (RoundingMode::Up, RoundingMode::Up));
    }

    #[test]
    fn test_away_zero_forces_complex_nearest() {
        let mut ctx = Context::new();
        ctx.set_real_round(Inherit::Value(RoundingMode::Down)).unwrap();
        ctx.set_round(RoundingMode::AwayZero).unwrap();
        assert_eq!(ctx.round(), RoundingMode::AwayZero);
        assert_eq!(ctx.real_round(), RoundingMode::Nearest);
        assert_eq!(ctx.imag_round(), RoundingMode::Nearest);
    }

    #[test]
    fn test_component_round_rejects_away_zero() {
        let mut ctx = Context::new();
        let err = ctx.set_real_round(Inherit::Value(RoundingMode::AwayZero)).unwrap_err();
        assert!(matches!(err, NumError::ValueOutOfDomain(_)));
    }

    #[test]
    fn test_precision_domain() {
        let mut ctx = Context::new();
        assert!(ctx.set_precision(0).is_err());
        assert!(ctx.set_precision(prec_min()).is_ok());
        assert_eq!(ctx.precision(), prec_min());
    }

    #[test]
    fn test_guard_bits_domain() {
        let mut ctx = Context::new();
        assert!(ctx.set_guard_bits(MAX_GUARD_BITS).is_ok());
        assert!(ctx.set_guard_bits(MAX_GUARD_BITS + 1).is_err());
        assert_eq!(ctx.guard_bits(), MAX_GUARD_BITS);
    }

    #[test]
    fn test_configure_is_atomic() {
        let mut ctx = Context::new();
        let options = ContextOptions::new().with_precision(200).with_guard_bits(MAX_GUARD_BITS + 5);
        assert!(ctx.configure(&options).is_err());
        assert_eq!(ctx, Context::new());
    }

    #[test]
    fn test_read_only_refuses_setters() {
        let mut ctx = Context::new().into_template();
        assert!(ctx.set_precision(100).is_err());
        assert!(ctx.configure(&ContextOptions::new().with_precision(100)).is_err());
        let mut copy = ctx.copy();
        assert!(copy.set_precision(100).is_ok());
    }

    #[test]
    fn test_set_option_wrong_kind() {
        let mut ctx = Context::new();
        let err = ctx.set_option("subnormalize", OptionValue::Int(1)).unwrap_err();
        assert!(matches!(err, NumError::TypeMismatch(_)));

        let err = ctx.set_option("precision", OptionValue::Bool(true)).unwrap_err();
        assert!(matches!(err, NumError::TypeMismatch(_)));

        let err = ctx.set_option("no_such_option", OptionValue::Bool(true)).unwrap_err();
        assert!(matches!(err, NumError::ValueOutOfDomain(_)));
    }

    #[test]
    fn test_set_option_round_trip() {
        let mut ctx = Context::new();
        ctx.set_option("trap_inexact", true.into()).unwrap();
        ctx.set_option("precision", 120u32.into()).unwrap();
        ctx.set_option("imag_round", RoundingMode::Zero.into()).unwrap();
        assert_eq!(ctx.get_option("trap_inexact").unwrap(), OptionValue::Bool(true));
        assert_eq!(ctx.get_option("precision").unwrap(), OptionValue::Int(120));
        assert_eq!(ctx.get_option("imag_round").unwrap(), OptionValue::Round(RoundingMode::Zero));
        assert_eq!(ctx.get_option("real_prec").unwrap(), OptionValue::Int(120));
    }

    #[test]
    fn test_display_mentions_every_option() {
        let text = Context::new().to_string();
        for name in ContextOptions::NAMES {
            assert!(text.contains(name), "missing {}", name);
        }
    }
}
