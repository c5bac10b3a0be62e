//! Error taxonomy for context configuration and numeric operations
//!
//! Every failure surfaces immediately to the caller of the operation that
//! triggered it. Exception conditions whose trap bit is disabled never show up
//! here; they are recorded as sticky flags on the context instead.

use thiserror::Error;

use crate::flags::Traps;

/// Errors that can occur while configuring a context or evaluating an operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumError {
    /// The operands satisfy no rung of the promotion ladder, or an option
    /// value was supplied with the wrong representation
    #[error("{0}")]
    TypeMismatch(String),

    /// A configuration value fails its domain check
    #[error("{0}")]
    ValueOutOfDomain(String),

    /// Exact division by zero, or trapped complex division by zero
    #[error("{0}")]
    DivisionByZero(String),

    /// Trapped underflow
    #[error("underflow in {0}")]
    Underflow(&'static str),

    /// Trapped overflow
    #[error("overflow in {0}")]
    Overflow(&'static str),

    /// Trapped inexact result
    #[error("inexact result in {0}")]
    Inexact(&'static str),

    /// Trapped invalid operation
    #[error("invalid operation in {0}")]
    Invalid(&'static str),

    /// Trapped range error
    #[error("range error in {0}")]
    Erange(&'static str),

    /// An operand's exponent lies outside the current context bounds and the
    /// exponent-bound trap is enabled
    #[error("exponent of operand out of bounds in {0}")]
    ExponentOutOfBounds(&'static str),

    /// Internal invariant violation
    #[error("internal error: {0}")]
    SystemInconsistency(String),
}

impl NumError {
    /// Build the error corresponding to a single trapped condition
    ///
    /// The first enabled bit wins, in the order underflow, overflow, inexact,
    /// invalid, erange, divzero, expbound.
    pub fn from_trap(trapped: Traps, op: &'static str) -> Option<Self> {
        if trapped.contains(Traps::UNDERFLOW) {
            Some(NumError::Underflow(op))
        } else if trapped.contains(Traps::OVERFLOW) {
            Some(NumError::Overflow(op))
        } else if trapped.contains(Traps::INEXACT) {
            Some(NumError::Inexact(op))
        } else if trapped.contains(Traps::INVALID) {
            Some(NumError::Invalid(op))
        } else if trapped.contains(Traps::ERANGE) {
            Some(NumError::Erange(op))
        } else if trapped.contains(Traps::DIVZERO) {
            Some(NumError::DivisionByZero(format!("division by zero in {}", op)))
        } else if trapped.contains(Traps::EXPBOUND) {
            Some(NumError::ExponentOutOfBounds(op))
        } else {
            None
        }
    }

    /// Check whether this error was produced by an enabled trap
    pub fn is_trap(&self) -> bool {
        matches!(
            self,
            NumError::Underflow(_)
                | NumError::Overflow(_)
                | NumError::Inexact(_)
                | NumError::Invalid(_)
                | NumError::Erange(_)
                | NumError::ExponentOutOfBounds(_)
        )
    }
}

/// Result type for numeric operations
pub type NumResult<T> = Result<T, NumError>;
