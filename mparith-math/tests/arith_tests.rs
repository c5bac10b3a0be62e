// Arithmetic tests across the promotion ladder, exception handling and scoped
// contexts

use mparith_math::{
    add, cmp, div, div_mod, eq, floor_div, fmod, get_current, ladder, local_context, modulo, mul,
    pow, remainder, sqrt, sub, with_local_context, BigInt, ComplexValue, Context, ContextOptions,
    Inherit, Kind, NumError, NumericValue, Path, Real, ReturnCode, RoundingMode,
};
use std::cmp::Ordering;
use std::sync::Arc;

fn ratio(n: i64, d: i64) -> NumericValue {
    NumericValue::rational(n, d).unwrap()
}

#[cfg(test)]
mod ladder_tests {
    use super::*;

    #[test]
    fn test_result_kind_follows_operands() {
        let mut ctx = Context::new();
        let half = ratio(1, 2);
        let z = NumericValue::Complex(ComplexValue::from_f64(1.0, 1.0));

        let r = add(1, 2, Some(&mut ctx)).unwrap();
        assert_eq!(r.as_integer(), Some(&BigInt::from(3)));

        let r = add(1, &half, Some(&mut ctx)).unwrap();
        assert_eq!(r, ratio(3, 2));
        assert_eq!(r.kind(), Kind::Rational);

        let r = add(1, 0.5, Some(&mut ctx)).unwrap();
        assert_eq!(r.kind(), Kind::Real);
        assert_eq!(r.as_real().unwrap().to_f64(), 1.5);

        let r = add(&z, 1, Some(&mut ctx)).unwrap();
        assert_eq!(r.kind(), Kind::Complex);
        assert_eq!(r.as_complex().unwrap().real().to_f64(), 2.0);

        assert!(ctx.flags().is_empty());
    }

    #[test]
    fn test_rational_results_are_canonical() {
        let mut ctx = Context::new();
        let r = sub(&ratio(5, 6), &ratio(1, 3), Some(&mut ctx)).unwrap();
        assert_eq!(r, ratio(1, 2));
        let r = mul(&ratio(2, 3), 3, Some(&mut ctx)).unwrap();
        assert_eq!(r.as_rational().unwrap().denom(), &BigInt::from(1));
    }

    #[test]
    fn test_ceiling_rejects_complex() {
        let mut ctx = Context::new();
        let z = NumericValue::Complex(ComplexValue::from_f64(1.0, 0.0));
        assert!(matches!(floor_div(&z, 2, Some(&mut ctx)), Err(NumError::TypeMismatch(_))));
        assert!(matches!(fmod(2, &z, Some(&mut ctx)), Err(NumError::TypeMismatch(_))));
        assert!(matches!(cmp(&z, 1, Some(&mut ctx)), Err(NumError::TypeMismatch(_))));
        assert!(eq(&z, 1, Some(&mut ctx)).unwrap());
    }
}

#[cfg(test)]
mod division_tests {
    use super::*;

    #[test]
    fn test_integer_true_division() {
        let mut ctx = Context::new();
        let r = div(1, 4, Some(&mut ctx)).unwrap();
        assert_eq!(r.kind(), Kind::Real);
        assert_eq!(r, ratio(1, 4));
        assert!(ctx.flags().is_empty());

        let r = div(1, 3, Some(&mut ctx)).unwrap();
        assert_eq!(r.as_real().unwrap().to_f64(), 1.0 / 3.0);
        assert!(ctx.inexact());
    }

    #[test]
    fn test_rational_division_policy() {
        let mut ctx = Context::with_options(&ContextOptions::new().with_rational_division(true)).unwrap();
        let r = div(1, 3, Some(&mut ctx)).unwrap();
        assert_eq!(r, ratio(1, 3));
        assert_eq!(r.kind(), Kind::Rational);

        let r = div(6, 3, Some(&mut ctx)).unwrap();
        assert_eq!(r.as_rational().unwrap().numer(), &BigInt::from(2));
        assert_eq!(r, NumericValue::from(2));
        assert!(ctx.flags().is_empty());
    }

    #[test]
    fn test_exact_division_by_zero() {
        let mut ctx = Context::new();
        assert!(matches!(div(1, 0, Some(&mut ctx)), Err(NumError::DivisionByZero(_))));
        assert!(matches!(div(&ratio(1, 2), 0, Some(&mut ctx)), Err(NumError::DivisionByZero(_))));
        assert!(matches!(floor_div(7, 0, Some(&mut ctx)), Err(NumError::DivisionByZero(_))));
        assert!(matches!(modulo(7, 0, Some(&mut ctx)), Err(NumError::DivisionByZero(_))));
    }

    #[test]
    fn test_complex_division_by_zero() {
        let mut ctx = Context::new();
        let z = NumericValue::Complex(ComplexValue::from_f64(1.0, 1.0));
        let zero = NumericValue::Complex(ComplexValue::from_f64(0.0, 0.0));
        div(&z, &zero, Some(&mut ctx)).unwrap();
        assert!(ctx.divzero());

        let mut ctx = Context::with_options(&ContextOptions::new().with_trap_divzero(true)).unwrap();
        assert!(matches!(div(&z, &zero, Some(&mut ctx)), Err(NumError::DivisionByZero(_))));
        assert!(ctx.divzero());
    }

    #[test]
    fn test_floor_division_and_modulo() {
        let mut ctx = Context::new();
        assert_eq!(floor_div(7, -2, Some(&mut ctx)).unwrap(), NumericValue::from(-4));
        assert_eq!(modulo(7, -2, Some(&mut ctx)).unwrap(), NumericValue::from(-1));
        assert_eq!(modulo(&ratio(7, 2), 2, Some(&mut ctx)).unwrap(), ratio(3, 2));

        let (q, r) = div_mod(-7, 2, Some(&mut ctx)).unwrap();
        assert_eq!(q, NumericValue::from(-4));
        assert_eq!(r, NumericValue::from(1));

        let q = floor_div(7.5, 2, Some(&mut ctx)).unwrap();
        assert_eq!(q.kind(), Kind::Real);
        assert_eq!(q, NumericValue::from(3));
        let r = modulo(-7.5, 2, Some(&mut ctx)).unwrap();
        assert_eq!(r.as_real().unwrap().to_f64(), 0.5);
    }

    #[test]
    fn test_fmod_and_remainder() {
        let mut ctx = Context::new();
        assert_eq!(fmod(7.5, 2, Some(&mut ctx)).unwrap().as_real().unwrap().to_f64(), 1.5);
        assert_eq!(fmod(-7.5, 2, Some(&mut ctx)).unwrap().as_real().unwrap().to_f64(), -1.5);
        let r = remainder(7, 4, Some(&mut ctx)).unwrap();
        assert_eq!(r.kind(), Kind::Real);
        assert_eq!(r, NumericValue::from(-1));
    }
}

#[cfg(test)]
mod pow_tests {
    use super::*;

    #[test]
    fn test_exact_powers() {
        let mut ctx = Context::new();
        assert_eq!(pow(2, 100, Some(&mut ctx)).unwrap(), NumericValue::integer(BigInt::from(1u128 << 100)));
        assert_eq!(pow(&ratio(2, 3), 2, Some(&mut ctx)).unwrap(), ratio(4, 9));
        assert_eq!(pow(&ratio(2, 3), -2, Some(&mut ctx)).unwrap(), ratio(9, 4));
    }

    #[test]
    fn test_negative_integer_exponent_is_real() {
        let mut ctx = Context::new();
        let r = pow(2, -2, Some(&mut ctx)).unwrap();
        assert_eq!(r.kind(), Kind::Real);
        assert_eq!(r, ratio(1, 4));
    }

    #[test]
    fn test_fractional_power_of_negative() {
        let third = ratio(1, 3);

        let mut ctx = Context::new();
        let r = pow(-8, &third, Some(&mut ctx)).unwrap();
        assert!(r.is_nan());
        assert!(ctx.invalid());

        let mut ctx = Context::with_options(&ContextOptions::new().with_allow_complex(true)).unwrap();
        let r = pow(-8, &third, Some(&mut ctx)).unwrap();
        assert_eq!(r.kind(), Kind::Complex);
        assert!(!ctx.invalid());
    }
}

#[cfg(test)]
mod exception_tests {
    use super::*;

    #[test]
    fn test_inexact_trap_names_operation() {
        let mut ctx = Context::with_options(&ContextOptions::new().with_trap_inexact(true)).unwrap();
        assert_eq!(div(1, 3, Some(&mut ctx)).unwrap_err(), NumError::Inexact("division"));
        assert!(ctx.inexact());
        assert_eq!(add(1, 0.5, Some(&mut ctx)).unwrap(), ratio(3, 2));
    }

    #[test]
    fn test_read_only_context_keeps_no_flags() {
        let mut template = Context::new().into_template();
        div(1, 3, Some(&mut template)).unwrap();
        assert!(template.flags().is_empty());
    }

    #[test]
    fn test_directed_rounding() {
        let mut down = Context::with_options(&ContextOptions::new().with_round(RoundingMode::Down)).unwrap();
        let mut up = Context::with_options(&ContextOptions::new().with_round(RoundingMode::Up)).unwrap();
        let lo = div(1, 3, Some(&mut down)).unwrap();
        let hi = div(1, 3, Some(&mut up)).unwrap();
        assert_eq!(cmp(&lo, &hi, Some(&mut down)).unwrap(), Some(Ordering::Less));
        assert_eq!(cmp(&lo, &ratio(1, 3), Some(&mut down)).unwrap(), Some(Ordering::Less));
        assert_eq!(cmp(&hi, &ratio(1, 3), Some(&mut up)).unwrap(), Some(Ordering::Greater));
    }

    #[test]
    fn test_precision_applies_to_result() {
        let mut ctx = Context::new();
        ctx.set_precision(200).unwrap();
        let r = div(1, 3, Some(&mut ctx)).unwrap();
        assert_eq!(r.as_real().unwrap().prec(), 200);
        let coarse = r.as_real().unwrap().round_to(53, RoundingMode::Nearest).unwrap();
        assert_eq!(coarse.to_f64(), 1.0 / 3.0);
    }

    #[test]
    fn test_operand_above_window_is_coerced() {
        let huge = NumericValue::Real(Real::from_f64(1e300));
        let mut ctx = Context::ieee(32).unwrap();
        let r = add(&huge, 0, Some(&mut ctx)).unwrap();
        assert!(r.as_real().unwrap().is_infinite());
        assert!(ctx.overflow());

        let mut ctx = Context::with_options(&ContextOptions::new().with_trap_expbound(true)).unwrap();
        ctx.set_emax(128).unwrap();
        assert_eq!(add(&huge, 0, Some(&mut ctx)).unwrap_err(), NumError::ExponentOutOfBounds("addition"));
    }
}

#[cfg(test)]
mod result_format_tests {
    use super::*;

    #[test]
    fn test_complex_components_follow_context() {
        let opts = ContextOptions::new()
            .with_complex_precision(Inherit::Value(30), Inherit::Value(60))
            .with_complex_round(Inherit::Value(RoundingMode::Down), Inherit::Value(RoundingMode::Up));
        let mut ctx = Context::with_options(&opts).unwrap();
        let z = NumericValue::Complex(ComplexValue::from_f64(1.0, 1.0));

        let r = div(&z, 3, Some(&mut ctx)).unwrap();
        let c = r.as_complex().unwrap();
        assert_eq!(c.prec(), (30, 60));
        assert_eq!(c.round_mode(), (RoundingMode::Down, RoundingMode::Up));
        assert_eq!(c.rc(), (ReturnCode::RoundedDown, ReturnCode::RoundedUp));
        assert!(ctx.inexact());

        let third = ratio(1, 3);
        let re = NumericValue::Real(c.real());
        let im = NumericValue::Real(c.imag());
        assert_eq!(cmp(&re, &third, Some(&mut ctx)).unwrap(), Some(Ordering::Less));
        assert_eq!(cmp(&im, &third, Some(&mut ctx)).unwrap(), Some(Ordering::Greater));
        assert_eq!(c.real().prec(), 30);
    }

    #[test]
    fn test_subnormal_result_under_ieee_double() {
        let tiny = NumericValue::Real(Real::from_f64(f64::MIN_POSITIVE));

        let mut ctx = Context::ieee(64).unwrap();
        let r = div(&tiny, 3, Some(&mut ctx)).unwrap();
        let value = r.as_real().unwrap().to_f64();
        assert_eq!(value, f64::MIN_POSITIVE / 3.0);
        assert!(value.is_subnormal());
        assert!(ctx.underflow());
        assert!(ctx.inexact());

        let mut ctx = Context::ieee(64).unwrap();
        let r = mul(&tiny, 0.5, Some(&mut ctx)).unwrap();
        assert_eq!(r.as_real().unwrap().to_f64(), f64::MIN_POSITIVE / 2.0);
        assert!(ctx.flags().is_empty());
    }
}

#[cfg(test)]
mod current_context_tests {
    use super::*;

    #[test]
    fn test_operations_default_to_current_context() {
        let r = with_local_context(ContextOptions::new().with_precision(20), |active| {
            let r = div(1, 3, None)?;
            assert!(active.lock().inexact());
            Ok(r)
        })
        .unwrap();
        assert_eq!(r.as_real().unwrap().prec(), 20);
        assert!(!get_current().lock().inexact());
    }

    #[test]
    fn test_restored_after_trapped_failure() {
        let before = get_current();
        let result = with_local_context(ContextOptions::new().with_trap_inexact(true), |_| {
            div(1, 3, None)
        });
        assert_eq!(result.unwrap_err(), NumError::Inexact("division"));
        assert!(Arc::ptr_eq(&before, &get_current()));
        assert!(!get_current().lock().has_trap(mparith_math::Traps::INEXACT));
    }

    #[test]
    fn test_nested_scopes_unwind_in_order() {
        let outer_before = get_current();
        {
            let _outer = local_context(ContextOptions::new().with_precision(100)).unwrap();
            {
                let _inner = local_context(ContextOptions::new().with_round(RoundingMode::Up)).unwrap();
                let active = get_current();
                let active = active.lock();
                assert_eq!(active.precision(), 100);
                assert_eq!(active.round(), RoundingMode::Up);
            }
            assert_eq!(get_current().lock().round(), RoundingMode::Nearest);
            assert_eq!(get_current().lock().precision(), 100);
        }
        assert!(Arc::ptr_eq(&outer_before, &get_current()));
    }

    #[test]
    fn test_sqrt_uses_scoped_allow_complex() {
        let r = with_local_context(ContextOptions::new().with_allow_complex(true), |_| sqrt(-1, None))
            .unwrap();
        assert_eq!(r.kind(), Kind::Complex);
        assert!(sqrt(-1, None).unwrap().is_nan());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn kind() -> impl Strategy<Value = Kind> {
        prop_oneof![
            Just(Kind::Integer),
            Just(Kind::Rational),
            Just(Kind::Real),
            Just(Kind::Complex),
        ]
    }

    proptest! {
        #[test]
        fn prop_ladder_symmetric_and_covering(a in kind(), b in kind()) {
            let path = ladder(a, b);
            prop_assert_eq!(path, ladder(b, a));
            prop_assert!(path.accepts(a) && path.accepts(b));
            prop_assert!(path >= Path::Integer);
        }

        #[test]
        fn prop_integer_addition_exact(a in any::<i64>(), b in any::<i64>()) {
            let mut ctx = Context::new();
            let sum = add(a, b, Some(&mut ctx)).unwrap();
            prop_assert_eq!(sum.as_integer(), Some(&(BigInt::from(a) + BigInt::from(b))));
            prop_assert!(ctx.flags().is_empty());
        }

        #[test]
        fn prop_cmp_matches_host(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
            let mut ctx = Context::new();
            let x = NumericValue::Real(Real::from_f64(a as f64));
            prop_assert_eq!(cmp(&x, b, Some(&mut ctx)).unwrap(), Some(a.cmp(&b)));
        }

        #[test]
        fn prop_div_mod_reconstructs(a in -100_000i64..100_000, b in 1i64..1000) {
            let mut ctx = Context::new();
            let (q, r) = div_mod(a, b, Some(&mut ctx)).unwrap();
            let q = q.as_integer().unwrap().clone();
            let r = r.as_integer().unwrap().clone();
            prop_assert_eq!(q * b + &r, BigInt::from(a));
            prop_assert!(r >= BigInt::from(0) && r < BigInt::from(b));
        }
    }
}
