use crate::BfError;

/// Floating point type used throughout system
pub type Real = f64;

/// 1/(4π), the normalization shared by every singularity kernel.
pub const INV_FOUR_PI: Real = 0.25 * std::f64::consts::FRAC_1_PI;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, BfError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(BfError::NonFinite { what, value: v })
    }
}

/// Check every entry of a slice, reporting the first offending value.
pub fn ensure_all_finite(values: &[Real], what: &'static str) -> Result<(), BfError> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(&value) => Err(BfError::NonFinite { what, value }),
        None => Ok(()),
    }
}

/// Division that returns zero instead of inf/NaN for a vanishing denominator.
#[inline]
pub fn safe_div(num: Real, den: Real, eps: Real) -> Real {
    if den.abs() < eps { 0.0 } else { num / den }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nearly_equal_basic() {
        let tol = Tolerances {
            abs: 1e-12,
            rel: 1e-9,
        };
        assert!(nearly_equal(1.0, 1.0 + 1e-12, tol));
        assert!(nearly_equal(0.0, 1e-13, tol));
        assert!(!nearly_equal(1.0, 1.0 + 1e-6, tol));
    }

    #[test]
    fn ensure_finite_detects_nan() {
        let err = ensure_finite(Real::NAN, "test").unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("Non-finite"));
    }

    #[test]
    fn ensure_all_finite_reports_first_bad_value() {
        assert!(ensure_all_finite(&[1.0, 2.0], "ok").is_ok());
        let err = ensure_all_finite(&[1.0, Real::INFINITY, Real::NAN], "doublet").unwrap_err();
        match err {
            BfError::NonFinite { what, value } => {
                assert_eq!(what, "doublet");
                assert!(value.is_infinite());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn safe_div_guards_zero() {
        assert_eq!(safe_div(1.0, 0.0, 1e-12), 0.0);
        assert_eq!(safe_div(1.0, 2.0, 1e-12), 0.5);
    }

    proptest! {
        #[test]
        fn nearly_equal_is_symmetric(a in -1e6f64..1e6, b in -1e6f64..1e6) {
            let tol = Tolerances::default();
            prop_assert_eq!(nearly_equal(a, b, tol), nearly_equal(b, a, tol));
        }
    }
}
