use crate::BbError;

/// Floating point type used throughout the bricks
pub type Real = f64;

/// Absolute/relative tolerance pair used when comparing evaluated tensors.
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

/// Component-wise [`nearly_equal`]; slices of different lengths never match.
pub fn nearly_equal_slices(a: &[Real], b: &[Real], tol: Tolerances) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| nearly_equal(*x, *y, tol))
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, BbError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(BbError::NonFinite { what, value: v })
    }
}

/// Check `lo < v <= hi` (the damage bound convention).
pub fn ensure_in_half_open(
    v: Real,
    lo: Real,
    hi: Real,
    what: &'static str,
) -> Result<Real, BbError> {
    let v = ensure_finite(v, what)?;
    if v > lo && v <= hi {
        Ok(v)
    } else {
        Err(BbError::OutOfRange {
            what,
            value: v,
            expected: format!("a value in ({lo}, {hi}]"),
        })
    }
}

pub fn ensure_positive(v: Real, what: &'static str) -> Result<Real, BbError> {
    let v = ensure_finite(v, what)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(BbError::OutOfRange {
            what,
            value: v,
            expected: "a strictly positive value".to_string(),
        })
    }
}
