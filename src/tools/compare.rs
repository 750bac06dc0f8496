//! Table comparison used to check outputs of different runs against each
//! other. Tolerances follow numpy's `allclose` defaults.

use crate::io::Matrix;

pub const RTOL: f64 = 1e-5;
pub const ATOL: f64 = 1e-8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Comparison {
    Equal,
    AllClose,
    UnequalShapes,
    NotClose { max_abs_diff: f64, max_rel_diff: f64 },
}

impl Comparison {
    /// Process exit status for the comparison tool
    pub fn exit_code(&self) -> u8 {
        match self {
            Comparison::Equal | Comparison::AllClose => 0,
            Comparison::NotClose { .. } => 1,
            Comparison::UnequalShapes => 2,
        }
    }
}

/// `|a - b| <= atol + rtol * |b|`, elementwise
fn close(a: f64, b: f64) -> bool {
    a == b || (a - b).abs() <= ATOL + RTOL * b.abs()
}

// f64::max ignores NaN, which would hide a NaN mismatch
fn max_or_nan(m: f64, d: f64) -> f64 {
    if m.is_nan() || d.is_nan() {
        f64::NAN
    } else {
        m.max(d)
    }
}

pub fn compare(a: &Matrix, b: &Matrix, exact: bool) -> Comparison {
    if a.shape() != b.shape() {
        return Comparison::UnequalShapes;
    }

    let pairs = || a.as_slice().iter().zip(b.as_slice());
    if pairs().all(|(x, y)| x == y) {
        return Comparison::Equal;
    }
    if !exact && pairs().all(|(x, y)| close(*x, *y)) {
        return Comparison::AllClose;
    }

    let max_abs_diff = pairs().map(|(x, y)| (x - y).abs()).fold(0.0, max_or_nan);
    let max_rel_diff = pairs()
        .filter(|(_, y)| **y != 0.0)
        .map(|(_, y)| max_abs_diff / y.abs())
        .fold(0.0, max_or_nan);
    Comparison::NotClose {
        max_abs_diff,
        max_rel_diff,
    }
}
