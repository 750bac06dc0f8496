//! Pairwise Newtonian gravity
//!
//! Pure functions for the softened separation and the scalar force between
//! two bodies, plus the direct O(n) sum of accelerations acting on one body.
//! The direction of a force is applied by the caller from the displacement.

use super::states::{position_in, NVec3};

/// Gravitational constant in N m^2 / kg^2
pub const G: f64 = 6.6743015e-11;

/// Added to every separation so coincident bodies never divide by zero
pub const SOFTENING: f64 = 1e-9;

/// Softened Euclidean distance: `sqrt(dx^2 + dy^2 + dz^2) + SOFTENING`
#[inline]
pub fn distance(dx: f64, dy: f64, dz: f64) -> f64 {
    (dx * dx + dy * dy + dz * dz).sqrt() + SOFTENING
}

/// Scalar force magnitude `G * mi * mj / r^2`
#[inline]
pub fn force_magnitude(mi: f64, mj: f64, r: f64) -> f64 {
    G * mi * mj / (r * r)
}

/// Net acceleration on body `i` from every other body, read from one
/// flattened position row.
///
/// Contributions are summed in index order and the sum is divided by `m_i`
/// once at the end; the result depends only on `row` and `masses`.
#[inline]
pub fn net_acceleration(i: usize, row: &[f64], masses: &[f64]) -> NVec3 {
    let mi = masses[i];
    let xi = position_in(row, i);

    let mut acc = NVec3::zeros();
    for (j, &mj) in masses.iter().enumerate() {
        if i == j {
            continue;
        }
        // displacement points from i toward j, so the pull is along +d
        let d = position_in(row, j) - xi;
        let r = distance(d.x, d.y, d.z);
        let f = force_magnitude(mi, mj, r);
        acc += d * (f / r);
    }
    acc / mi
}
