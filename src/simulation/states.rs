//! Core state types for the N-body simulation.
//!
//! - `Body` holds the mutable per-body state (mass and velocity)
//! - `Trajectory` is the append-only history of positions, one row per step
//!
//! Positions are never stored on the body: the trajectory row for the current
//! step is the only source of truth for where a body is.

use nalgebra::Vector3;

use crate::error::{NbodyError, Result};

pub type NVec3 = Vector3<f64>;

/// Values stored per body in a trajectory row
pub const AXES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub mass: f64,     // mass, fixed for the run
    pub velocity: NVec3, // velocity, updated every step
}

impl Body {
    pub fn new(mass: f64, velocity: NVec3) -> Self {
        Self { mass, velocity }
    }

    pub fn momentum(&self) -> NVec3 {
        self.velocity * self.mass
    }
}

/// Sum of `m * v` over all bodies
pub fn total_momentum(bodies: &[Body]) -> NVec3 {
    bodies.iter().fold(NVec3::zeros(), |p, b| p + b.momentum())
}

/// Mass-weighted mean position of a trajectory row
pub fn center_of_mass(row: &[f64], masses: &[f64]) -> NVec3 {
    let total: f64 = masses.iter().sum();
    let weighted = masses
        .iter()
        .enumerate()
        .fold(NVec3::zeros(), |acc, (i, m)| acc + position_in(row, i) * *m);
    weighted / total
}

/// Position of body `i` inside a flattened `x, y, z` row
#[inline]
pub fn position_in(row: &[f64], i: usize) -> NVec3 {
    let k = i * AXES;
    NVec3::new(row[k], row[k + 1], row[k + 2])
}

/// Per-step position history as a strided 2D view.
///
/// Row `s` holds the flattened `(x, y, z)` of every body after `s` steps, so
/// the buffer has `steps + 1` rows of `AXES * n` values.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    data: Vec<f64>,
    bodies: usize,
    stride: usize,
    rows: usize,
}

impl Trajectory {
    /// Allocate a zeroed history for `bodies` bodies over `steps` steps.
    ///
    /// The size is computed with overflow checks and reserved fallibly, so an
    /// oversized run reports `ResourceExhausted` instead of aborting.
    pub fn zeroed(steps: usize, bodies: usize) -> Result<Self> {
        let exhausted = || NbodyError::ResourceExhausted {
            rows: steps.saturating_add(1),
            cols: bodies.saturating_mul(AXES),
        };
        let rows = steps.checked_add(1).ok_or_else(exhausted)?;
        let stride = bodies.checked_mul(AXES).ok_or_else(exhausted)?;
        let len = rows.checked_mul(stride).ok_or_else(exhausted)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|_| exhausted())?;
        data.resize(len, 0.0);

        Ok(Self {
            data,
            bodies,
            stride,
            rows,
        })
    }

    pub fn bodies(&self) -> usize {
        self.bodies
    }

    /// Number of steps the history covers (rows - 1)
    pub fn steps(&self) -> usize {
        self.rows - 1
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Values per row (`3 * bodies`)
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn row(&self, s: usize) -> &[f64] {
        assert!(s < self.rows, "row {s} out of range for {} rows", self.rows);
        &self.data[s * self.stride..(s + 1) * self.stride]
    }

    pub fn row_mut(&mut self, s: usize) -> &mut [f64] {
        assert!(s < self.rows, "row {s} out of range for {} rows", self.rows);
        &mut self.data[s * self.stride..(s + 1) * self.stride]
    }

    /// Bounds-checked `(row, body, axis)` accessor
    pub fn get(&self, row: usize, body: usize, axis: usize) -> Option<f64> {
        if row < self.rows && body < self.bodies && axis < AXES {
            Some(self.data[row * self.stride + body * AXES + axis])
        } else {
            None
        }
    }

    /// Position of `body` after `row` steps
    pub fn position(&self, row: usize, body: usize) -> NVec3 {
        assert!(body < self.bodies, "body {body} out of range for {} bodies", self.bodies);
        position_in(self.row(row), body)
    }

    pub fn set_position(&mut self, row: usize, body: usize, p: NVec3) {
        assert!(body < self.bodies, "body {body} out of range for {} bodies", self.bodies);
        let k = body * AXES;
        self.row_mut(row)[k..k + AXES].copy_from_slice(p.as_slice());
    }

    /// Split into the frozen row `s` and the writable row `s + 1`
    pub fn split_step(&mut self, s: usize) -> (&[f64], &mut [f64]) {
        assert!(s + 1 < self.rows, "step {s} has no successor row");
        let (head, tail) = self.data.split_at_mut((s + 1) * self.stride);
        (&head[s * self.stride..], &mut tail[..self.stride])
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_has_steps_plus_one_rows() {
        let t = Trajectory::zeroed(4, 2).unwrap();
        assert_eq!(t.rows(), 5);
        assert_eq!(t.steps(), 4);
        assert_eq!(t.stride(), 6);
        assert!(t.row(4).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn accessor_is_bounds_checked() {
        let mut t = Trajectory::zeroed(1, 2).unwrap();
        t.set_position(1, 1, NVec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.get(1, 1, 2), Some(3.0));
        assert_eq!(t.row(1), &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
        assert_eq!(t.get(2, 0, 0), None);
        assert_eq!(t.get(0, 2, 0), None);
        assert_eq!(t.get(0, 0, 3), None);
    }

    #[test]
    fn split_step_exposes_adjacent_rows() {
        let mut t = Trajectory::zeroed(2, 1).unwrap();
        t.set_position(1, 0, NVec3::new(7.0, 8.0, 9.0));
        let (cur, next) = t.split_step(1);
        assert_eq!(cur, &[7.0, 8.0, 9.0]);
        next.copy_from_slice(&[1.0, 1.0, 1.0]);
        assert_eq!(t.position(2, 0), NVec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn oversized_buffer_is_resource_exhaustion() {
        let err = Trajectory::zeroed(usize::MAX, 2).unwrap_err();
        assert!(matches!(err, NbodyError::ResourceExhausted { .. }));
        let err = Trajectory::zeroed(1 << 40, 1 << 20).unwrap_err();
        assert!(matches!(err, NbodyError::ResourceExhausted { .. }));
    }

    #[test]
    fn momentum_sums_mass_times_velocity() {
        let bodies = [
            Body::new(2.0, NVec3::new(1.0, 0.0, 0.0)),
            Body::new(1.0, NVec3::new(-2.0, 3.0, 0.0)),
        ];
        assert_eq!(total_momentum(&bodies), NVec3::new(0.0, 3.0, 0.0));
    }
}
