//! Random input tables for the simulator.
//!
//! Masses and positions are uniform in their ranges. Speeds are uniform in
//! `[min_velocity, max_velocity)` (or fixed) and every velocity points in a
//! uniformly random direction.

use std::f64::consts::TAU;

use crate::error::{NbodyError, Result};
use crate::io::Matrix;
use crate::simulation::sampler::INPUT_COLS;

#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    pub min_mass: f64,
    pub max_mass: f64,
    pub mass: Option<f64>, // fixed mass, overrides the range
    pub min_position: f64,
    pub max_position: f64,
    pub min_velocity: f64,
    pub max_velocity: f64,
    pub velocity: Option<f64>, // fixed speed, overrides the range
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            min_mass: 0.1,
            max_mass: 1.0,
            mass: None,
            min_position: -1.0,
            max_position: 1.0,
            min_velocity: 0.0,
            max_velocity: 1.0,
            velocity: None,
        }
    }
}

impl GenerateOptions {
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(NbodyError::validation(msg));
        if self.min_mass <= 0.0 {
            return fail("min-mass must be positive");
        }
        if self.max_mass < self.min_mass {
            return fail("max-mass must be greater than or equal to the min-mass");
        }
        if self.mass.is_some_and(|m| m <= 0.0) {
            return fail("mass must be positive");
        }
        if self.max_position <= self.min_position {
            return fail("max-position must be greater than the min-position");
        }
        if self.min_velocity < 0.0 {
            return fail("min-velocity must be non-negative");
        }
        if self.max_velocity < self.min_velocity {
            return fail("max-velocity must be greater than or equal to the min-velocity");
        }
        if self.velocity.is_some_and(|v| v < 0.0) {
            return fail("velocity must be non-negative");
        }
        Ok(())
    }
}

fn uniform(rng: &mut fastrand::Rng, lo: f64, hi: f64) -> f64 {
    lo + (hi - lo) * rng.f64()
}

/// Uniformly distributed unit vector
fn direction(rng: &mut fastrand::Rng) -> [f64; 3] {
    let z = uniform(rng, -1.0, 1.0);
    let phi = uniform(rng, 0.0, TAU);
    let rho = (1.0 - z * z).sqrt();
    [rho * phi.cos(), rho * phi.sin(), z]
}

/// Build an `n x 7` input table
pub fn random_input(n: usize, opts: &GenerateOptions, rng: &mut fastrand::Rng) -> Result<Matrix> {
    opts.validate()?;
    let mut table = Matrix::zeros(n, INPUT_COLS);

    for i in 0..n {
        let row = table.row_mut(i);
        row[0] = opts
            .mass
            .unwrap_or_else(|| uniform(rng, opts.min_mass, opts.max_mass));
        for p in &mut row[1..4] {
            *p = uniform(rng, opts.min_position, opts.max_position);
        }

        let speed = opts
            .velocity
            .unwrap_or_else(|| uniform(rng, opts.min_velocity, opts.max_velocity));
        if speed != 0.0 {
            let dir = direction(rng);
            for (v, d) in row[4..7].iter_mut().zip(dir) {
                *v = speed * d;
            }
        }
    }
    Ok(table)
}
