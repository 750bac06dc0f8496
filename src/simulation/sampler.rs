//! Trajectory construction and down-sampling
//!
//! Builds the initial trajectory row and the body array from the n×7 input
//! table, and afterwards selects a strided subset of trajectory rows for the
//! output table.

use tracing::{debug, info};

use crate::error::{NbodyError, Result};
use crate::io::Matrix;

use super::states::{Body, NVec3, Trajectory, AXES};

/// Columns of the input table: `[mass, x, y, z, vx, vy, vz]`
pub const INPUT_COLS: usize = 7;

const MASS: usize = 0;
const POSITION: usize = 1;
const VELOCITY: usize = 4;

/// Check the input table shape and body masses
pub fn validate_input(input: &Matrix) -> Result<()> {
    if input.cols() != INPUT_COLS {
        return Err(NbodyError::format(format!(
            "input must have {INPUT_COLS} columns, got {}",
            input.cols()
        )));
    }
    if input.rows() == 0 {
        return Err(NbodyError::validation("input must have at least 1 body"));
    }
    for i in 0..input.rows() {
        let m = input.row(i)[MASS];
        if !(m.is_finite() && m > 0.0) {
            return Err(NbodyError::validation(format!(
                "body {i} has non-positive mass {m}"
            )));
        }
    }
    Ok(())
}

/// Allocate the `(steps + 1) x 3n` history and copy initial positions into row 0
pub fn initial_trajectory(input: &Matrix, steps: usize) -> Result<Trajectory> {
    let n = input.rows();
    let mut trajectory = Trajectory::zeroed(steps, n)?;
    let row0 = trajectory.row_mut(0);
    for (i, dst) in row0.chunks_exact_mut(AXES).enumerate() {
        dst.copy_from_slice(&input.row(i)[POSITION..POSITION + AXES]);
    }
    debug!(rows = trajectory.rows(), cols = trajectory.stride(), "allocated trajectory");
    Ok(trajectory)
}

/// Mass and initial velocity of every body; positions stay in the trajectory
pub fn project_bodies(input: &Matrix) -> Vec<Body> {
    (0..input.rows())
        .map(|i| {
            let r = input.row(i);
            Body::new(
                r[MASS],
                NVec3::new(r[VELOCITY], r[VELOCITY + 1], r[VELOCITY + 2]),
            )
        })
        .collect()
}

/// Which trajectory rows end up in the output table.
///
/// `num_outputs` is recomputed from `output_steps` so the final state is
/// always included; it may differ from what the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputPlan {
    pub num_steps: usize,
    pub output_steps: usize,
    pub num_outputs: usize,
}

impl OutputPlan {
    /// Plan `requested` outputs over `num_steps` steps.
    ///
    /// A request larger than the step count degrades to a single output.
    pub fn new(num_steps: usize, requested: usize) -> Result<Self> {
        if num_steps == 0 {
            return Err(NbodyError::validation("simulation must run at least 1 step"));
        }
        if requested == 0 {
            return Err(NbodyError::validation("outputs-per-body must be positive"));
        }

        let effective = if num_steps < requested { 1 } else { requested };
        let output_steps = num_steps / effective;
        let num_outputs = num_steps.div_ceil(output_steps);

        if num_outputs != requested {
            info!(requested, num_outputs, output_steps, "adjusted output count");
        }

        Ok(Self {
            num_steps,
            output_steps,
            num_outputs,
        })
    }

    /// Trajectory row copied into output row `k`
    pub fn source_row(&self, k: usize) -> usize {
        if k + 1 == self.num_outputs {
            self.num_steps
        } else {
            k * self.output_steps
        }
    }

    pub fn source_rows(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.num_outputs).map(|k| self.source_row(k))
    }
}

/// Copy the planned rows of `trajectory` into a `num_outputs x 3n` table
pub fn downsample(trajectory: &Trajectory, plan: &OutputPlan) -> Matrix {
    assert_eq!(
        trajectory.steps(),
        plan.num_steps,
        "plan does not match trajectory length"
    );
    let mut output = Matrix::zeros(plan.num_outputs, trajectory.stride());
    for (k, s) in plan.source_rows().enumerate() {
        output.row_mut(k).copy_from_slice(trajectory.row(s));
    }
    output
}
