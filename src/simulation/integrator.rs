//! Fixed-step semi-implicit Euler integration over the trajectory buffer
//!
//! Step `s` reads the frozen trajectory row `s` and writes row `s + 1`:
//!
//!   a_i = (1 / m_i) * sum_{j != i} F_ij * (x_j - x_i) / r_ij
//!   v_i += a_i * dt
//!   x_i(s + 1) = x_i(s) + v_i * dt
//!
//! Body `i` only touches its own velocity and its own three columns of row
//! `s + 1`, so all bodies of one step can run concurrently. Steps are
//! separated by a full join. Both schedulers below share [`advance_chunk`],
//! which makes their results bit-identical for any thread count.

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use tracing::debug;

use super::forces::net_acceleration;
use super::states::{Body, Trajectory, AXES};
use crate::error::Result;
use crate::parallel::{SharedSlice, WorkerPool};

/// Advances every body through all the steps recorded by a trajectory
pub trait Integrator: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fill rows `1..=trajectory.steps()` starting from row 0 and the
    /// bodies' initial velocities
    fn integrate(&self, trajectory: &mut Trajectory, bodies: &mut [Body], dt: f64) -> Result<()>;
}

/// Advance bodies `start..start + bodies.len()` by one step.
///
/// `current` is the whole row `s`; `next` is the slice of row `s + 1` that
/// belongs to these bodies.
#[inline]
pub fn advance_chunk(
    start: usize,
    current: &[f64],
    masses: &[f64],
    bodies: &mut [Body],
    next: &mut [f64],
    dt: f64,
) {
    debug_assert_eq!(next.len(), bodies.len() * AXES);
    for (k, (body, out)) in bodies.iter_mut().zip(next.chunks_exact_mut(AXES)).enumerate() {
        let i = start + k;
        let a = net_acceleration(i, current, masses);

        // kick with this step's acceleration, then drift with the new velocity
        body.velocity += a * dt;
        let k0 = i * AXES;
        out[0] = current[k0] + body.velocity.x * dt;
        out[1] = current[k0 + 1] + body.velocity.y * dt;
        out[2] = current[k0 + 2] + body.velocity.z * dt;
    }
}

fn masses_of(bodies: &[Body]) -> Vec<f64> {
    bodies.iter().map(|b| b.mass).collect()
}

fn check_shape(trajectory: &Trajectory, bodies: &[Body]) {
    assert_eq!(
        trajectory.bodies(),
        bodies.len(),
        "trajectory and body array disagree on body count"
    );
}

/// Structured parallel-for on a dedicated rayon pool.
///
/// Each step is one `par_chunks_mut` pass over row `s + 1`; rayon's work
/// stealing balances the chunks and the end of the pass is the step barrier.
#[derive(Debug, Clone, Copy)]
pub struct RayonIntegrator {
    pub threads: usize,
    pub chunk_size: usize,
}

impl Integrator for RayonIntegrator {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn integrate(&self, trajectory: &mut Trajectory, bodies: &mut [Body], dt: f64) -> Result<()> {
        check_shape(trajectory, bodies);
        let n = bodies.len();
        if n == 0 {
            return Ok(());
        }

        let masses = masses_of(bodies);
        let chunk = self.chunk_size.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.threads.clamp(1, n))
            .build()?;
        debug!(threads = pool.current_num_threads(), chunk, "rayon integrator");

        pool.install(|| {
            for s in 0..trajectory.steps() {
                let (current, next) = trajectory.split_step(s);
                next.par_chunks_mut(chunk * AXES)
                    .zip(bodies.par_chunks_mut(chunk))
                    .enumerate()
                    .for_each(|(c, (out, group))| {
                        advance_chunk(c * chunk, current, &masses, group, out, dt);
                    });
            }
        });
        Ok(())
    }
}

/// Explicit worker pool: contiguous chunks claimed dynamically, one
/// rendezvous per step.
#[derive(Debug, Clone, Copy)]
pub struct PoolIntegrator {
    pub threads: usize,
    pub chunk_size: usize,
}

impl Integrator for PoolIntegrator {
    fn name(&self) -> &'static str {
        "pool"
    }

    fn integrate(&self, trajectory: &mut Trajectory, bodies: &mut [Body], dt: f64) -> Result<()> {
        check_shape(trajectory, bodies);
        let n = bodies.len();
        let steps = trajectory.steps();
        let stride = trajectory.stride();
        let masses = masses_of(bodies);

        let pool = WorkerPool::new(self.threads.clamp(1, n.max(1)), self.chunk_size)?;
        debug!(threads = pool.threads().min(n), chunk = pool.chunk_size(), "pool integrator");

        let positions = SharedSlice::new(trajectory.as_mut_slice());
        let velocities = SharedSlice::new(bodies);

        pool.run_rounds(steps, n, |s, range| {
            let row = s * stride;
            let next = row + stride;
            // SAFETY: row `s` was completed before the previous rendezvous and
            // nobody writes it during round `s`. The pool gives each body range
            // to exactly one worker per round, so the velocity slice and the
            // row `s + 1` columns borrowed here are disjoint from every other
            // worker's.
            let (current, out, group) = unsafe {
                (
                    positions.slice(row..next),
                    positions.slice_mut(next + range.start * AXES..next + range.end * AXES),
                    velocities.slice_mut(range.clone()),
                )
            };
            advance_chunk(range.start, current, &masses, group, out, dt);
        })
    }
}
