//! Build and run a simulation from an input table
//!
//! A `Scenario` is the run-time bundle owned by the driver for one run:
//! - validated parameters and the output plan
//! - scheduling settings (`Engine`)
//! - the mutable body array (mass + velocity)
//! - the trajectory buffer, row 0 filled with the initial positions
//!
//! Everything is validated before the trajectory is allocated, so a bad
//! argument never costs a large allocation.

use tracing::{debug, info};

use super::engine::Engine;
use super::params::Parameters;
use super::sampler::{self, OutputPlan};
use super::states::{center_of_mass, total_momentum, Body, Trajectory};
use crate::error::Result;
use crate::io::Matrix;

pub struct Scenario {
    pub parameters: Parameters,
    pub engine: Engine,
    pub plan: OutputPlan,
    pub bodies: Vec<Body>,
    pub trajectory: Trajectory,
}

impl Scenario {
    pub fn build(input: &Matrix, parameters: Parameters, engine: Engine) -> Result<Self> {
        sampler::validate_input(input)?;
        let plan = OutputPlan::new(parameters.num_steps, parameters.requested_outputs)?;
        let engine = engine.for_bodies(input.rows());

        let trajectory = sampler::initial_trajectory(input, parameters.num_steps)?;
        let bodies = sampler::project_bodies(input);

        Ok(Self {
            parameters,
            engine,
            plan,
            bodies,
            trajectory,
        })
    }

    /// Run every step, filling the whole trajectory
    pub fn integrate(&mut self) -> Result<()> {
        let integrator = self.engine.integrator();
        info!(
            bodies = self.bodies.len(),
            steps = self.parameters.num_steps,
            dt = self.parameters.time_step,
            backend = integrator.name(),
            threads = self.engine.threads,
            "starting simulation"
        );

        let p0 = total_momentum(&self.bodies);
        integrator.integrate(&mut self.trajectory, &mut self.bodies, self.parameters.time_step)?;
        let p1 = total_momentum(&self.bodies);
        let masses: Vec<f64> = self.bodies.iter().map(|b| b.mass).collect();
        let com = center_of_mass(self.trajectory.row(self.trajectory.steps()), &masses);
        debug!(drift = (p1 - p0).norm(), com = ?com.as_slice(), "momentum drift");
        Ok(())
    }

    /// Down-sampled output table
    pub fn output(&self) -> Matrix {
        sampler::downsample(&self.trajectory, &self.plan)
    }

    pub fn run(mut self) -> Result<Matrix> {
        self.integrate()?;
        Ok(self.output())
    }
}

/// Validate, integrate and down-sample in one call
pub fn simulate(input: &Matrix, parameters: Parameters, engine: Engine) -> Result<Matrix> {
    Scenario::build(input, parameters, engine)?.run()
}
