pub mod error;
pub mod io;
pub mod parallel;
pub mod simulation;
pub mod configuration;
pub mod benchmark;
pub mod tools;

pub use error::{NbodyError, Result};
pub use io::{npy, Matrix};

pub use simulation::states::{Body, Trajectory, NVec3, total_momentum, center_of_mass};
pub use simulation::forces::{distance, force_magnitude, net_acceleration, G, SOFTENING};
pub use simulation::integrator::{Integrator, RayonIntegrator, PoolIntegrator, advance_chunk};
pub use simulation::sampler::{OutputPlan, downsample, initial_trajectory, project_bodies};
pub use simulation::params::Parameters;
pub use simulation::engine::{Backend, Engine, default_threads};
pub use simulation::scenario::{Scenario, simulate};

pub use parallel::{Rendezvous, RendezvousResult, WorkerPool};

pub use configuration::config::{EngineConfig, RunConfig};

pub use benchmark::benchmark::{bench_backends, make_input, time_run};

pub use tools::compare::{compare, Comparison};
pub use tools::generate::{random_input, GenerateOptions};
