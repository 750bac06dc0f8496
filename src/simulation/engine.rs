//! Runtime scheduling settings
//!
//! Selects the integrator backend, the worker count and the chunk size used
//! when running a `Scenario`.

use serde::Deserialize;
use tracing::info;

use super::integrator::{Integrator, PoolIntegrator, RayonIntegrator};
use crate::error::{NbodyError, Result};
use crate::parallel::DEFAULT_CHUNK_SIZE;

/// How the per-step work is spread over threads
#[derive(Deserialize, clap::ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backend {
    #[default]
    #[serde(rename = "rayon")] // structured parallel-for with work stealing
    Rayon,

    #[serde(rename = "pool")] // fixed worker pool with a rendezvous per step
    Pool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Engine {
    pub backend: Backend,
    pub threads: usize,    // worker threads, clamped to the body count at run time
    pub chunk_size: usize, // bodies claimed per unit of work
}

impl Engine {
    /// Validate a thread count and chunk size.
    ///
    /// `threads` is signed so a negative override is reported as a
    /// validation error rather than a parse failure.
    pub fn new(backend: Backend, threads: i64, chunk_size: usize) -> Result<Self> {
        if threads <= 0 {
            return Err(NbodyError::validation("num-threads must be positive"));
        }
        if chunk_size == 0 {
            return Err(NbodyError::validation("chunk-size must be positive"));
        }
        let threads = usize::try_from(threads)
            .map_err(|_| NbodyError::validation("num-threads is too large"))?;
        Ok(Self {
            backend,
            threads,
            chunk_size,
        })
    }

    /// Same engine with the thread count capped at `bodies`
    pub fn for_bodies(self, bodies: usize) -> Self {
        let threads = self.threads.min(bodies.max(1));
        if threads < self.threads {
            info!(requested = self.threads, threads, "thread count clamped to body count");
        }
        Self { threads, ..self }
    }

    pub fn integrator(&self) -> Box<dyn Integrator> {
        match self.backend {
            Backend::Rayon => Box::new(RayonIntegrator {
                threads: self.threads,
                chunk_size: self.chunk_size,
            }),
            Backend::Pool => Box::new(PoolIntegrator {
                threads: self.threads,
                chunk_size: self.chunk_size,
            }),
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            threads: default_threads(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// One worker per physical core
pub fn default_threads() -> usize {
    num_cpus::get_physical().max(1)
}
