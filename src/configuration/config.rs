//! Optional YAML run configuration.
//!
//! Physical inputs (time step, total time, bodies) always come from the
//! command line and the input table. The config file only supplies defaults
//! for how the run is scheduled:
//!
//! - [`EngineConfig`] – backend, thread count and chunk size
//! - [`RunConfig`]    – top-level wrapper loaded from YAML
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   backend: "pool"   # "rayon" (default) or "pool"
//!   threads: 8        # used when no thread count is given on the command line
//!   chunk_size: 32    # bodies claimed per unit of work
//! ```
//!
//! Every field is optional. Values given on the command line win over the
//! file, and the file wins over the built-in defaults.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::Deserialize;

use crate::error::{NbodyError, Result};
use crate::simulation::engine::{default_threads, Backend, Engine};
use crate::parallel::DEFAULT_CHUNK_SIZE;

/// Scheduling defaults
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub backend: Option<Backend>,  // integrator scheduler
    pub threads: Option<i64>,      // worker threads
    pub chunk_size: Option<usize>, // bodies per claimed chunk
}

/// Top-level run configuration loaded from YAML
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub engine: EngineConfig,
}

impl RunConfig {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_yaml::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| NbodyError::io(path, e))?;
        Self::from_reader(BufReader::new(file))
    }

    /// Resolve the engine from command-line overrides, this file, and the
    /// built-in defaults, in that order
    pub fn engine(
        &self,
        backend: Option<Backend>,
        threads: Option<i64>,
        chunk_size: Option<usize>,
    ) -> Result<Engine> {
        let backend = backend.or(self.engine.backend).unwrap_or_default();
        let threads = threads
            .or(self.engine.threads)
            .unwrap_or_else(|| default_threads() as i64);
        let chunk_size = chunk_size
            .or(self.engine.chunk_size)
            .unwrap_or(DEFAULT_CHUNK_SIZE);
        Engine::new(backend, threads, chunk_size)
    }
}
