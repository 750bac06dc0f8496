//! Error types shared by the library and the binaries.
//!
//! Every error is terminal for a run: the simulation either completes and
//! writes its output table, or it fails before producing anything.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while validating, loading, simulating or saving.
#[derive(Debug, Error)]
pub enum NbodyError {
    /// A run parameter or input value is out of range.
    #[error("{0}")]
    Validation(String),

    /// The input table has the wrong shape or is not a valid array file.
    #[error("input format error: {0}")]
    InputFormat(String),

    /// Reading or writing an array file failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The trajectory buffer could not be allocated.
    #[error("cannot allocate {rows}x{cols} trajectory buffer")]
    ResourceExhausted { rows: usize, cols: usize },

    /// The rayon worker pool could not be built.
    #[error("thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A YAML run configuration could not be read or parsed.
    #[error("config: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl NbodyError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::InputFormat(msg.into())
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Library result type.
pub type Result<T> = std::result::Result<T, NbodyError>;
