use nbsim::{npy, simulate, Backend, Parameters, RunConfig};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use std::io;
use std::path::PathBuf;
use std::time::Instant;

/// Brute-force gravitational N-body simulation.
///
/// Reads an n-by-7 table (mass, x, y, z, vx, vy, vz per body) and writes the
/// positions of every body at evenly spaced steps as a num-outputs-by-3n table.
#[derive(Parser, Debug)]
#[command(author, version, about, allow_negative_numbers = true)]
struct Args {
    /// Seconds between steps
    time_step: f64,

    /// Total simulated seconds
    total_time: f64,

    /// Number of positions to output per body
    outputs_per_body: i64,

    /// Input .npy file (n-by-7)
    input: PathBuf,

    /// Output .npy file
    output: PathBuf,

    /// Worker threads (default: one per physical core)
    num_threads: Option<i64>,

    /// YAML run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Integrator scheduler
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Bodies claimed per unit of work
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    // argument checks come before any file is touched
    let parameters = Parameters::new(args.time_step, args.total_time, args.outputs_per_body)?;

    let config = match &args.config {
        Some(path) => RunConfig::from_path(path)
            .with_context(|| format!("error reading config {}", path.display()))?,
        None => RunConfig::default(),
    };
    let engine = config.engine(args.backend, args.num_threads, args.chunk_size)?;

    let input = npy::load(&args.input).context("error reading input")?;

    let start = Instant::now();
    let output = simulate(&input, parameters, engine)?;
    let secs = start.elapsed().as_secs_f64();
    println!("{secs:.6} secs");

    npy::save(&args.output, &output).context("error writing output")?;
    info!(
        rows = output.rows(),
        cols = output.cols(),
        path = %args.output.display(),
        "wrote output"
    );

    Ok(())
}
