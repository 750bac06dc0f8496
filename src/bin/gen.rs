use nbsim::{npy, random_input, GenerateOptions};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use std::path::PathBuf;

/// Generates a random n-by-7 input table for nbsim
#[derive(Parser, Debug)]
#[command(author, version, about, allow_negative_numbers = true)]
struct Args {
    /// Number of bodies to create
    n: usize,

    /// File to write the n-by-7 table to
    output: PathBuf,

    /// Minimum body mass in kg (must be > 0)
    #[arg(long, default_value_t = 0.1)]
    min_mass: f64,

    /// Maximum body mass in kg (must be >= min-mass)
    #[arg(long, default_value_t = 1.0)]
    max_mass: f64,

    /// Fixed mass of all bodies, overrides min-mass and max-mass
    #[arg(long)]
    mass: Option<f64>,

    /// Minimum coordinate in m
    #[arg(long, default_value_t = -1.0)]
    min_position: f64,

    /// Maximum coordinate in m (must be > min-position)
    #[arg(long, default_value_t = 1.0)]
    max_position: f64,

    /// Minimum speed in m/s (must be >= 0)
    #[arg(long, default_value_t = 0.0)]
    min_velocity: f64,

    /// Maximum speed in m/s (must be >= min-velocity)
    #[arg(long, default_value_t = 1.0)]
    max_velocity: f64,

    /// Fixed speed of all bodies, overrides min-velocity and max-velocity
    #[arg(long)]
    velocity: Option<f64>,

    /// Seed for reproducible tables
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let opts = GenerateOptions {
        min_mass: args.min_mass,
        max_mass: args.max_mass,
        mass: args.mass,
        min_position: args.min_position,
        max_position: args.max_position,
        min_velocity: args.min_velocity,
        max_velocity: args.max_velocity,
        velocity: args.velocity,
    };
    let mut rng = match args.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    let table = random_input(args.n, &opts, &mut rng)?;
    npy::save(&args.output, &table).context("error writing output")?;
    info!(bodies = args.n, path = %args.output.display(), "wrote input table");
    Ok(())
}
