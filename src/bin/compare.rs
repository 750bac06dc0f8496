use nbsim::{compare, npy, Comparison};

use anyhow::{Context, Result};
use clap::Parser;

use std::path::PathBuf;
use std::process::ExitCode;

/// Compares two .npy tables to make sure they are (almost) equal
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// First table
    a: PathBuf,

    /// Second table
    b: PathBuf,

    /// Require exact equality instead of allclose
    #[arg(long)]
    exact: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let a = npy::load(&args.a).with_context(|| format!("error reading {}", args.a.display()))?;
    let b = npy::load(&args.b).with_context(|| format!("error reading {}", args.b.display()))?;

    let result = compare(&a, &b, args.exact);
    match result {
        Comparison::Equal => println!("equal"),
        Comparison::AllClose => println!("allclose"),
        Comparison::UnequalShapes => println!("unequal shapes"),
        Comparison::NotClose { max_abs_diff, max_rel_diff } => {
            println!("not equal/allclose");
            println!("max absolute difference is {max_abs_diff}");
            println!("max relative difference is {max_rel_diff}");
        }
    }
    Ok(ExitCode::from(result.exit_code()))
}
