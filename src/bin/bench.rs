use nbsim::{bench_backends, default_threads};

use anyhow::Result;
use clap::Parser;

/// Times both integrator backends over a range of body and thread counts
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Body counts to test
    #[arg(short, long, value_delimiter = ',', default_values_t = [200, 400, 800, 1600, 3200])]
    bodies: Vec<usize>,

    /// Thread counts to test (default: 1 and one per physical core)
    #[arg(short, long, value_delimiter = ',')]
    threads: Vec<usize>,

    /// Steps per timed run
    #[arg(short, long, default_value_t = 5)]
    steps: usize,

    /// Bodies claimed per unit of work
    #[arg(long, default_value_t = 32)]
    chunk_size: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let threads = if args.threads.is_empty() {
        let mut t = vec![1, default_threads()];
        t.dedup();
        t
    } else {
        args.threads
    };

    bench_backends(&args.bodies, &threads, args.steps.max(1), args.chunk_size)?;
    Ok(())
}
