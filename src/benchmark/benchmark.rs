use std::time::Instant;

use crate::error::Result;
use crate::io::Matrix;
use crate::simulation::engine::{Backend, Engine};
use crate::simulation::params::Parameters;
use crate::simulation::scenario::Scenario;

/// Deterministic n×7 input table, no rand needed
pub fn make_input(n: usize) -> Result<Matrix> {
    let rows: Vec<[f64; 7]> = (0..n)
        .map(|i| {
            let i_f = i as f64;
            [
                1.0e9,
                (i_f * 0.37).sin() * 5.0,
                (i_f * 0.13).cos() * 5.0,
                (i_f * 0.07).sin() * 5.0,
                0.0,
                0.0,
                0.0,
            ]
        })
        .collect();
    Matrix::from_rows(&rows)
}

/// Seconds spent integrating `steps` steps of an `n`-body system
pub fn time_run(n: usize, steps: usize, engine: Engine) -> Result<f64> {
    let input = make_input(n)?;
    let params = Parameters::new(1.0, steps as f64, 1)?;
    let mut scenario = Scenario::build(&input, params, engine)?;

    let t0 = Instant::now();
    scenario.integrate()?;
    Ok(t0.elapsed().as_secs_f64())
}

/// Compare both backends over a range of body and thread counts.
/// Paste output directly into a spreadsheet to graph
pub fn bench_backends(ns: &[usize], threads: &[usize], steps: usize, chunk_size: usize) -> Result<()> {
    println!("n,threads,rayon_ms_per_step,pool_ms_per_step");

    for &n in ns {
        for &t in threads {
            let mut per_step = [0.0; 2];
            for (slot, backend) in [Backend::Rayon, Backend::Pool].into_iter().enumerate() {
                let engine = Engine::new(backend, t as i64, chunk_size)?;

                // warm-up
                time_run(n, 1, engine)?;

                let secs = time_run(n, steps, engine)?;
                per_step[slot] = secs * 1000.0 / steps as f64;
            }
            println!("{},{},{:.6},{:.6}", n, t, per_step[0], per_step[1]);
        }
    }
    Ok(())
}
