use nbsim::{
    center_of_mass, distance, npy, simulate, total_momentum, Backend, Engine, Matrix, OutputPlan, Parameters,
    Scenario, NVec3, SOFTENING,
};

use std::process::Command;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

/// Build an n×7 input table from `(mass, position, velocity)` triples
pub fn input_table(bodies: &[(f64, [f64; 3], [f64; 3])]) -> Matrix {
    let rows: Vec<[f64; 7]> = bodies
        .iter()
        .map(|(m, p, v)| [*m, p[0], p[1], p[2], v[0], v[1], v[2]])
        .collect();
    Matrix::from_rows(&rows).unwrap()
}

/// Two equal masses at (-1,0,0) and (1,0,0), at rest
pub fn two_body_input() -> Matrix {
    input_table(&[
        (1e10, [-1.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
        (1e10, [1.0, 0.0, 0.0], [0.0, 0.0, 0.0]),
    ])
}

/// Deterministic cloud of well separated bodies on a jittered lattice
pub fn lattice_input(n: usize) -> Matrix {
    let bodies: Vec<_> = (0..n)
        .map(|i| {
            let f = i as f64;
            let p = [
                (i % 4) as f64 * 2.0 + (f * 0.37).sin() * 0.3,
                ((i / 4) % 4) as f64 * 2.0 + (f * 0.13).cos() * 0.3,
                (i / 16) as f64 * 2.0 + (f * 0.07).sin() * 0.3,
            ];
            let v = [(f * 0.5).cos() * 0.01, (f * 0.3).sin() * 0.01, 0.0];
            (1e9 * (1.0 + (i % 3) as f64), p, v)
        })
        .collect();
    input_table(&bodies)
}

pub fn engine(backend: Backend, threads: i64) -> Engine {
    Engine::new(backend, threads, 32).unwrap()
}

// ==================================================================================
// Force model tests
// ==================================================================================

#[test]
fn softening_keeps_distance_positive() {
    assert_eq!(distance(0.0, 0.0, 0.0), SOFTENING);
    assert!(distance(0.0, 0.0, 0.0) > 0.0);
}

#[test]
fn coincident_bodies_stay_finite() {
    let input = input_table(&[
        (1.0, [0.5, 0.5, 0.5], [0.0, 0.0, 0.0]),
        (1.0, [0.5, 0.5, 0.5], [0.0, 0.0, 0.0]),
    ]);
    let params = Parameters::new(1.0, 3.0, 3).unwrap();
    let out = simulate(&input, params, engine(Backend::Pool, 2)).unwrap();
    assert!(out.as_slice().iter().all(|v| v.is_finite()));
}

// ==================================================================================
// Integrator tests
// ==================================================================================

#[test]
fn single_body_moves_in_a_straight_line() {
    let input = input_table(&[(3.0, [1.0, 2.0, -4.0], [0.5, -1.0, 2.0])]);
    let params = Parameters::new(1.0, 16.0, 16).unwrap();
    let mut scenario = Scenario::build(&input, params, engine(Backend::Rayon, 4)).unwrap();
    scenario.integrate().unwrap();

    for s in 0..=16 {
        let t = s as f64;
        let expected = NVec3::new(1.0 + 0.5 * t, 2.0 - t, -4.0 + 2.0 * t);
        assert_eq!(scenario.trajectory.position(s, 0), expected);
    }
}

#[test]
fn symmetric_pair_stays_symmetric() {
    let input = input_table(&[
        (5e9, [-1.0, 0.5, 0.0], [0.0, 0.02, -0.01]),
        (5e9, [1.0, -0.5, 0.0], [0.0, -0.02, 0.01]),
    ]);
    let params = Parameters::new(0.1, 20.0, 200).unwrap();
    let mut scenario = Scenario::build(&input, params, engine(Backend::Pool, 2)).unwrap();
    scenario.integrate().unwrap();

    for s in 0..=scenario.trajectory.steps() {
        let a = scenario.trajectory.position(s, 0);
        let b = scenario.trajectory.position(s, 1);
        assert!((a + b).norm() <= 1e-12 * (1.0 + a.norm()), "step {s}: {a:?} vs {b:?}");
    }
}

#[test]
fn momentum_is_conserved() {
    let input = lattice_input(24);
    let params = Parameters::new(0.05, 5.0, 1).unwrap();
    let mut scenario = Scenario::build(&input, params, engine(Backend::Rayon, 3)).unwrap();

    let p0 = total_momentum(&scenario.bodies);
    scenario.integrate().unwrap();
    let p1 = total_momentum(&scenario.bodies);

    // scale of the individual terms, so the bound is relative to what moved
    let scale: f64 = scenario.bodies.iter().map(|b| b.momentum().norm()).sum();
    assert!(scale > 0.0);
    assert!((p1 - p0).norm() <= 1e-9 * scale, "drift {:?}", p1 - p0);

    // with momentum conserved the center of mass drifts at P / M
    let masses: Vec<f64> = scenario.bodies.iter().map(|b| b.mass).collect();
    let total: f64 = masses.iter().sum();
    let t = &scenario.trajectory;
    let start = center_of_mass(t.row(0), &masses);
    let end = center_of_mass(t.row(t.steps()), &masses);
    let expected = start + p0 * (params.total_time / total);
    assert!((end - expected).norm() < 1e-9, "{end:?} vs {expected:?}");
}

#[test]
fn results_identical_across_threads_and_backends() {
    let input = lattice_input(70);
    let params = Parameters::new(0.1, 3.0, 7).unwrap();

    let reference = simulate(&input, params, engine(Backend::Rayon, 1)).unwrap();
    for threads in [2, 3, 8] {
        for backend in [Backend::Rayon, Backend::Pool] {
            let out = simulate(&input, params, engine(backend, threads)).unwrap();
            assert_eq!(out, reference, "{backend:?} with {threads} threads");
        }
    }

    let small_chunks = Engine::new(Backend::Pool, 4, 5).unwrap();
    assert_eq!(simulate(&input, params, small_chunks).unwrap(), reference);
}

#[test]
fn two_body_scenario() {
    let input = two_body_input();
    let params = Parameters::new(1.0, 10.0, 2).unwrap();
    let mut scenario = Scenario::build(&input, params, engine(Backend::Pool, 4)).unwrap();
    scenario.integrate().unwrap();
    let out = scenario.output();

    assert_eq!(out.shape(), (2, 6));
    assert_eq!(out.row(0), &[-1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    let last = out.row(1);
    assert_eq!(last[0], -last[3]);
    assert_ne!(last[0], -1.0);
    assert_eq!([last[1], last[2], last[4], last[5]], [0.0; 4]);

    // first step pulls both bodies toward the origin along x only
    let t = &scenario.trajectory;
    assert!(t.position(1, 0).x > -1.0 && t.position(1, 1).x < 1.0);
    for s in 0..=10 {
        for body in 0..2 {
            let p = t.position(s, body);
            assert_eq!((p.y, p.z), (0.0, 0.0), "step {s} body {body}");
        }
    }
}

// ==================================================================================
// Sampler tests
// ==================================================================================

#[test]
fn output_keeps_first_and_last_rows() {
    let input = lattice_input(9);
    let params = Parameters::new(1.0, 10.0, 3).unwrap();
    let mut scenario = Scenario::build(&input, params, engine(Backend::Rayon, 2)).unwrap();
    scenario.integrate().unwrap();
    let out = scenario.output();

    assert_eq!(scenario.plan.num_outputs, 4);
    assert_eq!(out.rows(), 4);
    assert_eq!(out.row(0), scenario.trajectory.row(0));
    assert_eq!(out.row(1), scenario.trajectory.row(3));
    assert_eq!(out.row(2), scenario.trajectory.row(6));
    assert_eq!(out.row(3), scenario.trajectory.row(10));
}

#[test]
fn oversized_request_yields_final_state_only() {
    let input = two_body_input();
    let params = Parameters::new(1.0, 4.0, 50).unwrap();
    let mut scenario = Scenario::build(&input, params, engine(Backend::Rayon, 1)).unwrap();
    scenario.integrate().unwrap();
    let out = scenario.output();

    assert_eq!(out.rows(), 1);
    assert_eq!(out.row(0), scenario.trajectory.row(4));
}

proptest! {
    #[test]
    fn plan_invariants(num_steps in 1usize..5000, requested in 1usize..400) {
        let plan = OutputPlan::new(num_steps, requested).unwrap();
        let rows: Vec<usize> = plan.source_rows().collect();

        prop_assert_eq!(rows.len(), plan.num_outputs);
        prop_assert_eq!(*rows.last().unwrap(), num_steps);
        prop_assert!(plan.output_steps >= 1);
        if plan.num_outputs > 1 {
            prop_assert_eq!(rows[0], 0);
            prop_assert!(rows.windows(2).all(|w| w[0] < w[1]));
            for (k, r) in rows[..rows.len() - 1].iter().enumerate() {
                prop_assert_eq!(*r, k * plan.output_steps);
            }
        }
        if requested > num_steps {
            prop_assert_eq!(plan.num_outputs, 1);
        } else {
            prop_assert!(plan.num_outputs >= requested);
        }
    }
}

// ==================================================================================
// Validation tests
// ==================================================================================

#[test]
fn rejects_wrong_column_count_and_empty_input() {
    let params = Parameters::new(1.0, 2.0, 1).unwrap();
    let e = engine(Backend::Rayon, 1);

    let six_cols = Matrix::zeros(2, 6);
    assert!(matches!(
        simulate(&six_cols, params, e),
        Err(nbsim::NbodyError::InputFormat(_))
    ));

    let empty = Matrix::zeros(0, 7);
    assert!(matches!(
        simulate(&empty, params, e),
        Err(nbsim::NbodyError::Validation(_))
    ));
}

// ==================================================================================
// File and command line tests
// ==================================================================================

#[test]
fn simulates_from_and_to_npy_files() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.npy");
    let output_path = dir.path().join("output.npy");

    let input = lattice_input(12);
    npy::save(&input_path, &input).unwrap();
    let loaded = npy::load(&input_path).unwrap();
    assert_eq!(loaded, input);

    let params = Parameters::new(0.5, 5.0, 5).unwrap();
    let out = simulate(&loaded, params, engine(Backend::Pool, 3)).unwrap();
    npy::save(&output_path, &out).unwrap();

    let back = npy::load(&output_path).unwrap();
    assert_eq!(back.shape(), (5, 36));
    assert_eq!(back, out);
}

#[test]
fn command_line_run_writes_output() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.npy");
    let output_path = dir.path().join("output.npy");
    npy::save(&input_path, &two_body_input()).unwrap();

    let status = Command::new(env!("CARGO_BIN_EXE_nbsim"))
        .args(["1", "10", "2"])
        .arg(&input_path)
        .arg(&output_path)
        .arg("2")
        .output()
        .unwrap();
    assert!(status.status.success(), "{}", String::from_utf8_lossy(&status.stderr));
    assert!(String::from_utf8_lossy(&status.stdout).contains("secs"));

    let expected = simulate(
        &two_body_input(),
        Parameters::new(1.0, 10.0, 2).unwrap(),
        engine(Backend::Rayon, 1),
    )
    .unwrap();
    assert_eq!(npy::load(&output_path).unwrap(), expected);
}

#[test]
fn command_line_rejects_bad_arguments_before_reading_input() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.npy");
    let output_path = dir.path().join("output.npy");

    let run = Command::new(env!("CARGO_BIN_EXE_nbsim"))
        .args(["-1", "10", "2"])
        .arg(&missing)
        .arg(&output_path)
        .output()
        .unwrap();
    assert!(!run.status.success());
    let stderr = String::from_utf8_lossy(&run.stderr);
    assert!(!stderr.contains("error reading input"), "{stderr}");
    assert!(!output_path.exists());
}

#[test]
fn command_line_wrong_argument_count_prints_usage() {
    let dir = tempfile::tempdir().unwrap();
    let input_path = dir.path().join("input.npy");
    let output_path = dir.path().join("output.npy");
    npy::save(&input_path, &two_body_input()).unwrap();

    let too_few = Command::new(env!("CARGO_BIN_EXE_nbsim"))
        .args(["1", "10", "2"])
        .arg(&input_path)
        .output()
        .unwrap();
    let too_many = Command::new(env!("CARGO_BIN_EXE_nbsim"))
        .args(["1", "10", "2"])
        .arg(&input_path)
        .arg(&output_path)
        .args(["2", "extra"])
        .output()
        .unwrap();

    for run in [too_few, too_many] {
        assert!(!run.status.success());
        let stderr = String::from_utf8_lossy(&run.stderr);
        assert!(stderr.contains("Usage"), "{stderr}");
        assert!(!output_path.exists());
    }
}
