use approx::assert_abs_diff_eq;
use laserprop::defaults::INTEGRAL_SLOTS;
use laserprop::integrals::{IntegralError, IntegralSlot};
use laserprop::io::Configuration;
use laserprop::propagation::Gauge;
use laserprop::{run_simulation, SimulationError};
use std::fs;
use std::path::Path;

const N: usize = 2;

/// Real n x n operators of a two function model, indexed by slot position.
fn model_operator(slot: u64) -> Option<[[f64; N]; N]> {
    let operators: [(IntegralSlot, [[f64; N]; N]); 4] = [
        (IntegralSlot::Overlap, [[1.0, 0.1], [0.1, 1.0]]),
        (IntegralSlot::Hamiltonian, [[-0.5, 0.02], [0.02, 0.2]]),
        (IntegralSlot::DipoleZ, [[0.0, 1.0], [1.0, 0.3]]),
        (IntegralSlot::GradientZ, [[0.0, 0.4], [-0.4, 0.0]]),
    ];
    let cap: [[f64; N]; N] = [[0.05, 0.0], [0.0, 0.2]];
    if slot == IntegralSlot::Cap.position() {
        return Some(cap);
    }
    operators
        .iter()
        .find(|(s, _)| s.position() == slot)
        .map(|(_, matrix)| *matrix)
}

fn write_integral_file(path: &Path) {
    let mut bytes: Vec<u8> = Vec::new();
    for slot in 0..INTEGRAL_SLOTS as u64 {
        let matrix: [[f64; N]; N] = model_operator(slot).unwrap_or([[0.0; N]; N]);
        for i in 0..N {
            for j in 0..N {
                bytes.extend_from_slice(&matrix[i][j].to_le_bytes());
            }
        }
        // all imaginary parts vanish
        bytes.extend(std::iter::repeat(0u8).take(N * N * 8));
    }
    fs::write(path, bytes).unwrap();
}

fn configuration(dir: &Path, gauge: Gauge, use_cap: bool) -> Configuration {
    let mut config: Configuration = toml::from_str(
        r#"
        job_name = "model"

        [pulse]
        intensity = 1.0e14
        photon_energy_ev = 10.0
        cycles = 2.0

        [propagation]
        dt = 0.05
        max_time = 2.0
        register_interval = 0.5

        [output]
        write = false
        "#,
    )
    .unwrap();
    config.gauge = gauge;
    config.cap.use_cap = use_cap;
    config.integrals.resources_path = dir.to_string_lossy().into_owned();
    config.integrals.file_1e = String::from("model.1e");
    config.output.wavefunction_dir = dir.join("wf").to_string_lossy().into_owned();
    write_integral_file(&config.integral_file());
    config
}

#[test]
fn propagation_without_cap_conserves_the_norm() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    for gauge in [Gauge::Length, Gauge::Velocity, Gauge::VelocityWithASqrt].iter() {
        let config = configuration(dir.path(), *gauge, false);
        let result = run_simulation(&config, N).unwrap();

        assert_eq!(result.n_removed, 0);
        assert_eq!(result.reduced_dim, N);
        assert_eq!(result.final_state.len(), N);
        let steps: Vec<usize> = result.samples.iter().map(|s| s.step).collect();
        assert_eq!(steps, vec![0, 10, 20, 30, 40]);
        for sample in result.samples.iter() {
            assert_abs_diff_eq!(sample.observables.norm, 1.0, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(result.samples[4].time, 2.0, epsilon = 1e-12);
    }
}

#[test]
fn cap_reduces_the_norm_and_snapshots_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = configuration(dir.path(), Gauge::Length, true);
    config.output.dump_wavefunction = true;
    let result = run_simulation(&config, N).unwrap();

    let norms: Vec<f64> = result.samples.iter().map(|s| s.observables.norm).collect();
    assert!(norms.windows(2).all(|w| w[1] < w[0]));

    let mut snapshots: Vec<String> = fs::read_dir(dir.path().join("wf"))
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    snapshots.sort();
    assert_eq!(
        snapshots,
        vec![
            "model_wf_00000000.dat",
            "model_wf_00000010.dat",
            "model_wf_00000020.dat",
            "model_wf_00000030.dat",
            "model_wf_00000040.dat"
        ]
    );
    // the last snapshot holds the final state in the original basis
    let text: String = fs::read_to_string(dir.path().join("wf").join("model_wf_00000040.dat")).unwrap();
    let last: Vec<f64> = text
        .lines()
        .last()
        .unwrap()
        .split_whitespace()
        .map(|x| x.parse().unwrap())
        .collect();
    assert_abs_diff_eq!(last[0], 2.0, epsilon = 1e-8);
    assert_abs_diff_eq!(last[2], result.final_state[1].re, epsilon = 1e-14);
    assert_abs_diff_eq!(last[3], result.final_state[1].im, epsilon = 1e-14);
}

#[test]
fn wrong_basis_size_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = configuration(dir.path(), Gauge::Length, false);
    match run_simulation(&config, N + 1) {
        Err(SimulationError::Integral(IntegralError::SizeMismatch { implied_basis_length, .. })) => {
            assert_abs_diff_eq!(implied_basis_length, N as f64, epsilon = 1e-12);
        }
        Err(other) => panic!("expected a size mismatch, got {}", other),
        Ok(_) => panic!("the integral file belongs to a smaller basis"),
    }
}
