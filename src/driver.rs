use crate::basis::BasisError;
use crate::integrals::{cut_linear_dependencies, load_integrals, IntegralError, IntegralSet, ReducedBasis};
use crate::io::output::SnapshotWriter;
use crate::io::settings::{ConfigError, Configuration};
use crate::maths::NumericalError;
use crate::propagation::{Coupling, PropagationError, Propagator, Sample};
use chrono::Local;
use log::{info, warn};
use ndarray::Array1;
use num_complex::Complex64;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum SimulationError {
    Config(ConfigError),
    Basis(BasisError),
    Integral(IntegralError),
    Numerical(NumericalError),
    Propagation(PropagationError),
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            SimulationError::Config(err) => write!(f, "{}", err),
            SimulationError::Basis(err) => write!(f, "{}", err),
            SimulationError::Integral(err) => write!(f, "{}", err),
            SimulationError::Numerical(err) => write!(f, "{}", err),
            SimulationError::Propagation(err) => write!(f, "{}", err),
            SimulationError::Io { path, source } => write!(f, "Unable to write {}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SimulationError::Config(err) => Some(err),
            SimulationError::Basis(err) => Some(err),
            SimulationError::Integral(err) => Some(err),
            SimulationError::Numerical(err) => Some(err),
            SimulationError::Propagation(err) => Some(err),
            SimulationError::Io { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for SimulationError {
    fn from(err: ConfigError) -> Self {
        SimulationError::Config(err)
    }
}

impl From<BasisError> for SimulationError {
    fn from(err: BasisError) -> Self {
        SimulationError::Basis(err)
    }
}

impl From<IntegralError> for SimulationError {
    fn from(err: IntegralError) -> Self {
        SimulationError::Integral(err)
    }
}

impl From<NumericalError> for SimulationError {
    fn from(err: NumericalError) -> Self {
        SimulationError::Numerical(err)
    }
}

impl From<PropagationError> for SimulationError {
    fn from(err: PropagationError) -> Self {
        SimulationError::Propagation(err)
    }
}

/// Everything a finished propagation produces.
pub struct SimulationResult {
    pub samples: Vec<Sample>,
    // final state expressed in the original basis functions
    pub final_state: Array1<Complex64>,
    pub reduced_dim: usize,
    pub n_removed: usize,
}

/// Loads the integrals of a basis with `basis_length` functions, removes the linear
/// dependencies and propagates the ground state through the laser pulse.
pub fn run_simulation(config: &Configuration, basis_length: usize) -> Result<SimulationResult, SimulationError> {
    config.validate()?;
    // an unsupported gauge or a broken pulse is reported before the integrals are read
    let coupling: Coupling = Coupling::new(config.gauge, &config.pulse)?;

    let integrals: IntegralSet = load_integrals(&config.integral_file(), basis_length, config.cap.use_cap)?;
    let reduced: ReducedBasis = cut_linear_dependencies(integrals, config.integrals.s_eigenvalue_threshold)?;
    if reduced.n_removed > 0 {
        warn!(
            "{} of {} basis functions are linearly dependent and were removed",
            reduced.n_removed, basis_length
        );
    }

    let mut propagator: Propagator = Propagator::new(&reduced, coupling, &config.propagation)?;
    if config.output.dump_wavefunction {
        let directory: &Path = Path::new(&config.output.wavefunction_dir);
        let writer = SnapshotWriter::create(directory, &config.job_name).map_err(|source| SimulationError::Io {
            path: directory.to_path_buf(),
            source,
        })?;
        propagator = propagator.with_snapshots(writer);
    }
    propagator.run()?;

    let final_state: Array1<Complex64> = reduced.to_full_basis(propagator.state());
    let samples: Vec<Sample> = propagator.into_samples();
    info!("{: <25} {}", "finished at:", Local::now().format("%Y-%m-%d %H:%M:%S"));
    Ok(SimulationResult {
        samples,
        final_state,
        reduced_dim: reduced.dim(),
        n_removed: reduced.n_removed,
    })
}
