use super::logging::*;
use super::{Coupling, Observables, Sample};
use crate::integrals::{IntegralSet, ReducedBasis};
use crate::io::output::SnapshotWriter;
use crate::io::settings::PropagationConfig;
use crate::maths::{general_evp_complex, parallel_matvec, solve_linear, NumericalError};
use crate::utils::Timer;
use log::{debug, trace};
use ndarray::prelude::*;
use num_complex::Complex64;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum PropagationError {
    Numerical(NumericalError),
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for PropagationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            PropagationError::Numerical(err) => write!(f, "Propagation failed: {}", err),
            PropagationError::Io { path, source } => {
                write!(f, "Unable to write wavefunction to {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for PropagationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PropagationError::Numerical(err) => Some(err),
            PropagationError::Io { source, .. } => Some(source),
        }
    }
}

impl From<NumericalError> for PropagationError {
    fn from(err: NumericalError) -> Self {
        PropagationError::Numerical(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropagationStatus {
    Initialized,
    Stepping,
    Finished,
}

/// Crank-Nicolson propagation of a single state in the reduced basis,
/// (S + i dt/2 H(t)) psi(t + dt) = (S - i dt/2 H(t)) psi(t).
/// The state is not renormalized, so the norm decays if a CAP is present.
pub struct Propagator<'a> {
    basis: &'a ReducedBasis,
    coupling: Coupling,
    dt: f64,
    n_steps: usize,
    register_every: usize,
    step: usize,
    time: f64,
    psi: Array1<Complex64>,
    samples: Vec<Sample>,
    status: PropagationStatus,
    snapshots: Option<SnapshotWriter>,
}

impl<'a> Propagator<'a> {
    /// Starts from the lowest eigenvector of H C = S C e in the reduced basis and records
    /// the observables at t = 0.
    pub fn new(basis: &'a ReducedBasis, coupling: Coupling, config: &PropagationConfig) -> Result<Self, PropagationError> {
        let integrals: &IntegralSet = &basis.integrals;
        let (energies, vecs) = general_evp_complex(&integrals.h, &integrals.s)?;
        debug!("{: <25} {:>18.10} Hartree", "initial state energy:", energies[0]);
        let psi: Array1<Complex64> = vecs.column(0).to_owned();

        let h_int: Array2<Complex64> = coupling.operator_at(0.0, integrals);
        let initial = Sample {
            step: 0,
            time: 0.0,
            observables: Observables::evaluate(&psi, integrals, &h_int),
        };
        Ok(Self {
            basis,
            coupling,
            dt: config.dt,
            n_steps: config.n_steps(),
            register_every: config.register_every(),
            step: 0,
            time: 0.0,
            psi,
            samples: vec![initial],
            status: PropagationStatus::Initialized,
            snapshots: None,
        })
    }

    /// Write U psi of every recorded step with `writer`.
    pub fn with_snapshots(mut self, writer: SnapshotWriter) -> Self {
        self.snapshots = Some(writer);
        self
    }

    pub fn status(&self) -> PropagationStatus {
        self.status
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn current_step(&self) -> usize {
        self.step
    }

    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Coefficients of the state in the reduced basis.
    pub fn state(&self) -> &Array1<Complex64> {
        &self.psi
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }

    fn write_snapshot(&self) -> Result<(), PropagationError> {
        if let Some(writer) = self.snapshots.as_ref() {
            let coefficients: Array1<Complex64> = self.basis.to_full_basis(&self.psi);
            writer
                .write(self.step, self.time, &coefficients)
                .map_err(|source| PropagationError::Io {
                    path: writer.path_for(self.step),
                    source,
                })?;
        }
        Ok(())
    }

    /// H0 + H_int(t) + CAP
    fn hamiltonian_at(&self, t: f64) -> (Array2<Complex64>, Array2<Complex64>) {
        let integrals: &IntegralSet = &self.basis.integrals;
        let h_int: Array2<Complex64> = self.coupling.operator_at(t, integrals);
        let mut h_t: Array2<Complex64> = &integrals.h + &h_int;
        if let Some(cap) = integrals.cap.as_ref() {
            h_t += cap;
        }
        (h_t, h_int)
    }

    /// Advances the state by one time step. Returns the sample if the step is recorded and
    /// `None` otherwise or once all steps are done.
    pub fn step(&mut self) -> Result<Option<Sample>, PropagationError> {
        match self.status {
            PropagationStatus::Finished => return Ok(None),
            PropagationStatus::Initialized => {
                self.write_snapshot()?;
                self.status = PropagationStatus::Stepping;
            }
            PropagationStatus::Stepping => {}
        }
        if self.step >= self.n_steps {
            self.status = PropagationStatus::Finished;
            return Ok(None);
        }

        let time: f64 = self.time + self.dt;
        let s: &Array2<Complex64> = &self.basis.integrals.s;
        let (h_t, h_int) = self.hamiltonian_at(time);
        let half_step: Complex64 = Complex64::new(0.0, 0.5 * self.dt);
        let a: Array2<Complex64> = s + &h_t.mapv(|x| x * half_step);
        let b_mat: Array2<Complex64> = s - &h_t.mapv(|x| x * half_step);
        let b: Array1<Complex64> = parallel_matvec(&b_mat, &self.psi);
        let psi: Array1<Complex64> = solve_linear(&a, &b)?;
        // step, time and state only move together once the solve succeeded
        self.step += 1;
        self.time = time;
        self.psi = psi;

        let observables = Observables::evaluate(&self.psi, &self.basis.integrals, &h_int);
        trace!("step {} t = {:.4} norm = {:.12}", self.step, self.time, observables.norm);

        let mut recorded: Option<Sample> = None;
        if self.step % self.register_every == 0 {
            let sample = Sample {
                step: self.step,
                time: self.time,
                observables,
            };
            self.samples.push(sample);
            self.write_snapshot()?;
            propagation_sample(&sample);
            recorded = Some(sample);
        }
        if self.step == self.n_steps {
            self.status = PropagationStatus::Finished;
        }
        Ok(recorded)
    }

    /// Runs all remaining steps and returns the recorded samples.
    pub fn run(&mut self) -> Result<&[Sample], PropagationError> {
        let timer: Timer = Timer::start();
        propagation_init(
            self.coupling.gauge(),
            self.basis.dim(),
            self.dt,
            self.n_steps,
            self.register_every,
        );
        if let Some(initial) = self.samples.first() {
            propagation_sample(initial);
        }
        while self.status != PropagationStatus::Finished {
            self.step()?;
        }
        propagation_end(&timer, self.samples.last());
        Ok(&self.samples)
    }
}
