use crate::integrals::IntegralSet;
use crate::maths::expectation;
use ndarray::prelude::*;
use num_complex::Complex64;

/// Expectation values of the propagated state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observables {
    // sqrt(<psi|S|psi>)
    pub norm: f64,
    // <psi|D|psi>, not divided by the norm
    pub dipole: [f64; 3],
    // <psi|H0|psi> / <psi|S|psi>
    pub energy: f64,
    // <psi|H_int(t)|psi> / <psi|S|psi>
    pub interaction_energy: f64,
}

impl Observables {
    pub fn evaluate(psi: &Array1<Complex64>, integrals: &IntegralSet, h_int: &Array2<Complex64>) -> Self {
        let norm_sqr: f64 = expectation(&integrals.s, psi).re;
        let mut dipole: [f64; 3] = [0.0; 3];
        for (value, d) in dipole.iter_mut().zip(integrals.dipole.iter()) {
            *value = expectation(d, psi).re;
        }
        Self {
            norm: norm_sqr.sqrt(),
            dipole,
            energy: expectation(&integrals.h, psi).re / norm_sqr,
            interaction_energy: expectation(h_int, psi).re / norm_sqr,
        }
    }
}

/// Observables recorded at one point of the time grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub step: usize,
    pub time: f64,
    pub observables: Observables,
}
