use super::Gauge;
use crate::constants::{AU_TO_EV, INTENSITY_TO_AU};
use crate::integrals::IntegralSet;
use crate::io::settings::{ConfigError, PulseConfig};
use ndarray::prelude::*;
use num_complex::Complex64;
use std::f64::consts::PI;

/// Linearly polarized laser pulse with a sin^2 envelope of `cycles` optical cycles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    // unit polarization vector
    pub direction: [f64; 3],
    // peak field strength in atomic units
    pub amplitude: f64,
    // carrier frequency in atomic units
    pub omega: f64,
    pub phase: f64,
    pub cycles: f64,
}

impl Pulse {
    /// Converts the user settings (W/cm^2, eV) to atomic units and checks them.
    pub fn from_config(config: &PulseConfig) -> Result<Self, ConfigError> {
        let norm: f64 = config.field_direction.iter().map(|x| x * x).sum::<f64>().sqrt();
        if !(norm > 0.0) || !norm.is_finite() {
            return Err(ConfigError::InvalidValue(format!(
                "the field direction {:?} has no length",
                config.field_direction
            )));
        }
        if !(config.photon_energy_ev > 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "the photon energy must be positive, got {} eV",
                config.photon_energy_ev
            )));
        }
        if !(config.intensity >= 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "the intensity must not be negative, got {} W/cm^2",
                config.intensity
            )));
        }
        if !(config.cycles > 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "the number of cycles must be positive, got {}",
                config.cycles
            )));
        }
        let direction: [f64; 3] = [
            config.field_direction[0] / norm,
            config.field_direction[1] / norm,
            config.field_direction[2] / norm,
        ];
        Ok(Self {
            direction,
            amplitude: (config.intensity / INTENSITY_TO_AU).sqrt(),
            omega: config.photon_energy_ev / AU_TO_EV,
            phase: config.carrier_envelope_phase,
            cycles: config.cycles,
        })
    }

    /// Length of the pulse window N 2\pi / \omega.
    pub fn duration(&self) -> f64 {
        self.cycles * 2.0 * PI / self.omega
    }

    /// The field is switched off abruptly at the end of the window.
    pub fn is_active(&self, t: f64) -> bool {
        t >= 0.0 && t < self.duration()
    }

    /// E_0 sin^2(\omega t / 2N) sin(\omega t + \phi)
    fn envelope_carrier(&self, t: f64) -> f64 {
        let n: f64 = self.cycles;
        self.amplitude * (self.omega * t / (2.0 * n)).sin().powi(2) * (self.omega * t + self.phase).sin()
    }

    /// Closed form primitive of `envelope_carrier` that vanishes at t = 0, up to the sign.
    fn primitive(&self, t: f64) -> f64 {
        let n: f64 = self.cycles;
        let n2: f64 = n * n;
        let wt: f64 = self.omega * t;
        let bracket: f64 = -self.phase.cos() / n2
            + (-1.0 + 1.0 / n2 + (wt / n).cos()) * (wt + self.phase).cos()
            + (wt / n).sin() * (wt + self.phase).sin() / n;
        self.amplitude / (self.omega * (2.0 - 2.0 / n2)) * bracket
    }

    /// Electric field vector E(t) of the length gauge.
    pub fn electric_field(&self, t: f64) -> [f64; 3] {
        if !self.is_active(t) {
            return [0.0; 3];
        }
        let value: f64 = self.envelope_carrier(t);
        [
            self.direction[0] * value,
            self.direction[1] * value,
            self.direction[2] * value,
        ]
    }

    /// Vector potential A(t) with dA/dt = -E(t) and A(0) = 0.
    pub fn vector_potential(&self, t: f64) -> [f64; 3] {
        if !self.is_active(t) {
            return [0.0; 3];
        }
        let value: f64 = -self.primitive(t);
        [
            self.direction[0] * value,
            self.direction[1] * value,
            self.direction[2] * value,
        ]
    }
}

/// Light-matter coupling of one gauge, fixed for the whole propagation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Coupling {
    /// E(t) . D
    Length(Pulse),
    /// -i A(t) . G
    Velocity(Pulse),
    /// -i A(t) . G + S |A(t)|^2 / 2
    VelocityWithASqrt(Pulse),
}

impl Coupling {
    pub fn new(gauge: Gauge, config: &PulseConfig) -> Result<Self, ConfigError> {
        let pulse: Pulse = Pulse::from_config(config)?;
        let needs_primitive: bool = match gauge {
            Gauge::Length => false,
            Gauge::Velocity | Gauge::VelocityWithASqrt => true,
            Gauge::Acceleration => return Err(ConfigError::UnsupportedGauge(gauge)),
        };
        // the primitive has the denominator 2 - 2/N^2
        if needs_primitive && (1.0 - 1.0 / (pulse.cycles * pulse.cycles)).abs() < f64::EPSILON {
            return Err(ConfigError::InvalidValue(format!(
                "the {} gauge is undefined for a pulse with a single cycle",
                gauge
            )));
        }
        Ok(match gauge {
            Gauge::Length => Coupling::Length(pulse),
            Gauge::Velocity => Coupling::Velocity(pulse),
            _ => Coupling::VelocityWithASqrt(pulse),
        })
    }

    pub fn gauge(&self) -> Gauge {
        match self {
            Coupling::Length(_) => Gauge::Length,
            Coupling::Velocity(_) => Gauge::Velocity,
            Coupling::VelocityWithASqrt(_) => Gauge::VelocityWithASqrt,
        }
    }

    pub fn pulse(&self) -> &Pulse {
        match self {
            Coupling::Length(pulse) | Coupling::Velocity(pulse) | Coupling::VelocityWithASqrt(pulse) => pulse,
        }
    }

    /// Field vector that multiplies the operators of the gauge. For the velocity gauge this
    /// is -iA(t), for the velocity gauge with the A^2 term the real vector potential.
    pub fn field_at(&self, t: f64) -> [Complex64; 3] {
        let mut field: [Complex64; 3] = [Complex64::new(0.0, 0.0); 3];
        match self {
            Coupling::Length(pulse) => {
                for (f, e) in field.iter_mut().zip(pulse.electric_field(t).iter()) {
                    *f = Complex64::new(*e, 0.0);
                }
            }
            Coupling::Velocity(pulse) => {
                for (f, a) in field.iter_mut().zip(pulse.vector_potential(t).iter()) {
                    *f = Complex64::new(0.0, -*a);
                }
            }
            Coupling::VelocityWithASqrt(pulse) => {
                for (f, a) in field.iter_mut().zip(pulse.vector_potential(t).iter()) {
                    *f = Complex64::new(*a, 0.0);
                }
            }
        }
        field
    }

    /// Interaction Hamiltonian H_int(t) in the basis of `integrals`.
    pub fn operator_at(&self, t: f64, integrals: &IntegralSet) -> Array2<Complex64> {
        let n: usize = integrals.dim();
        let mut h_int: Array2<Complex64> = Array2::zeros((n, n));
        let field: [Complex64; 3] = self.field_at(t);
        match self {
            Coupling::Length(_) => {
                for (f, d) in field.iter().zip(integrals.dipole.iter()) {
                    h_int.scaled_add(*f, d);
                }
            }
            Coupling::Velocity(_) => {
                for (f, g) in field.iter().zip(integrals.gradient.iter()) {
                    h_int.scaled_add(*f, g);
                }
            }
            Coupling::VelocityWithASqrt(_) => {
                let minus_i: Complex64 = Complex64::new(0.0, -1.0);
                for (a, g) in field.iter().zip(integrals.gradient.iter()) {
                    h_int.scaled_add(minus_i * a, g);
                }
                let a_sqr: f64 = field.iter().map(|a| a.norm_sqr()).sum();
                h_int.scaled_add(Complex64::new(0.5 * a_sqr, 0.0), &integrals.s);
            }
        }
        h_int
    }
}
