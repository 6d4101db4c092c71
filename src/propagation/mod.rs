//! Time propagation of the electronic wavefunction in a laser field.
mod crank_nicolson;
mod field;
mod logging;
mod observables;

pub use crank_nicolson::{PropagationError, PropagationStatus, Propagator};
pub use field::{Coupling, Pulse};
pub use observables::{Observables, Sample};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Representation of the light-matter interaction.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gauge {
    #[serde(rename = "length")]
    Length,
    #[serde(rename = "velocity")]
    Velocity,
    // velocity gauge including the A^2 term
    #[serde(rename = "velocity_with_Asqrt")]
    VelocityWithASqrt,
    #[serde(rename = "acceleration")]
    Acceleration,
}

impl fmt::Display for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name: &str = match self {
            Gauge::Length => "length",
            Gauge::Velocity => "velocity",
            Gauge::VelocityWithASqrt => "velocity_with_Asqrt",
            Gauge::Acceleration => "acceleration",
        };
        write!(f, "{}", name)
    }
}
