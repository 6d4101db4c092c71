pub mod basis;
pub mod constants;
pub mod defaults;
pub mod driver;
pub mod integrals;
pub mod io;
pub mod maths;
pub mod propagation;
pub mod utils;

pub use driver::{run_simulation, SimulationError, SimulationResult};
