use super::{Gauge, Sample};
use crate::utils::Timer;
use log::info;

pub fn propagation_init(gauge: Gauge, dim: usize, dt: f64, n_steps: usize, register_every: usize) {
    info!("{:^80}", "");
    info!("{: ^80}", "Crank-Nicolson Propagation");
    info!("{:-^80}", "");
    info!("{: <25} {}", "gauge:", gauge);
    info!("{: <25} {}", "basis functions:", dim);
    info!("{: <25} {:.6} a.u.", "time step:", dt);
    info!("{: <25} {}", "number of steps:", n_steps);
    info!("{: <25} {}", "register every:", register_every);
    info!("{:^80}", "");
    info!(
        "{: >10} {: >12} {: >14} {: >10} {: >18} {: >12}",
        "Step", "Time [au]", "Dipole z", "Norm", "Energy [au]", "E_int [au]"
    );
    info!("{:-^80} ", "");
}

pub fn propagation_sample(sample: &Sample) {
    let obs = &sample.observables;
    info!(
        "{: >10} {:>12.4} {:>14.6e} {:>10.6} {:>18.10} {:>12.4e}",
        sample.step, sample.time, obs.dipole[2], obs.norm, obs.energy, obs.interaction_energy
    );
}

pub fn propagation_end(timer: &Timer, final_sample: Option<&Sample>) {
    info!("{:-^80} ", "");
    info!("{: ^80}", "Propagation finished");
    info!("{:^80} ", "");
    if let Some(sample) = final_sample {
        info!("{:<26} {:>24.14} Hartree", "final energy:", sample.observables.energy);
        info!("{:<26} {:>24.14}", "final norm:", sample.observables.norm);
    }
    info!("{:-<80} ", "");
    info!("{}", timer);
}
