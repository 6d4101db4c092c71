use crate::io::settings::Configuration;
use chrono::Local;
use clap::crate_version;
use itertools::Itertools;
use log::info;

pub fn write_header() {
    info!("{: ^80}", "-----------------");
    info!("{: ^80}", "LASERPROP");
    info!("{: ^80}", "-----------------");
    let mut version_string: String = "version: ".to_owned();
    version_string.push_str(crate_version!());
    info!("{: ^80}", version_string);
    info!("{: ^80}", "");
    info!("{: ^80}", "::::::::::::::::::::::::::::::::::::::::::::::");
    info!("{: ^80}", "::  Laser driven electron dynamics in GTOPW  ::");
    info!("{: ^80}", "::         Crank-Nicolson propagation        ::");
    info!("{: ^80}", "::::::::::::::::::::::::::::::::::::::::::::::");
    info!("{: ^80}", "");
    info!("{: ^80}", format!("started: {}", Local::now().format("%Y-%m-%d %H:%M:%S")));
    info!("{: ^80}", "");
}

fn separator() -> String {
    format!("{:=<76}", "")
}

fn entry<T: std::fmt::Display>(key: &str, value: T) -> String {
    format!("{: <32}{}", key, value)
}

/// Key value block with the settings of a run, written at the top of the result file.
pub fn config_imprint(config: &Configuration) -> Vec<String> {
    let pulse = &config.pulse;
    let prop = &config.propagation;
    let cap = &config.cap;
    vec![
        separator(),
        entry("job_name", &config.job_name),
        entry("date", Local::now().format("%Y-%m-%d %H:%M:%S")),
        separator(),
        entry("gauge", config.gauge),
        entry("representation", config.representation),
        separator(),
        entry("intensity", format!("{:e}", pulse.intensity)),
        entry("field_direction", pulse.field_direction.iter().join(" ")),
        entry("photon_energy_ev", pulse.photon_energy_ev),
        entry("carrier_envelope_phase", pulse.carrier_envelope_phase),
        entry("cycles", pulse.cycles),
        separator(),
        entry("use_cap", cap.use_cap),
        entry("cap_r0", cap.r0),
        entry("cap_amplitude", cap.amplitude),
        separator(),
        entry("dt", prop.dt),
        entry("max_time", prop.max_time),
        entry("register_interval", prop.register_interval),
        separator(),
    ]
}
