use crate::basis::Representation;
use crate::defaults::*;
use crate::propagation::Gauge;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

fn default_job_name() -> String {
    String::from(JOB_NAME)
}
fn default_verbose() -> i8 {
    VERBOSE
}
fn default_gauge() -> Gauge {
    Gauge::Length
}
fn default_representation() -> Representation {
    Representation::Cartesian
}
fn default_resources_path() -> String {
    String::from(RESOURCES_PATH)
}
fn default_file_1e() -> String {
    String::from(FILE_1E)
}
fn default_s_eigenvalue_threshold() -> f64 {
    S_EIGENVALUE_THRESHOLD
}
fn default_intensity() -> f64 {
    INTENSITY
}
fn default_field_direction() -> [f64; 3] {
    FIELD_DIRECTION
}
fn default_photon_energy() -> f64 {
    PHOTON_ENERGY_EV
}
fn default_carrier_envelope_phase() -> f64 {
    CARRIER_ENVELOPE_PHASE
}
fn default_cycles() -> f64 {
    CYCLES
}
fn default_use_cap() -> bool {
    USE_CAP
}
fn default_cap_r0() -> f64 {
    CAP_R0
}
fn default_cap_amplitude() -> f64 {
    CAP_AMPLITUDE
}
fn default_dt() -> f64 {
    TIME_STEP
}
fn default_max_time() -> f64 {
    MAX_TIME
}
fn default_register_interval() -> f64 {
    REGISTER_INTERVAL
}
fn default_write() -> bool {
    WRITE_RESULT
}
fn default_out_path() -> String {
    String::from(OUT_PATH)
}
fn default_out_file() -> String {
    String::from(OUT_FILE)
}
fn default_dump_wavefunction() -> bool {
    DUMP_WAVEFUNCTION
}
fn default_wavefunction_dir() -> String {
    String::from(WAVEFUNCTION_DIR)
}
fn default_integral_config() -> IntegralConfig {
    toml::from_str("").unwrap()
}
fn default_pulse_config() -> PulseConfig {
    toml::from_str("").unwrap()
}
fn default_cap_config() -> CapConfig {
    toml::from_str("").unwrap()
}
fn default_propagation_config() -> PropagationConfig {
    toml::from_str("").unwrap()
}
fn default_output_config() -> OutputConfig {
    toml::from_str("").unwrap()
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    UnsupportedGauge(Gauge),
    InvalidValue(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "Unable to access config file {}: {}", path.display(), source)
            }
            ConfigError::Parse(err) => write!(f, "Invalid configuration: {}", err),
            ConfigError::Serialize(err) => write!(f, "Unable to serialize configuration: {}", err),
            ConfigError::UnsupportedGauge(gauge) => write!(
                f,
                "The {} gauge is not supported. Currently only the length, velocity and \
                 velocity_with_Asqrt gauges are implemented",
                gauge
            ),
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Serialize(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Configuration {
    #[serde(default = "default_job_name")]
    pub job_name: String,
    #[serde(default = "default_verbose")]
    pub verbose: i8,
    #[serde(default = "default_gauge")]
    pub gauge: Gauge,
    #[serde(default = "default_representation")]
    pub representation: Representation,
    #[serde(default = "default_integral_config")]
    pub integrals: IntegralConfig,
    #[serde(default = "default_pulse_config")]
    pub pulse: PulseConfig,
    #[serde(default = "default_cap_config")]
    pub cap: CapConfig,
    #[serde(default = "default_propagation_config")]
    pub propagation: PropagationConfig,
    #[serde(default = "default_output_config")]
    pub output: OutputConfig,
}

impl Configuration {
    /// Reads the configuration file `laserprop.toml` from the working directory. If it does
    /// not exist the default settings are used and written to the directory, so that the
    /// user can see all the options of the run.
    pub fn new() -> Result<Self, ConfigError> {
        let config_file_path: &Path = Path::new(CONFIG_FILE_NAME);
        let config: Self = Self::from_path(config_file_path)?;
        if !config_file_path.exists() {
            config.write(config_file_path)?;
        }
        Ok(config)
    }

    /// Reads the configuration from `path`. A missing file yields the default settings.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let config_string: String = if path.exists() {
            fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            String::from("")
        };
        let config: Self = toml::from_str(&config_string).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn write(&self, path: &Path) -> Result<(), ConfigError> {
        let config_string: String = toml::to_string(self).map_err(ConfigError::Serialize)?;
        fs::write(path, config_string).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Checks the settings that do not depend on the integrals. The pulse parameters are
    /// checked when the gauge coupling is set up.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prop = &self.propagation;
        if !(prop.dt > 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "the time step must be positive, got {}",
                prop.dt
            )));
        }
        if !(prop.max_time >= 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "the propagation time must not be negative, got {}",
                prop.max_time
            )));
        }
        if !(prop.register_interval > 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "the register interval must be positive, got {}",
                prop.register_interval
            )));
        }
        if !(self.integrals.s_eigenvalue_threshold >= 0.0) {
            return Err(ConfigError::InvalidValue(format!(
                "the overlap eigenvalue threshold must not be negative, got {}",
                self.integrals.s_eigenvalue_threshold
            )));
        }
        Ok(())
    }

    /// Path of the binary file with the one-electron integrals.
    pub fn integral_file(&self) -> PathBuf {
        Path::new(&self.integrals.resources_path).join(&self.integrals.file_1e)
    }

    /// Path of the text file with the sampled observables.
    pub fn result_file(&self) -> PathBuf {
        Path::new(&self.output.out_path).join(&self.output.out_file)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct IntegralConfig {
    #[serde(default = "default_resources_path")]
    pub resources_path: String,
    #[serde(default = "default_file_1e")]
    pub file_1e: String,
    #[serde(default = "default_s_eigenvalue_threshold")]
    pub s_eigenvalue_threshold: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct PulseConfig {
    // W/cm^2
    #[serde(default = "default_intensity")]
    pub intensity: f64,
    #[serde(default = "default_field_direction")]
    pub field_direction: [f64; 3],
    #[serde(default = "default_photon_energy")]
    pub photon_energy_ev: f64,
    #[serde(default = "default_carrier_envelope_phase")]
    pub carrier_envelope_phase: f64,
    #[serde(default = "default_cycles")]
    pub cycles: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct CapConfig {
    #[serde(default = "default_use_cap")]
    pub use_cap: bool,
    #[serde(default = "default_cap_r0")]
    pub r0: f64,
    #[serde(default = "default_cap_amplitude")]
    pub amplitude: f64,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct PropagationConfig {
    #[serde(default = "default_dt")]
    pub dt: f64,
    #[serde(default = "default_max_time")]
    pub max_time: f64,
    #[serde(default = "default_register_interval")]
    pub register_interval: f64,
}

impl PropagationConfig {
    pub fn n_steps(&self) -> usize {
        (self.max_time / self.dt).round() as usize
    }

    /// Number of time steps between two recorded samples, at least one.
    pub fn register_every(&self) -> usize {
        ((self.register_interval / self.dt).round() as usize).max(1)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OutputConfig {
    #[serde(default = "default_write")]
    pub write: bool,
    #[serde(default = "default_out_path")]
    pub out_path: String,
    #[serde(default = "default_out_file")]
    pub out_file: String,
    #[serde(default = "default_dump_wavefunction")]
    pub dump_wavefunction: bool,
    #[serde(default = "default_wavefunction_dir")]
    pub wavefunction_dir: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Configuration = toml::from_str("").unwrap();
        assert_eq!(config.job_name, JOB_NAME);
        assert_eq!(config.gauge, Gauge::Length);
        assert_eq!(config.representation, Representation::Cartesian);
        assert!(!config.cap.use_cap);
        assert_abs_diff_eq!(config.integrals.s_eigenvalue_threshold, f64::EPSILON);
        assert_eq!(config.propagation.n_steps(), 100_000);
        assert_eq!(config.propagation.register_every(), 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_config_keeps_remaining_defaults() {
        let input = r#"
            gauge = "velocity_with_Asqrt"
            representation = "spherical"

            [pulse]
            intensity = 0.0
            cycles = 2.0

            [propagation]
            dt = 0.1
            max_time = 1.0
        "#;
        let config: Configuration = toml::from_str(input).unwrap();
        assert_eq!(config.gauge, Gauge::VelocityWithASqrt);
        assert_eq!(config.representation, Representation::Spherical);
        assert_abs_diff_eq!(config.pulse.intensity, 0.0);
        assert_abs_diff_eq!(config.pulse.photon_energy_ev, PHOTON_ENERGY_EV);
        assert_eq!(config.propagation.n_steps(), 10);
        assert_eq!(config.propagation.register_every(), 10);
    }

    #[test]
    fn config_survives_toml_round_trip() {
        let mut config: Configuration = toml::from_str("").unwrap();
        config.gauge = Gauge::Velocity;
        config.cap.use_cap = true;
        config.pulse.field_direction = [1.0, 0.0, 0.0];
        let text: String = toml::to_string(&config).unwrap();
        let parsed: Configuration = toml::from_str(&text).unwrap();
        assert_eq!(parsed.gauge, Gauge::Velocity);
        assert!(parsed.cap.use_cap);
        assert_eq!(parsed.pulse.field_direction, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Configuration::from_path(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.output.out_file, OUT_FILE);
    }

    #[test]
    fn unknown_gauge_is_rejected() {
        let result: Result<Configuration, _> = toml::from_str("gauge = \"coulomb\"");
        assert!(result.is_err());
    }

    #[test]
    fn non_positive_time_step_is_rejected() {
        let config: Configuration = toml::from_str("[propagation]\ndt = 0.0").unwrap();
        match config.validate() {
            Err(ConfigError::InvalidValue(_)) => {}
            other => panic!("expected an invalid value error, got {:?}", other),
        }
    }
}
