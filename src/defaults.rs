// JOB SPECIFICATION
pub const JOB_NAME: &str = "job";
// config file
pub const CONFIG_FILE_NAME: &str = "laserprop.toml";
pub const VERBOSE: i8 = 0;

// INTEGRALS
pub const RESOURCES_PATH: &str = ".";
pub const FILE_1E: &str = "job.1e";
// number of one-electron operator slots in the integral file
pub const INTEGRAL_SLOTS: usize = 20;
// eigenvalues of S below this factor times the largest eigenvalue are removed
pub const S_EIGENVALUE_THRESHOLD: f64 = f64::EPSILON;

// LASER PULSE
// peak intensity in W/cm^2
pub const INTENSITY: f64 = 1.0e14;
pub const FIELD_DIRECTION: [f64; 3] = [0.0, 0.0, 1.0];
pub const PHOTON_ENERGY_EV: f64 = 1.55;
pub const CARRIER_ENVELOPE_PHASE: f64 = 0.0;
// number of optical cycles under the sin^2 envelope
pub const CYCLES: f64 = 4.0;

// COMPLEX ABSORBING POTENTIAL
pub const USE_CAP: bool = false;
pub const CAP_R0: f64 = 40.0;
pub const CAP_AMPLITUDE: f64 = 5.0;

// PROPAGATION (atomic units of time)
pub const TIME_STEP: f64 = 0.01;
pub const MAX_TIME: f64 = 1000.0;
pub const REGISTER_INTERVAL: f64 = 1.0;

// OUTPUT
pub const WRITE_RESULT: bool = true;
pub const OUT_PATH: &str = ".";
pub const OUT_FILE: &str = "res.out";
pub const DUMP_WAVEFUNCTION: bool = false;
pub const WAVEFUNCTION_DIR: &str = "wavefunctions";
