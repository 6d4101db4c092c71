// Hartree in eV
pub const AU_TO_EV: f64 = 27.211385;
// conversion from the intensity in W/cm^2 to the squared field amplitude in atomic
// units, I = eps_0 c E^2 / 2
pub const INTENSITY_TO_AU: f64 = 3.50944758e16;
