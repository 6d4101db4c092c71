use crate::basis::Basis;
use crate::io::settings::{CapConfig, Configuration};
use log::info;
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::{Path, PathBuf};

/// Input deck for the XGTOPW integral program. It requests the overlap, kinetic,
/// potential, dipole, velocity and CAP integrals in both representations at a single
/// origin point, followed by the basis set.
pub fn xgtopw_deck(basis: &Basis, cap: &CapConfig) -> String {
    let mut deck: String = String::new();
    // writing into a String never fails
    let _ = write!(
        deck,
        "$INTS\n4\nSTVH\nDIPOLE\nVELOCITY\nCAPINT\n$END\n\
         $CAPAR\n{:.1}\n{:.1}\n$END\n\
         $REPRESENTATION\ncartesian\nspherical\n$END\n\
         $POINTS\n1\n0.000 0.000 0.000\n$END\n\
         $BASIS\n{}$END\n",
        cap.r0, cap.amplitude, basis
    );
    deck
}

/// Writes `<job_name>.inp` into `directory`.
pub fn write_preparation(directory: &Path, config: &Configuration, basis: &Basis) -> std::io::Result<PathBuf> {
    let path: PathBuf = directory.join(format!("{}.inp", config.job_name));
    fs::write(&path, xgtopw_deck(basis, &config.cap))?;
    info!("{: <25} {}", "XGTOPW input written to:", path.display());
    Ok(path)
}
