use crate::io::imprint::config_imprint;
use crate::io::settings::Configuration;
use crate::propagation::Sample;
use itertools::Itertools;
use log::{debug, info};
use ndarray::Array1;
use num_complex::Complex64;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const RESULT_COLUMNS: [&str; 7] = ["time", "dipx", "dipy", "dipz", "norm", "energy", "interaction_energy"];

/// One line of the result table.
pub fn format_sample(sample: &Sample) -> String {
    let obs = &sample.observables;
    [
        sample.time,
        obs.dipole[0],
        obs.dipole[1],
        obs.dipole[2],
        obs.norm,
        obs.energy,
        obs.interaction_energy,
    ]
    .iter()
    .map(|value| format!("{:>22.14e}", value))
    .join(" ")
}

/// Writes the configuration imprint followed by the table of recorded samples.
pub fn write_result(path: &Path, config: &Configuration, samples: &[Sample]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for line in config_imprint(config) {
        writeln!(writer, "# {}", line)?;
    }
    writeln!(writer, "#")?;
    writeln!(
        writer,
        "# {}",
        RESULT_COLUMNS.iter().map(|name| format!("{:>22}", name)).join(" ")
    )?;
    for sample in samples.iter() {
        writeln!(writer, "  {}", format_sample(sample))?;
    }
    writer.flush()?;
    info!("{: <25} {}", "results written to:", path.display());
    Ok(())
}

/// Writes the wavefunction in the original basis to one file per recorded step.
#[derive(Clone, Debug)]
pub struct SnapshotWriter {
    directory: PathBuf,
    job_name: String,
}

impl SnapshotWriter {
    /// Creates the snapshot directory if it does not exist yet.
    pub fn create(directory: &Path, job_name: &str) -> std::io::Result<Self> {
        fs::create_dir_all(directory)?;
        Ok(Self {
            directory: directory.to_path_buf(),
            job_name: job_name.to_owned(),
        })
    }

    pub fn path_for(&self, step: usize) -> PathBuf {
        self.directory.join(format!("{}_wf_{:08}.dat", self.job_name, step))
    }

    /// Each line holds `time index Re(c) Im(c)`.
    pub fn write(&self, step: usize, time: f64, coefficients: &Array1<Complex64>) -> std::io::Result<PathBuf> {
        let path: PathBuf = self.path_for(step);
        let mut writer = BufWriter::new(File::create(&path)?);
        for (idx, c) in coefficients.iter().enumerate() {
            writeln!(writer, "{:.8} {} {:.16e} {:.16e}", time, idx, c.re, c.im)?;
        }
        writer.flush()?;
        debug!("wavefunction of step {} written to {}", step, path.display());
        Ok(path)
    }
}
