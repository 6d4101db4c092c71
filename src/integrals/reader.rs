use super::IntegralSet;
use crate::defaults::INTEGRAL_SLOTS;
use log::{debug, info};
use ndarray::Array2;
use num_complex::Complex64;
use std::fmt;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

const BYTES_PER_DOUBLE: u64 = 8;

/// Position of the one-electron operators in the integral file. The remaining slots of
/// the file are reserved and never read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegralSlot {
    Overlap,
    Hamiltonian,
    DipoleX,
    DipoleY,
    DipoleZ,
    GradientX,
    GradientY,
    GradientZ,
    Cap,
}

impl IntegralSlot {
    pub fn position(&self) -> u64 {
        match self {
            IntegralSlot::Overlap => 0,
            IntegralSlot::Hamiltonian => 3,
            IntegralSlot::DipoleX => 4,
            IntegralSlot::DipoleY => 5,
            IntegralSlot::DipoleZ => 6,
            IntegralSlot::GradientX => 13,
            IntegralSlot::GradientY => 14,
            IntegralSlot::GradientZ => 15,
            IntegralSlot::Cap => 19,
        }
    }
}

#[derive(Debug)]
pub enum IntegralError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    SizeMismatch {
        path: PathBuf,
        basis_length: usize,
        implied_basis_length: f64,
        file_size: u64,
        expected_size: u64,
    },
}

impl fmt::Display for IntegralError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        match self {
            IntegralError::Io { path, source } => {
                write!(f, "Unable to read 1E file {}: {}", path.display(), source)
            }
            IntegralError::SizeMismatch {
                path,
                basis_length,
                implied_basis_length,
                file_size,
                expected_size,
            } => write!(
                f,
                "The size of 1E file {} ({} bytes) does not match the basis size ({}, {} bytes \
                 expected). Have you used the correct 1E file? Its size corresponds to basis size {}",
                path.display(),
                file_size,
                basis_length,
                expected_size,
                implied_basis_length
            ),
        }
    }
}

impl std::error::Error for IntegralError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IntegralError::Io { source, .. } => Some(source),
            IntegralError::SizeMismatch { .. } => None,
        }
    }
}

/// Reader for the flat binary file with the one-electron integrals. The file consists of
/// `INTEGRAL_SLOTS` complex n x n matrices. Each matrix is stored as a block with all
/// real parts followed by a block with all imaginary parts (little-endian doubles); the
/// elements are in column-major order of the transposed matrix.
pub struct IntegralReader {
    path: PathBuf,
    basis_length: usize,
    // bytes of one real (or imaginary) block
    chunk_size: u64,
}

impl IntegralReader {
    /// Opens the integral file and checks that its size matches the requested basis length.
    pub fn open(path: &Path, basis_length: usize) -> Result<Self, IntegralError> {
        let file_size: u64 = std::fs::metadata(path)
            .map_err(|source| IntegralError::Io {
                path: path.to_path_buf(),
                source,
            })?
            .len();
        let n_slots: u64 = INTEGRAL_SLOTS as u64;
        let bl_sqr: u64 = (basis_length * basis_length) as u64;
        let expected_size: u64 = n_slots * bl_sqr * 2 * BYTES_PER_DOUBLE;

        if file_size != expected_size {
            let complex_size: f64 = file_size as f64 / (2 * BYTES_PER_DOUBLE) as f64;
            return Err(IntegralError::SizeMismatch {
                path: path.to_path_buf(),
                basis_length,
                implied_basis_length: (complex_size / n_slots as f64).sqrt(),
                file_size,
                expected_size,
            });
        }
        debug!(
            "1E file {} holds {} matrices of dimension {}",
            path.display(),
            INTEGRAL_SLOTS,
            basis_length
        );
        Ok(Self {
            path: path.to_path_buf(),
            basis_length,
            chunk_size: file_size / n_slots / 2,
        })
    }

    pub fn basis_length(&self) -> usize {
        self.basis_length
    }

    fn io_error(&self, source: std::io::Error) -> IntegralError {
        IntegralError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn read_block(&self, file: &mut File) -> Result<Vec<f64>, IntegralError> {
        let mut bytes: Vec<u8> = vec![0; self.chunk_size as usize];
        file.read_exact(&mut bytes).map_err(|e| self.io_error(e))?;
        Ok(bytes
            .chunks_exact(BYTES_PER_DOUBLE as usize)
            .map(|chunk| {
                let mut buffer: [u8; 8] = [0; 8];
                buffer.copy_from_slice(chunk);
                f64::from_le_bytes(buffer)
            })
            .collect())
    }

    /// Reads the matrix stored in `slot`. The CAP slot holds a real symmetric matrix W and
    /// is returned as the anti-Hermitian operator -iW.
    pub fn load_matrix(&self, slot: IntegralSlot) -> Result<Array2<Complex64>, IntegralError> {
        let mut file: File = File::open(&self.path).map_err(|e| self.io_error(e))?;
        file.seek(SeekFrom::Start(2 * slot.position() * self.chunk_size))
            .map_err(|e| self.io_error(e))?;
        let real: Vec<f64> = self.read_block(&mut file)?;
        let imag: Vec<f64> = self.read_block(&mut file)?;

        let n: usize = self.basis_length;
        // element (j, i) of the column-major block is element (i, j) of the operator
        let mut matrix: Array2<Complex64> = Array2::from_shape_fn((n, n), |(i, j)| {
            Complex64::new(real[i * n + j], imag[i * n + j])
        });
        if slot == IntegralSlot::Cap {
            matrix.mapv_inplace(|z| -Complex64::i() * z);
        }
        Ok(matrix)
    }

    /// Reads all operators needed for a propagation.
    pub fn load_integral_set(&self, with_cap: bool) -> Result<IntegralSet, IntegralError> {
        let s = self.load_matrix(IntegralSlot::Overlap)?;
        let h = self.load_matrix(IntegralSlot::Hamiltonian)?;
        let dipole = [
            self.load_matrix(IntegralSlot::DipoleX)?,
            self.load_matrix(IntegralSlot::DipoleY)?,
            self.load_matrix(IntegralSlot::DipoleZ)?,
        ];
        let gradient = [
            self.load_matrix(IntegralSlot::GradientX)?,
            self.load_matrix(IntegralSlot::GradientY)?,
            self.load_matrix(IntegralSlot::GradientZ)?,
        ];
        let cap = if with_cap {
            Some(self.load_matrix(IntegralSlot::Cap)?)
        } else {
            None
        };
        Ok(IntegralSet {
            s,
            h,
            dipole,
            gradient,
            cap,
        })
    }
}

/// Loads the integral set of a basis with `basis_length` functions from `path`.
pub fn load_integrals(path: &Path, basis_length: usize, with_cap: bool) -> Result<IntegralSet, IntegralError> {
    info!("{: <25} {}", "1E integral file:", path.display());
    let reader: IntegralReader = IntegralReader::open(path, basis_length)?;
    reader.load_integral_set(with_cap)
}
