//! One-electron integrals: loading from the binary integral file and the canonical
//! orthogonalization of the basis.
mod reader;
mod reduction;

pub use reader::{load_integrals, IntegralError, IntegralReader, IntegralSlot};
pub use reduction::{cut_linear_dependencies, ReducedBasis};

use ndarray::Array2;
use num_complex::Complex64;

/// The one-electron operators of a run, all expressed in the same basis.
#[derive(Clone, Debug)]
pub struct IntegralSet {
    // overlap matrix
    pub s: Array2<Complex64>,
    // field-free Hamiltonian
    pub h: Array2<Complex64>,
    // dipole operators x, y, z
    pub dipole: [Array2<Complex64>; 3],
    // gradient (velocity gauge) operators x, y, z
    pub gradient: [Array2<Complex64>; 3],
    // complex absorbing potential, anti-Hermitian
    pub cap: Option<Array2<Complex64>>,
}

impl IntegralSet {
    /// Dimension of the basis the operators are expressed in.
    pub fn dim(&self) -> usize {
        self.s.nrows()
    }

    /// True if every operator is a square matrix of the same dimension as S.
    pub fn has_consistent_shapes(&self) -> bool {
        let n: usize = self.dim();
        std::iter::once(&self.s)
            .chain(std::iter::once(&self.h))
            .chain(self.dipole.iter())
            .chain(self.gradient.iter())
            .chain(self.cap.iter())
            .all(|m| m.dim() == (n, n))
    }

    /// Mutable access to every operator except the overlap matrix.
    pub(crate) fn operators_mut(&mut self) -> Vec<&mut Array2<Complex64>> {
        let mut operators: Vec<&mut Array2<Complex64>> = Vec::with_capacity(8);
        operators.push(&mut self.h);
        operators.extend(self.dipole.iter_mut());
        operators.extend(self.gradient.iter_mut());
        operators.extend(self.cap.iter_mut());
        operators
    }
}
