use ndarray::{Array1, Array2, Axis};
use ndarray_linalg::error::LinalgError;
use ndarray_linalg::{Eigh, Solve, UPLO};
use num_complex::Complex64;
use rayon::prelude::*;
use std::fmt;

/// Classification of a failed dense linear algebra operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericalErrorKind {
    NumericalIssue,
    NoConvergence,
    InvalidInput,
}

impl NumericalErrorKind {
    pub fn description(&self) -> &'static str {
        match self {
            NumericalErrorKind::NumericalIssue => {
                "The provided data did not satisfy the prerequisites."
            }
            NumericalErrorKind::NoConvergence => "Iterative procedure did not converge.",
            NumericalErrorKind::InvalidInput => {
                "The inputs are invalid, or the algorithm has been improperly called."
            }
        }
    }
}

#[derive(Debug)]
pub struct NumericalError {
    pub kind: NumericalErrorKind,
    pub context: String,
}

impl NumericalError {
    pub fn new(kind: NumericalErrorKind, context: impl Into<String>) -> Self {
        Self {
            kind,
            context: context.into(),
        }
    }

    /// Shape problems are always invalid input, a failing LAPACK routine is classified
    /// as `lapack_kind` since its meaning depends on the routine.
    fn from_linalg(err: LinalgError, context: &str, lapack_kind: NumericalErrorKind) -> Self {
        let kind: NumericalErrorKind = match err {
            LinalgError::Lapack(_) => lapack_kind,
            _ => NumericalErrorKind::InvalidInput,
        };
        Self::new(kind, format!("{} ({})", context, err))
    }
}

impl fmt::Display for NumericalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}: {}", self.context, self.kind.description())
    }
}

impl std::error::Error for NumericalError {}

/// Conjugate transpose A^\dagger.
pub fn adjoint(a: &Array2<Complex64>) -> Array2<Complex64> {
    a.t().mapv(|z| z.conj())
}

fn check_square(a: &Array2<Complex64>, context: &str) -> Result<usize, NumericalError> {
    let (rows, cols) = a.dim();
    if rows != cols || rows == 0 {
        return Err(NumericalError::new(
            NumericalErrorKind::InvalidInput,
            format!("{}: expected a non-empty square matrix, got {} x {}", context, rows, cols),
        ));
    }
    Ok(rows)
}

/// Eigendecomposition A = V \Lambda V^\dagger of a Hermitian matrix (lower triangle is used).
/// The eigenvalues are returned in ascending order together with the matching columns of V.
/// The order is enforced here and not taken from the LAPACK driver.
/// # Arguments
///     `a`: Array2, Hermitian matrix.
pub fn eigh_sorted(a: &Array2<Complex64>) -> Result<(Array1<f64>, Array2<Complex64>), NumericalError> {
    check_square(a, "Hermitian eigensolver")?;
    let (lambdas, vecs) = a.eigh(UPLO::Lower).map_err(|err| {
        NumericalError::from_linalg(err, "Hermitian eigensolver", NumericalErrorKind::NoConvergence)
    })?;
    if lambdas.iter().any(|x| !x.is_finite()) {
        return Err(NumericalError::new(
            NumericalErrorKind::NumericalIssue,
            "Hermitian eigensolver returned non-finite eigenvalues",
        ));
    }

    let mut order: Vec<usize> = (0..lambdas.len()).collect();
    order.sort_by(|&i, &j| lambdas[i].total_cmp(&lambdas[j]));
    let sorted_lambdas: Array1<f64> = order.iter().map(|&i| lambdas[i]).collect();
    let sorted_vecs: Array2<Complex64> = vecs.select(Axis(1), &order);
    Ok((sorted_lambdas, sorted_vecs))
}

/// Solve the complex generalized eigenproblem H C = S C e using the Loewdin orthogonalizer
/// X = S^{-1/2}. The eigenvectors are S-normalized, C^\dagger S C = 1.
/// # Arguments
///     `h`: Array2, Hermitian matrix, often the Hamiltonian.
///     `s`: Array2, Hermitian positive definite metric, often the overlap matrix.
pub fn general_evp_complex(
    h: &Array2<Complex64>,
    s: &Array2<Complex64>,
) -> Result<(Array1<f64>, Array2<Complex64>), NumericalError> {
    let n: usize = check_square(h, "generalized eigensolver")?;
    if s.dim() != (n, n) {
        return Err(NumericalError::new(
            NumericalErrorKind::InvalidInput,
            format!(
                "generalized eigensolver: metric has shape {:?}, Hamiltonian is {} x {}",
                s.dim(),
                n,
                n
            ),
        ));
    }
    // S = U \Lambda U^\dagger
    let (lambdas, u) = eigh_sorted(s)?;
    if lambdas[0] <= 0.0 {
        return Err(NumericalError::new(
            NumericalErrorKind::NumericalIssue,
            format!(
                "generalized eigensolver: metric is not positive definite (smallest eigenvalue {:e})",
                lambdas[0]
            ),
        ));
    }
    // X = U \Lambda^{-1/2} U^\dagger
    let invsqrt: Array1<Complex64> = lambdas.mapv(|x| Complex64::new(1.0 / x.sqrt(), 0.0));
    let x: Array2<Complex64> = (&u * &invsqrt).dot(&adjoint(&u));
    // \tilde{H} = X^\dagger H X
    let ht: Array2<Complex64> = adjoint(&x).dot(h).dot(&x);
    // \tilde{H} V = \epsilon V
    let (epsilon, v) = eigh_sorted(&ht)?;
    // C = X V
    Ok((epsilon, x.dot(&v)))
}

/// Solve the dense, general (non-Hermitian) linear system A x = b by LU decomposition.
pub fn solve_linear(a: &Array2<Complex64>, b: &Array1<Complex64>) -> Result<Array1<Complex64>, NumericalError> {
    let x: Array1<Complex64> = a.solve(b).map_err(|err| {
        NumericalError::from_linalg(err, "linear solver", NumericalErrorKind::NumericalIssue)
    })?;
    if x.iter().any(|z| !z.re.is_finite() || !z.im.is_finite()) {
        return Err(NumericalError::new(
            NumericalErrorKind::NumericalIssue,
            "linear solver: the system matrix is singular",
        ));
    }
    Ok(x)
}

/// Calculate a matrix vector product HC = U in parallel.
/// # Arguments
/// `h`: Array2, matrix.
/// `c`: Array1, vector.
pub fn parallel_matvec(h: &Array2<Complex64>, c: &Array1<Complex64>) -> Array1<Complex64> {
    // Iterate over rows of the matrix h in parallel, for each computing its dot product with
    // vector c, and finally collect the results into a vector.
    let result: Vec<Complex64> = h
        .axis_iter(Axis(0))
        .into_par_iter()
        .map(|row| row.iter().zip(c.iter()).map(|(&hij, &cj)| hij * cj).sum::<Complex64>())
        .collect();
    Array1::from_vec(result)
}

/// c^\dagger A c, without any normalization.
pub fn expectation(a: &Array2<Complex64>, c: &Array1<Complex64>) -> Complex64 {
    let ac: Array1<Complex64> = parallel_matvec(a, c);
    c.iter().zip(ac.iter()).map(|(ci, aci)| ci.conj() * aci).sum()
}
