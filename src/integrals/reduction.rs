use super::IntegralSet;
use crate::maths::{adjoint, eigh_sorted, NumericalError, NumericalErrorKind};
use log::{debug, info, log_enabled, Level};
use ndarray::prelude::*;
use num_complex::Complex64;
use rayon::prelude::*;

/// Operators expressed in the canonically orthogonalized basis.
pub struct ReducedBasis {
    // n x m matrix, the retained eigenvectors of S
    pub transform: Array2<Complex64>,
    // retained eigenvalues of S in ascending order
    pub eigenvalues: Array1<f64>,
    // number of removed linear dependencies
    pub n_removed: usize,
    pub integrals: IntegralSet,
}

impl ReducedBasis {
    /// Dimension m of the reduced basis.
    pub fn dim(&self) -> usize {
        self.transform.ncols()
    }

    /// Dimension n of the original basis.
    pub fn full_dim(&self) -> usize {
        self.transform.nrows()
    }

    /// Maps coefficients of the reduced basis back to the original basis functions.
    pub fn to_full_basis(&self, coefficients: &Array1<Complex64>) -> Array1<Complex64> {
        self.transform.dot(coefficients)
    }
}

/// Removes near linear dependencies from the basis by canonical orthogonalization.
///
/// S is diagonalized as S = V \Lambda V^\dagger and all eigenvectors with eigenvalues below
/// `threshold` * \lambda_max are dropped. The remaining eigenvectors form the transformation
/// U, every operator X is replaced by U^\dagger X U and S by the diagonal matrix of the
/// retained eigenvalues.
pub fn cut_linear_dependencies(
    mut integrals: IntegralSet,
    threshold: f64,
) -> Result<ReducedBasis, NumericalError> {
    if !integrals.has_consistent_shapes() {
        return Err(NumericalError::new(
            NumericalErrorKind::InvalidInput,
            "canonical orthogonalization: the operators differ in shape from the overlap matrix",
        ));
    }
    info!("{: <25}", "Cutting linear dependencies:");
    debug!("Computing S matrix eigenvalues.");
    let (lambdas, vecs) = eigh_sorted(&integrals.s)?;
    let n: usize = lambdas.len();
    let lambda_max: f64 = lambdas[n - 1];
    if lambda_max <= 0.0 {
        return Err(NumericalError::new(
            NumericalErrorKind::InvalidInput,
            format!(
                "canonical orthogonalization: overlap matrix has no positive eigenvalue (largest {:e})",
                lambda_max
            ),
        ));
    }
    if log_enabled!(Level::Debug) {
        debug!("Eigenvalues of S matrix:");
        for lambda in lambdas.iter() {
            debug!("{:>24.14e}", lambda);
        }
    }

    // the eigenvalues are sorted, so the linear dependencies form a block at the start
    let cutoff: f64 = threshold * lambda_max;
    let n_removed: usize = lambdas.iter().take_while(|&&lambda| lambda < cutoff).count();
    if n_removed == n {
        return Err(NumericalError::new(
            NumericalErrorKind::InvalidInput,
            format!(
                "canonical orthogonalization: threshold {:e} removes all {} basis functions",
                threshold, n
            ),
        ));
    }
    info!("{: <25} {}", "removed vectors:", n_removed);
    info!("{: <25} {}", "reduced basis size:", n - n_removed);

    let u: Array2<Complex64> = vecs.slice(s![.., n_removed..]).to_owned();
    let u_dag: Array2<Complex64> = adjoint(&u);
    let retained: Array1<f64> = lambdas.slice(s![n_removed..]).to_owned();

    integrals
        .operators_mut()
        .into_par_iter()
        .for_each(|op| *op = u_dag.dot(&*op).dot(&u));
    integrals.s = Array2::from_diag(&retained.mapv(|x| Complex64::new(x, 0.0)));

    Ok(ReducedBasis {
        transform: u,
        eigenvalues: retained,
        n_removed,
        integrals,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn max_deviation(a: &Array2<Complex64>, b: &Array2<Complex64>) -> f64 {
        assert_eq!(a.dim(), b.dim());
        a.iter().zip(b.iter()).map(|(x, y)| (x - y).norm()).fold(0.0, f64::max)
    }

    fn integral_set(s: Array2<Complex64>, h: Array2<Complex64>) -> IntegralSet {
        let n: usize = s.nrows();
        let zeros = || Array2::<Complex64>::zeros((n, n));
        IntegralSet {
            s,
            h,
            dipole: [zeros(), zeros(), zeros()],
            gradient: [zeros(), zeros(), zeros()],
            cap: None,
        }
    }

    #[test]
    fn well_conditioned_basis_keeps_all_directions() {
        let _ = env_logger::builder().is_test(true).try_init();
        let h: Array2<Complex64> = array![[c(-0.5, 0.0), c(0.1, 0.2)], [c(0.1, -0.2), c(0.3, 0.0)]];
        let reduced = cut_linear_dependencies(integral_set(Array2::eye(2), h.clone()), f64::EPSILON).unwrap();

        assert_eq!(reduced.n_removed, 0);
        assert_eq!(reduced.dim(), 2);
        assert_eq!(reduced.full_dim(), 2);
        let u = &reduced.transform;
        // U is unitary
        assert!(max_deviation(&adjoint(u).dot(u), &Array2::eye(2)) < 1e-12);
        assert!(max_deviation(&u.dot(&adjoint(u)), &Array2::eye(2)) < 1e-12);
        // the operators are transformed as U^\dagger X U
        let expected: Array2<Complex64> = adjoint(u).dot(&h).dot(u);
        assert!(max_deviation(&reduced.integrals.h, &expected) < 1e-14);
        assert!(max_deviation(&reduced.integrals.s, &Array2::eye(2)) < 1e-14);
    }

    #[test]
    fn reduction_is_idempotent_on_diagonal_overlap() {
        let s: Array2<Complex64> = Array2::from_diag(&array![c(0.5, 0.0), c(2.0, 0.0), c(3.0, 0.0)]);
        let h: Array2<Complex64> = Array2::from_diag(&array![c(1.0, 0.0), c(2.0, 0.0), c(3.0, 0.0)]);
        let first = cut_linear_dependencies(integral_set(s, h), f64::EPSILON).unwrap();
        assert_eq!(first.n_removed, 0);
        assert_abs_diff_eq!(first.eigenvalues, array![0.5, 2.0, 3.0], epsilon = 1e-14);

        let second = cut_linear_dependencies(first.integrals.clone(), f64::EPSILON).unwrap();
        assert_eq!(second.n_removed, 0);
        assert_eq!(second.dim(), 3);
        assert!(max_deviation(&second.integrals.s, &first.integrals.s) < 1e-14);
    }

    #[test]
    fn linear_dependency_is_removed() {
        // two identical basis functions and one orthogonal to both
        let s: Array2<Complex64> = array![
            [c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)],
            [c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)],
            [c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0)]
        ];
        let h: Array2<Complex64> = array![
            [c(-1.0, 0.0), c(-1.0, 0.0), c(0.1, 0.0)],
            [c(-1.0, 0.0), c(-1.0, 0.0), c(0.1, 0.0)],
            [c(0.1, 0.0), c(0.1, 0.0), c(0.5, 0.0)]
        ];
        let reduced = cut_linear_dependencies(integral_set(s, h.clone()), 1.0e-10).unwrap();
        assert_eq!(reduced.n_removed, 1);
        assert_eq!(reduced.dim(), 2);
        assert_eq!(reduced.transform.dim(), (3, 2));
        assert_abs_diff_eq!(reduced.eigenvalues, array![1.0, 2.0], epsilon = 1e-12);
        let u = &reduced.transform;
        assert!(max_deviation(&adjoint(u).dot(u), &Array2::eye(2)) < 1e-12);

        // the reduced Hamiltonian stays Hermitian
        let hr = &reduced.integrals.h;
        assert!(max_deviation(hr, &adjoint(hr)) < 1e-12);
        assert!(max_deviation(hr, &adjoint(u).dot(&h).dot(u)) < 1e-12);
        // the null direction (1, -1, 0) is not part of the reduced basis
        let null: Array1<Complex64> = array![c(1.0, 0.0), c(-1.0, 0.0), c(0.0, 0.0)];
        let overlap: Array1<Complex64> = adjoint(u).dot(&null);
        assert!(overlap.iter().all(|z| z.norm() < 1e-12));
    }

    #[test]
    fn cap_stays_anti_hermitian() {
        let s: Array2<Complex64> = array![[c(1.0, 0.0), c(0.4, 0.0)], [c(0.4, 0.0), c(1.0, 0.0)]];
        let mut set = integral_set(s, Array2::eye(2));
        set.cap = Some(array![[c(0.0, -0.2), c(0.0, -0.1)], [c(0.0, -0.1), c(0.0, -0.3)]]);
        let reduced = cut_linear_dependencies(set, f64::EPSILON).unwrap();
        let cap = reduced.integrals.cap.as_ref().unwrap();
        let minus_dag: Array2<Complex64> = adjoint(cap).mapv(|z| -z);
        assert!(max_deviation(cap, &minus_dag) < 1e-12);
    }

    #[test]
    fn zero_overlap_is_invalid_input() {
        let set = integral_set(Array2::zeros((2, 2)), Array2::zeros((2, 2)));
        let err = cut_linear_dependencies(set, f64::EPSILON).err().unwrap();
        assert_eq!(err.kind, NumericalErrorKind::InvalidInput);
    }

    #[test]
    fn removing_every_direction_is_invalid_input() {
        let set = integral_set(Array2::eye(2), Array2::eye(2));
        let err = cut_linear_dependencies(set, 2.0).err().unwrap();
        assert_eq!(err.kind, NumericalErrorKind::InvalidInput);
    }

    #[test]
    fn inconsistent_shapes_are_invalid_input() {
        let mut set = integral_set(Array2::eye(2), Array2::eye(2));
        set.dipole[0] = Array2::zeros((3, 3));
        let err = cut_linear_dependencies(set, f64::EPSILON).err().unwrap();
        assert_eq!(err.kind, NumericalErrorKind::InvalidInput);
    }
}
