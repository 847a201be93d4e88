//! Symmetric eigendecomposition backed by nalgebra.

use anyhow::{anyhow, bail};
use nalgebra::{DMatrix, SymmetricEigen};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use nshare::{IntoNalgebra, IntoNdarray2};

use crate::utils::descending_order;

const MAX_ITERATIONS: usize = 10_000;

/// Order in which eigenpairs are returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EigenOrder {
    /// Largest signed eigenvalue first.
    #[default]
    Descending,
    /// Largest absolute eigenvalue first.
    DescendingMagnitude,
}

/// Eigenvalues with their eigenvectors stored as columns.
#[derive(Debug, Clone)]
pub struct EigenResult {
    values: Array1<f64>,
    vectors: Array2<f64>,
}

impl EigenResult {
    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn vectors(&self) -> &Array2<f64> {
        &self.vectors
    }

    pub fn into_parts(self) -> (Array1<f64>, Array2<f64>) {
        (self.values, self.vectors)
    }
}

/// Eigendecomposition of a real symmetric matrix.
///
/// Only the lower triangle is read by the solver, so callers should make sure
/// the input is symmetric. Non-convergence is reported as an error.
pub fn symmetric_eigen(matrix: ArrayView2<f64>, order: EigenOrder) -> anyhow::Result<EigenResult> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        bail!(
            "Eigendecomposition needs a square matrix, got {}x{}",
            rows,
            cols
        );
    }
    if rows == 0 {
        bail!("Eigendecomposition of an empty matrix");
    }

    let na_matrix: DMatrix<f64> = matrix.to_owned().into_nalgebra();
    let eigen = SymmetricEigen::try_new(na_matrix, f64::EPSILON, MAX_ITERATIONS).ok_or_else(|| {
        anyhow!(
            "Symmetric eigendecomposition of a {}x{} matrix did not converge",
            rows,
            cols
        )
    })?;

    let values = Array1::from(eigen.eigenvalues.as_slice().to_vec());
    let vectors = eigen.eigenvectors.into_ndarray2();

    let sorted = match order {
        EigenOrder::Descending => descending_order(&values.to_vec(), |v| v),
        EigenOrder::DescendingMagnitude => descending_order(&values.to_vec(), f64::abs),
    };

    Ok(EigenResult {
        values: values.select(Axis(0), &sorted),
        vectors: vectors.select(Axis(1), &sorted),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_descending() {
        let a = array![[2.0, 1.0], [1.0, 2.0]];
        let eig = symmetric_eigen(a.view(), EigenOrder::Descending).unwrap();

        assert_abs_diff_eq!(eig.values()[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eig.values()[1], 1.0, epsilon = 1e-12);

        // A v = lambda v for every pair
        for (k, &lambda) in eig.values().iter().enumerate() {
            let v = eig.vectors().column(k);
            let av = a.dot(&v);
            for i in 0..2 {
                assert_abs_diff_eq!(av[i], lambda * v[i], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_descending_magnitude() {
        let a = array![[1.0, 0.0, 0.0], [0.0, -3.0, 0.0], [0.0, 0.0, 2.0]];

        let eig = symmetric_eigen(a.view(), EigenOrder::DescendingMagnitude).unwrap();
        assert_abs_diff_eq!(eig.values()[0], -3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eig.values()[1], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eig.values()[2], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eig.vectors()[[1, 0]].abs(), 1.0, epsilon = 1e-12);

        let eig = symmetric_eigen(a.view(), EigenOrder::Descending).unwrap();
        assert_abs_diff_eq!(eig.values()[0], 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eig.values()[2], -3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_non_square() {
        let a = Array2::<f64>::zeros((2, 3));
        assert!(symmetric_eigen(a.view(), EigenOrder::Descending).is_err());

        let empty = Array2::<f64>::zeros((0, 0));
        assert!(symmetric_eigen(empty.view(), EigenOrder::Descending).is_err());
    }
}
