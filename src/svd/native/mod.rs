use anyhow::anyhow;
use nalgebra::DMatrix;
use ndarray::{Array1, ArrayView2};
use nshare::{IntoNalgebra, IntoNdarray2};

use super::{SVDImplementation, SVDResult};

/// Pure-Rust SVD through nalgebra's bidiagonalisation and implicit QR sweeps.
#[derive(Debug, Clone, Copy)]
pub struct NalgebraSVD {
    eps: f64,
    max_iterations: usize,
}

impl NalgebraSVD {
    pub fn new(eps: f64, max_iterations: usize) -> Self {
        NalgebraSVD {
            eps,
            max_iterations,
        }
    }
}

impl Default for NalgebraSVD {
    fn default() -> Self {
        Self::new(f64::EPSILON, 10_000)
    }
}

impl SVDImplementation for NalgebraSVD {
    fn compute(&self, matrix: ArrayView2<f64>) -> anyhow::Result<SVDResult> {
        let (rows, cols) = matrix.dim();
        let na_matrix: DMatrix<f64> = matrix.to_owned().into_nalgebra();

        let svd = nalgebra::SVD::try_new(na_matrix, true, true, self.eps, self.max_iterations)
            .ok_or_else(|| {
                anyhow!(
                    "SVD of a {}x{} matrix did not converge within {} iterations",
                    rows,
                    cols,
                    self.max_iterations
                )
            })?;

        let u = svd
            .u
            .ok_or_else(|| anyhow!("SVD did not return left singular vectors"))?;
        let vt = svd
            .v_t
            .ok_or_else(|| anyhow!("SVD did not return right singular vectors"))?;
        let s = Array1::from(svd.singular_values.as_slice().to_vec());

        Ok(SVDResult::new(u.into_ndarray2(), s, vt.into_ndarray2()))
    }
}
