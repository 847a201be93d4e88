use anyhow::anyhow;
use ndarray::{s, Array1, ArrayView2};
use nshare::{IntoNalgebra, IntoNdarray2};

use super::{SVDImplementation, SVDResult};

/// SVD through LAPACK's `gesdd` (OpenBLAS build of `nalgebra-lapack`).
#[derive(Debug, Clone, Copy, Default)]
pub struct LapackSVD;

impl SVDImplementation for LapackSVD {
    fn compute(&self, matrix: ArrayView2<f64>) -> anyhow::Result<SVDResult> {
        let (rows, cols) = matrix.dim();
        let k = rows.min(cols);
        let na_matrix = matrix.to_owned().into_nalgebra();

        let svd = nalgebra_lapack::SVD::new(na_matrix)
            .ok_or_else(|| anyhow!("LAPACK SVD of a {}x{} matrix failed", rows, cols))?;

        // LAPACK returns the full square factors; keep the thin part
        let u = svd.u.into_ndarray2().slice(s![.., ..k]).to_owned();
        let vt = svd.vt.into_ndarray2().slice(s![..k, ..]).to_owned();
        let s = Array1::from(svd.singular_values.as_slice().to_vec());

        Ok(SVDResult::new(u, s, vt))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    use super::*;

    #[test]
    fn test_simple_svd() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let svd = LapackSVD.compute(a.view()).unwrap();

        assert_abs_diff_eq!(svd.s()[0], 5.4649857, epsilon = 1e-6);
        assert_abs_diff_eq!(svd.s()[1], 0.3659662, epsilon = 1e-6);

        let reconstructed = svd.reconstruct();
        for (x, y) in reconstructed.iter().zip(a.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-6);
        }
    }
}
