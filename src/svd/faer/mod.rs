use faer_ext::{IntoFaer, IntoNdarray};
use ndarray::{Array1, ArrayView2};

use super::{SVDImplementation, SVDResult};

/// Thin SVD computed by faer.
#[derive(Debug, Clone, Copy, Default)]
pub struct FaerSVD;

impl SVDImplementation for FaerSVD {
    fn compute(&self, matrix: ArrayView2<f64>) -> anyhow::Result<SVDResult> {
        let faer_mat = matrix.into_faer();
        let svd = faer_mat.thin_svd();

        let u = svd.u().into_ndarray().to_owned();
        let s: Array1<f64> = Array1::from_iter(svd.s_diagonal().iter().cloned());
        let vt = svd.v().transpose().into_ndarray().to_owned();

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
        let svd = FaerSVD.compute(a.view()).unwrap();

        assert_abs_diff_eq!(svd.s()[0], 5.4649857, epsilon = 1e-6);
        assert_abs_diff_eq!(svd.s()[1], 0.3659662, epsilon = 1e-6);

        let reconstructed = svd.reconstruct();
        for (x, y) in reconstructed.iter().zip(a.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-6);
        }
    }
}
