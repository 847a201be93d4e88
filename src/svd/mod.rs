//! Singular value decomposition backends.
//!
//! Every backend implements [`SVDImplementation`] and returns an [`SVDResult`]
//! whose singular values are sorted in descending order. The pure-Rust
//! [`NalgebraSVD`] is always available; LAPACK and faer backends are enabled
//! with the `lapack` and `faer` features.

use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::utils::descending_order;

mod native;
pub use native::NalgebraSVD;

#[cfg(feature = "lapack")]
mod lapack;
#[cfg(feature = "lapack")]
pub use lapack::LapackSVD;

#[cfg(feature = "faer")]
mod faer;
#[cfg(feature = "faer")]
pub use self::faer::FaerSVD;

// Trait for SVD implementations
pub trait SVDImplementation: Send + Sync {
    fn compute(&self, matrix: ArrayView2<f64>) -> anyhow::Result<SVDResult>;
}

/// Factorisation `A = U diag(s) Vt` with `s` in descending order.
#[derive(Debug, Clone)]
pub struct SVDResult {
    u: Array2<f64>,
    s: Array1<f64>,
    vt: Array2<f64>,
}

impl SVDResult {
    /// Wraps a raw factorisation, reordering the singular triplets so that
    /// `s` is descending. Backends that already sort pay only the index scan.
    pub fn new(u: Array2<f64>, s: Array1<f64>, vt: Array2<f64>) -> Self {
        let order = descending_order(&s.to_vec(), |v| v);
        if order.iter().enumerate().all(|(i, &j)| i == j) {
            return SVDResult { u, s, vt };
        }

        SVDResult {
            u: u.select(Axis(1), &order),
            s: s.select(Axis(0), &order),
            vt: vt.select(Axis(0), &order),
        }
    }

    pub fn u(&self) -> &Array2<f64> {
        &self.u
    }

    pub fn s(&self) -> &Array1<f64> {
        &self.s
    }

    pub fn vt(&self) -> &Array2<f64> {
        &self.vt
    }

    pub fn into_parts(self) -> (Array2<f64>, Array1<f64>, Array2<f64>) {
        (self.u, self.s, self.vt)
    }

    // Reconstruct the original matrix
    pub fn reconstruct(&self) -> Array2<f64> {
        let s_diag = Array2::from_diag(&self.s);
        self.u.dot(&s_diag).dot(&self.vt)
    }
}

/// Fixes the sign of each column so that its entry of largest magnitude is
/// positive. Singular and eigen vectors are only defined up to sign; this
/// makes results reproducible across backends.
pub fn flip_signs(vectors: &mut Array2<f64>) {
    for mut col in vectors.columns_mut() {
        let pivot = col
            .iter()
            .copied()
            .fold(0.0_f64, |best, v| if v.abs() > best.abs() { v } else { best });
        if pivot < 0.0 {
            col.mapv_inplace(|v| -v);
        }
    }
}
