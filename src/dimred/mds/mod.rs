//! # Classical Multidimensional Scaling
//!
//! Torgerson scaling: the squared distance matrix is double-centered into an
//! inner-product matrix `B = -1/2 J D² J` with `J = I - (1/n) 11ᵀ`, and the
//! embedding is read off the leading eigenpairs of `B` as `V sqrt(Λ)`.
//!
//! For a Euclidean distance matrix `B` is positive semi-definite and the
//! recovered configuration reproduces the distances exactly (up to rotation,
//! reflection and translation). Noisy or non-Euclidean input produces
//! negative eigenvalues, handled according to [`NegativeEigenvalues`].

use anyhow::bail;
use log::{debug, warn};
use ndarray::{s, Array1, Array2, ArrayView2};

use crate::dense::DenseStats;
use crate::dimred::DEFAULT_DIMENSIONS;
use crate::eigen::{symmetric_eigen, EigenOrder};
use crate::svd::flip_signs;

/// Relative size below which a negative eigenvalue is treated as round-off.
const NEGATIVE_EIGENVALUE_NOISE: f64 = 1e-8;

/// What to do with negative eigenvalues of the double-centered matrix.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum NegativeEigenvalues {
    /// Rank eigenvalues by magnitude and scale axes by `sqrt(|λ|)`.
    #[default]
    Absolute,
    /// Rank eigenvalues by signed value and give negative ones zero length.
    Clamp,
    /// Rank by magnitude like `Absolute`, but fail when a selected eigenvalue
    /// is below `-tolerance`.
    Reject { tolerance: f64 },
}

/// Embeds the `n x n` distance matrix `dist` in `dimensions` coordinates
/// with classical scaling and the default [`NegativeEigenvalues::Absolute`]
/// policy.
///
/// Fails for non-square, asymmetric or non-finite input, for `dimensions` of zero or
/// larger than `n`, and when the eigendecomposition does not converge.
pub fn mds(dist: ArrayView2<f64>, dimensions: usize) -> anyhow::Result<Array2<f64>> {
    MDSBuilder::new()
        .n_components(dimensions)
        .build()
        .fit_transform(dist)
}

pub struct MDSBuilder {
    n_components: usize,
    negative_eigenvalues: NegativeEigenvalues,
    symmetry_tolerance: f64,
}

impl Default for MDSBuilder {
    fn default() -> Self {
        Self {
            n_components: DEFAULT_DIMENSIONS,
            negative_eigenvalues: NegativeEigenvalues::default(),
            symmetry_tolerance: 1e-9,
        }
    }
}

impl MDSBuilder {
    /// Creates a new builder with default parameters.
    ///
    /// Default values:
    /// - `n_components`: 2
    /// - `negative_eigenvalues`: `Absolute`
    /// - `symmetry_tolerance`: 1e-9 (relative to the largest distance)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = n_components;
        self
    }

    pub fn negative_eigenvalues(mut self, policy: NegativeEigenvalues) -> Self {
        self.negative_eigenvalues = policy;
        self
    }

    pub fn symmetry_tolerance(mut self, tolerance: f64) -> Self {
        self.symmetry_tolerance = tolerance;
        self
    }

    pub fn build(self) -> MDS {
        MDS {
            n_components: self.n_components,
            negative_eigenvalues: self.negative_eigenvalues,
            symmetry_tolerance: self.symmetry_tolerance,
            eigenvalues_: None,
        }
    }
}

pub struct MDS {
    n_components: usize,
    negative_eigenvalues: NegativeEigenvalues,
    symmetry_tolerance: f64,
    eigenvalues_: Option<Array1<f64>>,
}

impl MDS {
    pub fn fit_transform(&mut self, dist: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        let (n, cols) = dist.dim();
        if n != cols {
            bail!("Distance matrix must be square, got {}x{}", n, cols);
        }
        if self.n_components == 0 || self.n_components > n {
            bail!(
                "n_components={} must be between 1 and the number of items ({})",
                self.n_components,
                n
            );
        }
        dist.ensure_finite("distance matrix")?;
        if !dist.is_symmetric(self.symmetry_tolerance) {
            bail!(
                "Distance matrix is not symmetric within tolerance {}",
                self.symmetry_tolerance
            );
        }
        if self.n_components == n {
            debug!(
                "MDS with n_components == n items; the last axis carries no distance information"
            );
        }

        let squared = dist.mapv(|d| d * d);
        let j = Array2::<f64>::eye(n) - Array2::from_elem((n, n), 1.0 / n as f64);
        let b = j.dot(&squared).dot(&j) * -0.5;
        let b = (&b + &b.t()) * 0.5;
        b.ensure_finite("double-centered matrix")?;

        let order = match self.negative_eigenvalues {
            NegativeEigenvalues::Clamp => EigenOrder::Descending,
            NegativeEigenvalues::Absolute | NegativeEigenvalues::Reject { .. } => {
                EigenOrder::DescendingMagnitude
            }
        };
        let (values, vectors) = symmetric_eigen(b.view(), order)?.into_parts();

        let k = self.n_components;
        let selected = values.slice(s![..k]).to_owned();
        let mut axes = vectors.slice(s![.., ..k]).to_owned();
        flip_signs(&mut axes);

        let largest = values.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()));
        let lengths = match self.negative_eigenvalues {
            NegativeEigenvalues::Absolute => {
                let noise = NEGATIVE_EIGENVALUE_NOISE * largest;
                if let Some(v) = selected.iter().find(|&&v| v < -noise) {
                    warn!(
                        "MDS selected negative eigenvalue {:.3e}; distances are not Euclidean, using its magnitude",
                        v
                    );
                }
                selected.mapv(f64::abs)
            }
            NegativeEigenvalues::Clamp => selected.mapv(|v| v.max(0.0)),
            NegativeEigenvalues::Reject { tolerance } => {
                if let Some(v) = selected.iter().find(|&&v| v < -tolerance) {
                    bail!(
                        "MDS selected negative eigenvalue {:e} beyond tolerance {:e}",
                        v,
                        tolerance
                    );
                }
                selected.mapv(f64::abs)
            }
        };

        debug!(
            "MDS on {} items, selected eigenvalues {:?} of largest magnitude {:.3e}",
            n, selected, largest
        );

        let embedding = axes.dot(&Array2::from_diag(&lengths.mapv(f64::sqrt)));
        self.eigenvalues_ = Some(selected);

        Ok(embedding)
    }

    /// Signed eigenvalues behind the returned axes, in output order.
    pub fn eigenvalues(&self) -> Option<&Array1<f64>> {
        self.eigenvalues_.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn assert_same_distances(a: &Array2<f64>, b: &Array2<f64>, epsilon: f64) {
        assert_eq!(a.shape(), b.shape());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = epsilon);
        }
    }

    // three leaves at distance 2 around a hub at distance 1: a tree metric
    // with no Euclidean realisation, eigenvalues of B are {2, 2, 0, -0.25}
    fn star_distances() -> Array2<f64> {
        array![
            [0.0, 2.0, 2.0, 1.0],
            [2.0, 0.0, 2.0, 1.0],
            [2.0, 2.0, 0.0, 1.0],
            [1.0, 1.0, 1.0, 0.0]
        ]
    }

    #[test]
    fn test_right_isosceles_triangle() {
        init();
        let r2 = 2.0_f64.sqrt();
        let dist = array![[0.0, 1.0, 1.0], [1.0, 0.0, r2], [1.0, r2, 0.0]];

        let embedding = mds(dist.view(), 2).unwrap();
        assert_eq!(embedding.shape(), &[3, 2]);
        assert_same_distances(&embedding.pairwise_euclidean(), &dist, 1e-6);
    }

    #[test]
    fn test_recovers_random_planar_points() {
        init();
        let mut rng = StdRng::seed_from_u64(42);
        let points = Array2::from_shape_fn((12, 2), |_| rng.random_range(-5.0..5.0));
        let dist = points.pairwise_euclidean();

        let embedding = mds(dist.view(), 2).unwrap();
        assert_same_distances(&embedding.pairwise_euclidean(), &dist, 1e-6);

        // recovered configuration is centered
        for col in embedding.columns() {
            assert_abs_diff_eq!(col.sum(), 0.0, epsilon = 1e-8);
        }
    }

    #[test]
    fn test_recovers_points_in_higher_dimensions() {
        let mut rng = StdRng::seed_from_u64(7);
        let points = Array2::from_shape_fn((9, 3), |_| rng.random_range(0.0..10.0));
        let dist = points.pairwise_euclidean();

        let mut model = MDSBuilder::new().n_components(3).build();
        let embedding = model.fit_transform(dist.view()).unwrap();
        assert_same_distances(&embedding.pairwise_euclidean(), &dist, 1e-6);

        let eigenvalues = model.eigenvalues().unwrap();
        assert_eq!(eigenvalues.len(), 3);
        for w in eigenvalues.windows(2) {
            assert!(w[0] >= w[1]);
        }
        assert!(eigenvalues.iter().all(|&v| v > 0.0));
    }

    #[test]
    fn test_truncation_keeps_leading_axes() {
        // points spread along x much more than along y
        let points = array![[-10.0, 0.5], [-3.0, -0.5], [4.0, 0.3], [9.0, -0.3]];
        let dist = points.pairwise_euclidean();

        let full = mds(dist.view(), 2).unwrap();
        let line = mds(dist.view(), 1).unwrap();

        assert_eq!(line.shape(), &[4, 1]);
        for i in 0..4 {
            assert_abs_diff_eq!(line[[i, 0]], full[[i, 0]], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_negative_eigenvalues_absolute() {
        init();
        let dist = star_distances();
        let mut model = MDSBuilder::new().n_components(3).build();

        let embedding = model.fit_transform(dist.view()).unwrap();
        assert_eq!(embedding.shape(), &[4, 3]);

        let eigenvalues = model.eigenvalues().unwrap();
        assert_abs_diff_eq!(eigenvalues[0], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(eigenvalues[1], 2.0, epsilon = 1e-10);
        assert_abs_diff_eq!(eigenvalues[2], -0.25, epsilon = 1e-10);

        // third axis is scaled by sqrt(0.25)
        let third = embedding.column(2);
        assert_abs_diff_eq!(third.dot(&third), 0.25, epsilon = 1e-10);
    }

    #[test]
    fn test_negative_eigenvalues_clamp() {
        let dist = star_distances();
        let mut model = MDSBuilder::new()
            .n_components(3)
            .negative_eigenvalues(NegativeEigenvalues::Clamp)
            .build();

        let embedding = model.fit_transform(dist.view()).unwrap();
        let eigenvalues = model.eigenvalues().unwrap();
        assert_abs_diff_eq!(eigenvalues[2], 0.0, epsilon = 1e-10);
        for v in embedding.column(2).iter() {
            assert_abs_diff_eq!(*v, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_negative_eigenvalues_reject() {
        let dist = star_distances();

        let mut strict = MDSBuilder::new()
            .n_components(3)
            .negative_eigenvalues(NegativeEigenvalues::Reject { tolerance: 1e-9 })
            .build();
        assert!(strict.fit_transform(dist.view()).is_err());

        // the two leading axes are fine
        let mut planar = MDSBuilder::new()
            .n_components(2)
            .negative_eigenvalues(NegativeEigenvalues::Reject { tolerance: 1e-9 })
            .build();
        assert!(planar.fit_transform(dist.view()).is_ok());
    }

    #[test]
    fn test_rejects_invalid_input() {
        let rect = Array2::<f64>::zeros((3, 2));
        assert!(mds(rect.view(), 2).is_err());

        let asym = array![[0.0, 1.0, 2.0], [1.0, 0.0, 1.0], [2.5, 1.0, 0.0]];
        assert!(mds(asym.view(), 2).is_err());

        let dist = array![[0.0, 1.0], [1.0, 0.0]];
        assert!(mds(dist.view(), 0).is_err());
        assert!(mds(dist.view(), 3).is_err());
        assert!(mds(dist.view(), 2).is_ok());
    }

    #[test]
    fn test_rejects_non_finite_distances() {
        let nan_diagonal = array![[f64::NAN, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 0.0]];
        assert!(mds(nan_diagonal.view(), 2).is_err());

        let inf_diagonal = array![[f64::INFINITY, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 0.0]];
        assert!(mds(inf_diagonal.view(), 2).is_err());

        // finite distances whose squares overflow
        let huge = array![[0.0, 1e200], [1e200, 0.0]];
        assert!(mds(huge.view(), 1).is_err());
    }

    #[test]
    fn test_symmetry_tolerance_is_configurable() {
        let nearly = array![[0.0, 1.0, 2.0], [1.0, 0.0, 1.0], [2.001, 1.0, 0.0]];
        assert!(mds(nearly.view(), 2).is_err());

        let mut lenient = MDSBuilder::new().symmetry_tolerance(1e-2).build();
        assert!(lenient.fit_transform(nearly.view()).is_ok());
    }
}
