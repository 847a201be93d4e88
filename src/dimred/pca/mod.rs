//! # Principal Component Analysis
//!
//! Dense PCA computed from the feature covariance matrix. The covariance is
//! factorised with a pluggable [`SVDImplementation`]; the singular values of
//! the covariance form the variance spectrum and its left singular vectors
//! are the principal axes.

use anyhow::{anyhow, bail};
use log::debug;
use ndarray::{s, Array1, Array2, ArrayView1, ArrayView2, Axis};
use std::sync::Arc;

use crate::dense::DenseStats;
use crate::svd::{flip_signs, NalgebraSVD, SVDImplementation};
use crate::utils::Direction;

/// Output of [`pca`].
#[derive(Debug, Clone)]
pub struct PCAResult {
    /// Variance weight of every direction, descending (length = features).
    pub spectrum: Array1<f64>,
    /// Projected observations (items × dimensions).
    pub embedding: Array2<f64>,
    /// Retained principal axes as columns (features × dimensions).
    pub components: Array2<f64>,
}

impl PCAResult {
    pub fn into_parts(self) -> (Array1<f64>, Array2<f64>, Array2<f64>) {
        (self.spectrum, self.embedding, self.components)
    }
}

/// Projects `data` (items × features) onto its first `dimensions` principal
/// axes using the default nalgebra SVD backend.
///
/// Fails when `data` has fewer than two rows or no columns, when it holds
/// NaN or infinite values, when `dimensions` is zero or exceeds the number
/// of features, or when the decomposition does not converge.
pub fn pca(data: ArrayView2<f64>, dimensions: usize) -> anyhow::Result<PCAResult> {
    let mut model = PCABuilder::new(NalgebraSVD::default())
        .n_components(dimensions)
        .build();
    let embedding = model.fit_transform(data)?;

    let spectrum = model
        .spectrum
        .take()
        .ok_or_else(|| anyhow!("PCA has not been fitted yet"))?;
    let components = model
        .components
        .take()
        .ok_or_else(|| anyhow!("PCA has not been fitted yet"))?;

    Ok(PCAResult {
        spectrum,
        embedding,
        components,
    })
}

/// Fraction of the total variance captured by the first `dim` entries of a
/// descending `spectrum`.
///
/// `dim` beyond the spectrum length counts every entry. An all-zero spectrum
/// (constant data) gives NaN.
pub fn retained_variance(spectrum: ArrayView1<f64>, dim: usize) -> f64 {
    let total: f64 = spectrum.iter().sum();
    let retained: f64 = spectrum.iter().take(dim).sum();
    retained / total
}

/// Configures a [`PCA`] model around an SVD backend.
///
/// Unlike [`MDSBuilder`](crate::MDSBuilder), which defaults to
/// [`DEFAULT_DIMENSIONS`](crate::DEFAULT_DIMENSIONS), the number of
/// components defaults to every feature: a full-rank model keeps
/// `inverse_transform` lossless and the whole spectrum is computed anyway.
/// [`pca`] always passes its `dimensions` explicitly.
pub struct PCABuilder<S: SVDImplementation> {
    n_components: Option<usize>,
    svd_implementation: Arc<S>,
}

impl<S: SVDImplementation> PCABuilder<S> {
    pub fn new(svd_implementation: S) -> Self {
        PCABuilder {
            n_components: None,
            svd_implementation: Arc::new(svd_implementation),
        }
    }

    /// Number of principal axes to retain. Defaults to every feature.
    pub fn n_components(mut self, n_components: usize) -> Self {
        self.n_components = Some(n_components);
        self
    }

    pub fn build(self) -> PCA<S> {
        PCA {
            n_components: self.n_components,
            svd_implementation: self.svd_implementation,
            components: None,
            mean: None,
            spectrum: None,
        }
    }
}

/// A fitted (or fittable) PCA model that can project further observations
/// onto the axes learned from the training data.
pub struct PCA<S: SVDImplementation> {
    n_components: Option<usize>,
    svd_implementation: Arc<S>,
    components: Option<Array2<f64>>,
    mean: Option<Array1<f64>>,
    spectrum: Option<Array1<f64>>,
}

impl<S: SVDImplementation> PCA<S> {
    pub fn fit(&mut self, x: ArrayView2<f64>) -> anyhow::Result<&mut Self> {
        let (n_samples, n_features) = x.dim();
        if n_samples < 2 {
            bail!("PCA needs at least 2 observations, got {}", n_samples);
        }
        if n_features == 0 {
            bail!("PCA needs at least 1 feature");
        }

        let n_components = self.n_components.unwrap_or(n_features);
        if n_components == 0 || n_components > n_features {
            bail!(
                "n_components={} must be between 1 and the number of features ({})",
                n_components,
                n_features
            );
        }

        let covariance = x.covariance()?;
        let svd = self.svd_implementation.compute(covariance.view())?;

        let mut components = svd.u().slice(s![.., ..n_components]).to_owned();
        flip_signs(&mut components);

        debug!(
            "PCA on {} samples x {} features, keeping {} components, leading spectrum {:?}",
            n_samples,
            n_features,
            n_components,
            svd.s().slice(s![..n_components])
        );

        self.mean = Some(x.means(&Direction::COLUMN)?);
        self.spectrum = Some(svd.s().clone());
        self.components = Some(components);

        Ok(self)
    }

    /// Centers `x` with the training means and projects it onto the retained axes.
    pub fn transform(&self, x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        let components = self
            .components
            .as_ref()
            .ok_or_else(|| anyhow!("PCA has not been fitted yet"))?;
        let mean = self
            .mean
            .as_ref()
            .ok_or_else(|| anyhow!("PCA has not been fitted yet"))?;

        if x.ncols() != mean.len() {
            bail!(
                "Number of features in X ({}) doesn't match training data ({})",
                x.ncols(),
                mean.len()
            );
        }

        let centered = &x - &mean.view().insert_axis(Axis(0));
        Ok(centered.dot(components))
    }

    pub fn fit_transform(&mut self, x: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        self.fit(x)?;
        self.transform(x)
    }

    /// Maps embedded coordinates back into feature space.
    pub fn inverse_transform(&self, y: ArrayView2<f64>) -> anyhow::Result<Array2<f64>> {
        let components = self
            .components
            .as_ref()
            .ok_or_else(|| anyhow!("PCA has not been fitted yet"))?;
        let mean = self
            .mean
            .as_ref()
            .ok_or_else(|| anyhow!("PCA has not been fitted yet"))?;

        if y.ncols() != components.ncols() {
            bail!(
                "Number of columns in Y ({}) doesn't match number of components ({})",
                y.ncols(),
                components.ncols()
            );
        }

        Ok(y.dot(&components.t()) + &mean.view().insert_axis(Axis(0)))
    }

    pub fn components(&self) -> Option<&Array2<f64>> {
        self.components.as_ref()
    }

    pub fn mean(&self) -> Option<&Array1<f64>> {
        self.mean.as_ref()
    }

    pub fn spectrum(&self) -> Option<&Array1<f64>> {
        self.spectrum.as_ref()
    }

    /// Share of the total variance carried by each direction of the full spectrum.
    pub fn explained_variance_ratio(&self) -> anyhow::Result<Array1<f64>> {
        let spectrum = self
            .spectrum
            .as_ref()
            .ok_or_else(|| anyhow!("Model must be fitted first!"))?;
        let total: f64 = spectrum.iter().sum();
        Ok(spectrum.mapv(|v| v / total))
    }

    pub fn cumulative_explained_variance_ratio(&self) -> anyhow::Result<Array1<f64>> {
        let spectrum = self
            .spectrum
            .as_ref()
            .ok_or_else(|| anyhow!("Model must be fitted first!"))?;
        let cumulative = (1..=spectrum.len())
            .map(|dim| retained_variance(spectrum.view(), dim))
            .collect();
        Ok(cumulative)
    }
}
