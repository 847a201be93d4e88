//! # Dimensionality Reduction
//!
//! Classical linear techniques for embedding dense data in fewer dimensions.
//!
//! ## Currently Available
//! - **PCA** ([`pca`]): projects mean-centered observations onto the leading
//!   eigen-directions of the feature covariance matrix.
//! - **MDS** ([`mds`]): classical (Torgerson) scaling, recovering point
//!   coordinates from a matrix of pairwise distances.
//!
//! ## Algorithm Selection Guide
//! - Use **PCA** when you have feature vectors and want interpretable axes
//!   that can be reused to project new observations.
//! - Use **MDS** when only pairwise dissimilarities are available.

pub mod mds;
pub mod pca;

/// Number of output dimensions used when the caller has no preference.
pub const DEFAULT_DIMENSIONS: usize = 2;
