pub mod dense;
pub mod dimred;
pub mod eigen;
pub mod svd;
mod utils;

pub use dimred::mds::{mds, MDSBuilder, NegativeEigenvalues, MDS};
pub use dimred::pca::{pca, retained_variance, PCABuilder, PCAResult, PCA};
pub use dimred::DEFAULT_DIMENSIONS;
pub use utils::Direction;
