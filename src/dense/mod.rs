use anyhow::{anyhow, bail};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
use rayon::prelude::*;

use crate::utils::Direction;

/// Statistics and derived matrices on dense `f64` matrices.
///
/// Rows are observations and columns are features throughout.
pub trait DenseStats {
    /// Mean of every row (`Direction::ROW`) or every column (`Direction::COLUMN`).
    fn means(&self, direction: &Direction) -> anyhow::Result<Array1<f64>>;

    /// Copy of the matrix with the means along `direction` subtracted.
    fn centered(&self, direction: &Direction) -> anyhow::Result<Array2<f64>>;

    /// Sample covariance of the columns, normalised by `n - 1`.
    fn covariance(&self) -> anyhow::Result<Array2<f64>>;

    /// Euclidean distance between every pair of rows.
    fn pairwise_euclidean(&self) -> Array2<f64>;

    /// Whether the matrix is square and `|a_ij - a_ji|` stays within
    /// `tolerance` scaled by the largest absolute entry (at least 1).
    fn is_symmetric(&self, tolerance: f64) -> bool;

    /// Fails when any entry is NaN or infinite. `what` names the matrix in
    /// the error message.
    fn ensure_finite(&self, what: &str) -> anyhow::Result<()>;
}

impl<S> DenseStats for ArrayBase<S, Ix2>
where
    S: Data<Elem = f64> + Sync,
{
    fn means(&self, direction: &Direction) -> anyhow::Result<Array1<f64>> {
        let axis = match direction {
            Direction::ROW => Axis(1),
            Direction::COLUMN => Axis(0),
        };
        self.mean_axis(axis).ok_or_else(|| {
            anyhow!(
                "Cannot compute {:?} means of an empty {}x{} matrix",
                direction,
                self.nrows(),
                self.ncols()
            )
        })
    }

    fn centered(&self, direction: &Direction) -> anyhow::Result<Array2<f64>> {
        let means = self.means(direction)?;
        let mut centered = self.to_owned();

        match direction {
            Direction::COLUMN => {
                centered
                    .axis_iter_mut(Axis(0))
                    .into_par_iter()
                    .for_each(|mut row| {
                        row -= &means;
                    });
            }
            Direction::ROW => {
                centered
                    .axis_iter_mut(Axis(0))
                    .into_par_iter()
                    .enumerate()
                    .for_each(|(i, mut row)| {
                        row -= means[i];
                    });
            }
        }

        Ok(centered)
    }

    fn covariance(&self) -> anyhow::Result<Array2<f64>> {
        let n_samples = self.nrows();
        if n_samples < 2 {
            bail!(
                "Covariance needs at least 2 observations, got {}",
                n_samples
            );
        }

        self.ensure_finite("data matrix")?;

        let centered = self.centered(&Direction::COLUMN)?;
        let cov = centered.t().dot(&centered) / (n_samples as f64 - 1.0);
        // finite input can still overflow in the products
        cov.ensure_finite("covariance matrix")?;

        // matrix products may round the two triangles differently
        Ok((&cov + &cov.t()) * 0.5)
    }

    fn pairwise_euclidean(&self) -> Array2<f64> {
        let n = self.nrows();
        let mut distances = Array2::zeros((n, n));

        distances
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .enumerate()
            .for_each(|(i, mut out)| {
                let a = self.row(i);
                for (j, d) in out.iter_mut().enumerate() {
                    if i == j {
                        continue;
                    }
                    let b = self.row(j);
                    *d = a
                        .iter()
                        .zip(b.iter())
                        .map(|(&x, &y)| (x - y) * (x - y))
                        .sum::<f64>()
                        .sqrt();
                }
            });

        distances
    }

    fn is_symmetric(&self, tolerance: f64) -> bool {
        let (rows, cols) = self.dim();
        if rows != cols {
            return false;
        }

        let scale = self.iter().fold(1.0_f64, |acc, &v| acc.max(v.abs()));
        let bound = tolerance * scale;

        for i in 0..rows {
            for j in (i + 1)..cols {
                // NaN never compares within bound
                if !((self[[i, j]] - self[[j, i]]).abs() <= bound) {
                    return false;
                }
            }
        }
        true
    }

    fn ensure_finite(&self, what: &str) -> anyhow::Result<()> {
        if let Some(((i, j), v)) = self.indexed_iter().find(|(_, v)| !v.is_finite()) {
            bail!("Non-finite value {} at [{}, {}] of {}", v, i, j, what);
        }
        Ok(())
    }
}
