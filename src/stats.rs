//! Batched pairwise similarity statistics over a feature matrix.
//!
//! [`pairwise_indexed`] walks a pair list in fixed-size batches, gathering
//! the two index columns into two `batch x D` matrices and applying a
//! row-wise scoring function. Batching exists purely to bound peak memory to
//! `O(batch_size * D)`; it implies no concurrency and preserves input order.

use tracing::debug;

use crate::errors::SamplerError;
use crate::types::{Pair, RowId};

/// Dense row-major `N x D` feature matrix.
#[derive(Clone, Debug)]
pub struct FeatureMatrix {
    data: Vec<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl FeatureMatrix {
    /// Build from row vectors; all rows must share one dimension.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, SamplerError> {
        let n_cols = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * n_cols);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n_cols {
                return Err(SamplerError::Configuration(format!(
                    "feature row {i} has {} columns, expected {n_cols}",
                    row.len()
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            data,
            n_rows: rows.len(),
            n_cols,
        })
    }

    /// Build from flat row-major data.
    pub fn from_flat(data: Vec<f64>, n_rows: usize, n_cols: usize) -> Result<Self, SamplerError> {
        if data.len() != n_rows * n_cols {
            return Err(SamplerError::Configuration(format!(
                "flat data has {} values, expected {n_rows} x {n_cols}",
                data.len()
            )));
        }
        Ok(Self {
            data,
            n_rows,
            n_cols,
        })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Feature dimension.
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// One feature row.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n_cols..(i + 1) * self.n_cols]
    }

    /// Copy the listed rows, in order, into a new matrix.
    fn gather<I: Iterator<Item = RowId>>(&self, ids: I) -> Result<FeatureMatrix, SamplerError> {
        let mut data = Vec::new();
        let mut n_rows = 0;
        for id in ids {
            if id >= self.n_rows {
                return Err(SamplerError::Configuration(format!(
                    "pair index {id} is out of range for {} feature rows",
                    self.n_rows
                )));
            }
            data.extend_from_slice(self.row(id));
            n_rows += 1;
        }
        Ok(FeatureMatrix {
            data,
            n_rows,
            n_cols: self.n_cols,
        })
    }
}

/// Score every pair of feature rows with `pairwise_op`, in the pair list's
/// order, processing `batch_size` pairs at a time.
///
/// The final batch may be shorter; batch outputs are concatenated in order.
/// The concatenated length must equal the pair count exactly: a mismatch
/// indicates a broken scoring function and fails with
/// [`SamplerError::BatchMismatch`].
pub fn pairwise_indexed<F>(
    feats: &FeatureMatrix,
    pairs: &[Pair],
    pairwise_op: F,
    batch_size: usize,
) -> Result<Vec<f64>, SamplerError>
where
    F: Fn(&FeatureMatrix, &FeatureMatrix) -> Vec<f64>,
{
    if batch_size == 0 {
        return Err(SamplerError::Configuration(
            "batch_size must be at least 1".into(),
        ));
    }
    let mut scores = Vec::with_capacity(pairs.len());
    for batch in pairs.chunks(batch_size) {
        let x_sample = feats.gather(batch.iter().map(|&(i, _)| i))?;
        let y_sample = feats.gather(batch.iter().map(|&(_, j)| j))?;
        scores.extend(pairwise_op(&x_sample, &y_sample));
    }
    debug!(
        pairs = pairs.len(),
        batch_size, "scored pair batches"
    );
    if scores.len() != pairs.len() {
        return Err(SamplerError::BatchMismatch {
            expected: pairs.len(),
            actual: scores.len(),
        });
    }
    Ok(scores)
}

/// Row-wise paired Pearson correlation between two equally-shaped matrices.
///
/// Each row of both matrices is mean-centered along the feature axis; the
/// score is the row-wise dot product of the centered vectors divided by the
/// product of their L2 norms. A zero-variance row yields NaN, which is
/// expected, not an error.
pub fn pairwise_corr(x_sample: &FeatureMatrix, y_sample: &FeatureMatrix) -> Vec<f64> {
    paired_rows(x_sample, y_sample)
        .map(|(x, y)| {
            let x_mean = mean(x);
            let y_mean = mean(y);
            let mut numer = 0.0;
            let mut x_ss = 0.0;
            let mut y_ss = 0.0;
            for (&xv, &yv) in x.iter().zip(y) {
                let xc = xv - x_mean;
                let yc = yv - y_mean;
                numer += xc * yc;
                x_ss += xc * xc;
                y_ss += yc * yc;
            }
            numer / (x_ss * y_ss).sqrt()
        })
        .collect()
}

/// Row-wise cosine similarity between two equally-shaped matrices.
///
/// Each row is L2-normalized independently before the row-wise dot product.
/// A zero-norm row yields NaN.
pub fn pairwise_cosine(x_sample: &FeatureMatrix, y_sample: &FeatureMatrix) -> Vec<f64> {
    paired_rows(x_sample, y_sample)
        .map(|(x, y)| {
            let x_norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
            let y_norm = y.iter().map(|v| v * v).sum::<f64>().sqrt();
            let dot: f64 = x.iter().zip(y).map(|(&xv, &yv)| xv * yv).sum();
            dot / (x_norm * y_norm)
        })
        .collect()
}

fn paired_rows<'a>(
    x: &'a FeatureMatrix,
    y: &'a FeatureMatrix,
) -> impl Iterator<Item = (&'a [f64], &'a [f64])> {
    debug_assert_eq!(x.n_rows, y.n_rows);
    debug_assert_eq!(x.n_cols, y.n_cols);
    (0..x.n_rows.min(y.n_rows)).map(|i| (x.row(i), y.row(i)))
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
