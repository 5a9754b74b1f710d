use thiserror::Error;

use crate::types::ColumnName;

/// Error type for sampler configuration, sampling, and aggregation failures.
#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("column '{0}' is not indexed by this sampler")]
    UnknownColumn(ColumnName),
    #[error("column '{column}' has fewer than two distinct non-missing values")]
    NotEnoughValues { column: ColumnName },
    #[error("no valid null pair found after {attempts} attempts")]
    RetriesExhausted { attempts: usize },
    #[error("pairwise op produced {actual} scores for {expected} pairs")]
    BatchMismatch { expected: usize, actual: usize },
}
