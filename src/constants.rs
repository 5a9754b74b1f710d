//! Centralized constants used across the sampler and statistics modules.

/// Constants governing null-pair sampling.
pub mod sampler {
    /// Maximum number of wasted draws tolerated by `sample_null_pair` before
    /// the call fails with `SamplerError::RetriesExhausted`. A draw is wasted
    /// when the chosen value combination selects no rows, or (for multilabel
    /// columns) when the drawn rows fail the per-column difference predicate.
    pub const NULL_PAIR_RETRY_LIMIT: usize = 1000;

    /// Number of wasted draws after which a single warning is logged. Hitting
    /// this usually means the diffby columns are heavily contaminated with
    /// missing values or have very sparse value combinations.
    pub const NULL_PAIR_WARN_AFTER: usize = 500;
}
