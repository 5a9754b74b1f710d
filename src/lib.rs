#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod constants;
pub mod frame;
pub mod index;
pub mod sampler;
pub mod stats;
pub mod types;

mod errors;

pub use errors::SamplerError;
pub use frame::{Cell, Frame, GroupKey, Value};
pub use index::{ColumnIndex, ColumnKind};
pub use sampler::{Sampler, SamplerMultilabel};
pub use stats::{pairwise_corr, pairwise_cosine, pairwise_indexed, FeatureMatrix};
pub use types::{ColumnName, Pair, RowId, Seed};
