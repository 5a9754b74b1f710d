/// Stable integer row identifier (position in the frame's row order).
/// Example: `0`, `417`
pub type RowId = usize;
/// Name of a frame column.
/// Examples: `compound`, `plate`, `well`
pub type ColumnName = String;
/// Canonical unordered pair of distinct row ids, smaller id first.
/// Example: `(3, 17)`
pub type Pair = (RowId, RowId);
/// Seed for the sampler-owned deterministic generator.
/// Example: `0`
pub type Seed = u64;
