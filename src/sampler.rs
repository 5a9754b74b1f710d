//! Pair enumeration and seeded null-pair sampling.
//!
//! [`Sampler`] owns the column indexes for a frame plus an explicit seeded
//! generator. `get_all_pairs` enumerates every valid pair under
//! groupby/diffby rules, partitioned by group key; `sample_null_pair` draws
//! single random pairs guaranteed to differ on the requested columns.
//! [`SamplerMultilabel`] runs the same algorithms with one column's equality
//! redefined as label-set intersection.

use indexmap::IndexMap;
use rand::prelude::*;
use rand::seq::IndexedRandom;
use tracing::{debug, warn};

use crate::constants::sampler::{NULL_PAIR_RETRY_LIMIT, NULL_PAIR_WARN_AFTER};
use crate::errors::SamplerError;
use crate::frame::{Frame, GroupKey};
use crate::index::{cells_differ, difference_sorted, intersect_sorted, union_sorted};
use crate::index::{ColumnIndex, ColumnKind};
use crate::types::{ColumnName, Pair, RowId, Seed};

#[derive(Debug, Clone)]
/// Small deterministic RNG (splitmix64) owned by each sampler.
///
/// Using an explicit instance instead of ambient randomness makes the draw
/// sequence a pure function of (seed, dataset, call order), and keeps it
/// bit-identical across platforms and `rand` upgrades.
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64_internal(&mut self) -> u64 {
        let mut z = self.state.wrapping_add(0x9E3779B97F4A7C15);
        self.state = z;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }
}

impl rand::RngCore for DeterministicRng {
    fn next_u32(&mut self) -> u32 {
        self.next_u64_internal() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.next_u64_internal()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut offset = 0;
        while offset < dest.len() {
            let value = self.next_u64_internal();
            let bytes = value.to_le_bytes();
            let remaining = dest.len() - offset;
            let copy_len = remaining.min(bytes.len());
            dest[offset..offset + copy_len].copy_from_slice(&bytes[..copy_len]);
            offset += copy_len;
        }
    }
}

/// Shared engine behind the scalar and multilabel samplers.
struct PairEngine {
    frame: Frame,
    /// One index per requested column; immutable after construction.
    indexes: IndexMap<ColumnName, ColumnIndex>,
    /// Advances with every null-pair draw; draw order is significant.
    rng: DeterministicRng,
}

impl PairEngine {
    fn new<S: AsRef<str>>(
        frame: Frame,
        columns: &[S],
        multilabel_col: Option<&str>,
        seed: Seed,
    ) -> Result<Self, SamplerError> {
        if let Some(name) = multilabel_col {
            if !columns.iter().any(|c| c.as_ref() == name) {
                return Err(SamplerError::Configuration(format!(
                    "multilabel column '{name}' is not in the indexed column list"
                )));
            }
        }
        let mut indexes = IndexMap::with_capacity(columns.len());
        for column in columns {
            let name = column.as_ref();
            let cells = frame
                .column(name)
                .ok_or_else(|| SamplerError::UnknownColumn(name.to_string()))?;
            let kind = if multilabel_col == Some(name) {
                ColumnKind::Multilabel
            } else {
                ColumnKind::Scalar
            };
            indexes.insert(name.to_string(), ColumnIndex::build(cells, kind));
        }
        Ok(Self {
            frame,
            indexes,
            rng: DeterministicRng::new(seed),
        })
    }

    fn index_for(&self, name: &str) -> Result<&ColumnIndex, SamplerError> {
        self.indexes
            .get(name)
            .ok_or_else(|| SamplerError::UnknownColumn(name.to_string()))
    }

    fn get_all_pairs<S: AsRef<str>>(
        &self,
        groupby: &[S],
        diffby: &[S],
    ) -> Result<IndexMap<GroupKey, Vec<Pair>>, SamplerError> {
        let groupby: Vec<&str> = groupby.iter().map(AsRef::as_ref).collect();
        let diffby: Vec<&str> = diffby.iter().map(AsRef::as_ref).collect();
        if groupby.iter().any(|col| diffby.contains(col)) {
            return Err(SamplerError::Configuration(
                "groupby and diffby must be disjoint lists".into(),
            ));
        }
        let group_indexes: Vec<&ColumnIndex> = groupby
            .iter()
            .map(|col| self.index_for(col))
            .collect::<Result<_, _>>()?;
        let diff_columns: Vec<(&str, &ColumnIndex)> = diffby
            .iter()
            .map(|col| self.index_for(col).map(|index| (*col, index)))
            .collect::<Result<_, _>>()?;

        // Partition rows by group key: refine by one groupby column at a
        // time, intersecting the running partition with each value bucket.
        // Buckets of a multilabel column overlap, so a row can land in one
        // partition per label it carries.
        let all_rows: Vec<RowId> = (0..self.frame.n_rows()).collect();
        let mut partitions: Vec<(GroupKey, Vec<RowId>)> = vec![(GroupKey::new(), all_rows)];
        for index in &group_indexes {
            let mut refined = Vec::new();
            for (key, rows) in &partitions {
                for (value, bucket) in index.entries() {
                    let subset = intersect_sorted(rows, bucket);
                    // Singleton partitions can never produce a pair.
                    if subset.len() >= 2 {
                        let mut subkey = key.clone();
                        subkey.push(value.clone());
                        refined.push((subkey, subset));
                    }
                }
            }
            partitions = refined;
        }

        let mut result: IndexMap<GroupKey, Vec<Pair>> = IndexMap::new();
        let mut total_pairs = 0usize;
        for (key, rows) in partitions {
            if rows.len() < 2 {
                continue;
            }
            let mut pairs = Vec::new();
            for (pos, &row) in rows.iter().enumerate() {
                // Rows invalid as partners of `row`: union, over the diffby
                // columns, of the rows sharing that column's value with it.
                // The complement against the partition tail yields every
                // canonical (row < partner) pair exactly once, without
                // touching the full intra-partition cross product.
                let conflict_sets: Vec<Vec<RowId>> = diff_columns
                    .iter()
                    .filter_map(|(col, index)| {
                        self.frame
                            .cell(row, col)
                            .map(|cell| index.matching_rows(cell))
                    })
                    .collect();
                let conflict_refs: Vec<&[RowId]> =
                    conflict_sets.iter().map(Vec::as_slice).collect();
                let conflicts = union_sorted(&conflict_refs);
                for partner in difference_sorted(&rows[pos + 1..], &conflicts) {
                    pairs.push((row, partner));
                }
            }
            if !pairs.is_empty() {
                total_pairs += pairs.len();
                result.insert(key, pairs);
            }
        }
        debug!(
            groups = result.len(),
            pairs = total_pairs,
            "enumerated valid pairs"
        );
        Ok(result)
    }

    fn sample_null_pair<S: AsRef<str>>(&mut self, diffby: &[S]) -> Result<Pair, SamplerError> {
        if diffby.is_empty() {
            return Err(SamplerError::Configuration(
                "diffby must name at least one column".into(),
            ));
        }
        // Borrow the index map directly so the borrow stays disjoint from
        // the generator, which mutates on every draw below.
        let indexes = &self.indexes;
        let columns: Vec<(&str, &ColumnIndex)> = diffby
            .iter()
            .map(|col| {
                let name = col.as_ref();
                indexes
                    .get(name)
                    .map(|index| (name, index))
                    .ok_or_else(|| SamplerError::UnknownColumn(name.to_string()))
            })
            .collect::<Result<_, _>>()?;
        // No pair can exist when some column offers fewer than two usable
        // values; fail before burning the retry budget.
        for (name, index) in &columns {
            if index.n_distinct() < 2 {
                return Err(SamplerError::NotEnoughValues {
                    column: name.to_string(),
                });
            }
        }

        let mut wasted = 0usize;
        while wasted < NULL_PAIR_RETRY_LIMIT {
            if wasted == NULL_PAIR_WARN_AFTER {
                warn!(
                    wasted,
                    "null-pair sampling is discarding many draws; diffby value \
                     combinations are sparse"
                );
            }
            // Per column: two distinct values drawn uniformly over the
            // distinct-value set, then one candidate pool per side built by
            // intersecting the chosen buckets across columns. Sampling value
            // buckets instead of raw rows keeps the wasted-draw probability
            // bounded even when a column has as few as two distinct values.
            let mut pool_a: Option<Vec<RowId>> = None;
            let mut pool_b: Option<Vec<RowId>> = None;
            for (_, index) in &columns {
                let n = index.n_distinct();
                let first = self.rng.random_range(0..n);
                // Offset into the remaining positions, so the second value
                // is uniform over the other n-1 and always distinct.
                let second = (first + 1 + self.rng.random_range(0..n - 1)) % n;
                let (Some((_, bucket_a)), Some((_, bucket_b))) =
                    (index.entry_at(first), index.entry_at(second))
                else {
                    // Unreachable: positions are drawn below n_distinct.
                    pool_a = None;
                    pool_b = None;
                    break;
                };
                pool_a = Some(match pool_a {
                    None => bucket_a.to_vec(),
                    Some(pool) => intersect_sorted(&pool, bucket_a),
                });
                pool_b = Some(match pool_b {
                    None => bucket_b.to_vec(),
                    Some(pool) => intersect_sorted(&pool, bucket_b),
                });
            }
            let (Some(pool_a), Some(pool_b)) = (pool_a, pool_b) else {
                wasted += 1;
                continue;
            };
            let (Some(&id1), Some(&id2)) =
                (pool_a.choose(&mut self.rng), pool_b.choose(&mut self.rng))
            else {
                // One of the chosen value combinations selects no rows.
                wasted += 1;
                continue;
            };
            if id1 != id2 && self.rows_differ_on(id1, id2, &columns) {
                return Ok((id1.min(id2), id1.max(id2)));
            }
            // Scalar buckets are disjoint per column, so this branch is only
            // reachable for multilabel columns, where buckets overlap.
            wasted += 1;
        }
        Err(SamplerError::RetriesExhausted {
            attempts: NULL_PAIR_RETRY_LIMIT,
        })
    }

    fn rows_differ_on(&self, id1: RowId, id2: RowId, columns: &[(&str, &ColumnIndex)]) -> bool {
        columns.iter().all(|(name, index)| {
            match (self.frame.cell(id1, name), self.frame.cell(id2, name)) {
                (Some(a), Some(b)) => cells_differ(index.kind(), a, b),
                _ => false,
            }
        })
    }
}

/// Pair sampler over scalar columns.
///
/// Construction builds one inverted index per named column; the indexes and
/// the frame are read-only afterwards. Only the generator cursor mutates,
/// which is why [`Sampler::get_all_pairs`] takes `&self` and
/// [`Sampler::sample_null_pair`] takes `&mut self`.
pub struct Sampler {
    engine: PairEngine,
}

impl Sampler {
    /// Build a sampler indexing `columns` of `frame`, seeded with `seed`.
    pub fn new<S: AsRef<str>>(frame: Frame, columns: &[S], seed: Seed) -> Result<Self, SamplerError> {
        Ok(Self {
            engine: PairEngine::new(frame, columns, None, seed)?,
        })
    }

    /// All valid unordered pairs, keyed by group key.
    ///
    /// A pair `(i, j)` is valid for key `K` iff rows `i` and `j` share every
    /// groupby column's value (the components of `K`) and differ on *every*
    /// diffby column simultaneously. Group keys with no valid pairs are
    /// absent from the result. Fails with a configuration error when
    /// `groupby` and `diffby` overlap.
    pub fn get_all_pairs<S: AsRef<str>>(
        &self,
        groupby: &[S],
        diffby: &[S],
    ) -> Result<IndexMap<GroupKey, Vec<Pair>>, SamplerError> {
        self.engine.get_all_pairs(groupby, diffby)
    }

    /// One random pair whose rows carry different, non-missing values in
    /// every `diffby` column.
    ///
    /// Rows with a missing value in any requested column are excluded from
    /// the candidate pool, never compared as unequal. Fails when a column
    /// has fewer than two distinct usable values, or after
    /// [`NULL_PAIR_RETRY_LIMIT`] wasted draws.
    pub fn sample_null_pair<S: AsRef<str>>(&mut self, diffby: &[S]) -> Result<Pair, SamplerError> {
        self.engine.sample_null_pair(diffby)
    }

    /// The dataset this sampler reads.
    pub fn frame(&self) -> &Frame {
        &self.engine.frame
    }
}

/// Pair sampler where one designated column holds label sets.
///
/// Wherever the multilabel column appears in `groupby` or `diffby`, "equal"
/// means the two rows' label sets intersect and "different" means they are
/// disjoint. All other mechanics are identical to [`Sampler`], running over
/// the label-exploded index.
pub struct SamplerMultilabel {
    engine: PairEngine,
}

impl SamplerMultilabel {
    /// Build a sampler where `multilabel_col` (which must appear in
    /// `columns`) is indexed by individual label.
    pub fn new<S: AsRef<str>>(
        frame: Frame,
        columns: &[S],
        multilabel_col: &str,
        seed: Seed,
    ) -> Result<Self, SamplerError> {
        Ok(Self {
            engine: PairEngine::new(frame, columns, Some(multilabel_col), seed)?,
        })
    }

    /// All valid unordered pairs, keyed by group key. A multilabel groupby
    /// column keys partitions by individual label, so a pair whose rows
    /// share several labels appears under each shared label's key.
    pub fn get_all_pairs<S: AsRef<str>>(
        &self,
        groupby: &[S],
        diffby: &[S],
    ) -> Result<IndexMap<GroupKey, Vec<Pair>>, SamplerError> {
        self.engine.get_all_pairs(groupby, diffby)
    }

    /// One random pair differing on every `diffby` column; the multilabel
    /// column differs when the label sets are disjoint.
    pub fn sample_null_pair<S: AsRef<str>>(&mut self, diffby: &[S]) -> Result<Pair, SamplerError> {
        self.engine.sample_null_pair(diffby)
    }

    /// The dataset this sampler reads.
    pub fn frame(&self) -> &Frame {
        &self.engine.frame
    }
}
