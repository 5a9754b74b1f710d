//! Per-column inverted indexes and the sorted-set algebra they compose with.
//!
//! Every column a sampler may group or exclude on gets one [`ColumnIndex`]:
//! a map from value to the ordered set of row ids carrying that value.
//! Multilabel columns are exploded so each individual label owns a bucket.
//! Row-id sets are sorted vectors; partitioning and exclusion are expressed
//! as merge-based intersection, union, and difference over them, which keeps
//! pair enumeration sub-quadratic without materializing cross products.

use indexmap::IndexMap;

use crate::frame::{Cell, Value};
use crate::types::RowId;

/// Equality semantics of a column.
///
/// This is the pluggable predicate seam: the enumeration algorithms are
/// written once against bucket lookups and [`cells_differ`], and a column's
/// kind decides what "equal" means.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// Cells are single values; equal means the same value.
    Scalar,
    /// Cells are label sets; equal means the sets share at least one label,
    /// different means the sets are disjoint.
    Multilabel,
}

/// Immutable inverted index over one column.
#[derive(Clone, Debug)]
pub struct ColumnIndex {
    kind: ColumnKind,
    /// Value (or exploded label) to sorted row ids carrying it. Missing
    /// values never enter a bucket.
    buckets: IndexMap<Value, Vec<RowId>>,
    /// Sorted row ids with a usable (non-missing) cell.
    non_missing: Vec<RowId>,
}

impl ColumnIndex {
    /// Build the index for one column. Rows are visited in id order, so
    /// every bucket comes out sorted without an extra pass.
    pub fn build(cells: &[Cell], kind: ColumnKind) -> Self {
        let mut buckets: IndexMap<Value, Vec<RowId>> = IndexMap::new();
        let mut non_missing = Vec::new();
        for (row, cell) in cells.iter().enumerate() {
            if cell.is_missing() {
                continue;
            }
            non_missing.push(row);
            match cell {
                Cell::Scalar(value) => {
                    buckets.entry(value.clone()).or_default().push(row);
                }
                Cell::Labels(labels) => {
                    for label in labels {
                        if label.is_missing() {
                            continue;
                        }
                        let bucket = buckets.entry(label.clone()).or_default();
                        // A row may repeat a label; index it once.
                        if bucket.last() != Some(&row) {
                            bucket.push(row);
                        }
                    }
                }
            }
        }
        Self {
            kind,
            buckets,
            non_missing,
        }
    }

    /// Equality semantics of this column.
    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    /// Sorted row ids carrying `value` (exact value for scalar columns, one
    /// label for multilabel columns).
    pub fn bucket(&self, value: &Value) -> Option<&[RowId]> {
        self.buckets.get(value).map(Vec::as_slice)
    }

    /// Distinct indexed values, in first-seen row order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.buckets.keys()
    }

    /// Value/bucket entries, in first-seen row order.
    pub fn entries(&self) -> impl Iterator<Item = (&Value, &[RowId])> {
        self.buckets.iter().map(|(v, rows)| (v, rows.as_slice()))
    }

    /// Number of distinct indexed values.
    pub fn n_distinct(&self) -> usize {
        self.buckets.len()
    }

    /// Value/bucket entry by position in first-seen order. Positions are
    /// stable for the lifetime of the index, which makes uniform draws over
    /// the distinct-value set reproducible.
    pub fn entry_at(&self, position: usize) -> Option<(&Value, &[RowId])> {
        self.buckets
            .get_index(position)
            .map(|(v, rows)| (v, rows.as_slice()))
    }

    /// Sorted row ids with a non-missing cell in this column.
    pub fn non_missing(&self) -> &[RowId] {
        &self.non_missing
    }

    /// Sorted row ids whose cell is *equal* to `cell` under this column's
    /// predicate: the value's bucket for scalar columns, the union of the
    /// label buckets for multilabel columns. Missing cells match nothing.
    pub fn matching_rows(&self, cell: &Cell) -> Vec<RowId> {
        match cell {
            Cell::Scalar(value) if !value.is_missing() => self
                .bucket(value)
                .map(|rows| rows.to_vec())
                .unwrap_or_default(),
            Cell::Labels(labels) => {
                let bucket_refs: Vec<&[RowId]> = labels
                    .iter()
                    .filter(|label| !label.is_missing())
                    .filter_map(|label| self.bucket(label))
                    .collect();
                union_sorted(&bucket_refs)
            }
            _ => Vec::new(),
        }
    }
}

/// Inequality predicate for two cells of a column of the given kind.
///
/// Scalar cells differ unless both are non-missing and equal; in particular
/// a missing cell differs from everything, including another missing cell.
/// Multilabel cells differ iff their usable label sets are disjoint.
pub fn cells_differ(kind: ColumnKind, a: &Cell, b: &Cell) -> bool {
    match kind {
        ColumnKind::Scalar => match (a, b) {
            (Cell::Scalar(x), Cell::Scalar(y)) => {
                x.is_missing() || y.is_missing() || x != y
            }
            _ => true,
        },
        ColumnKind::Multilabel => match (a, b) {
            (Cell::Labels(x), Cell::Labels(y)) => !x
                .iter()
                .any(|label| !label.is_missing() && y.contains(label)),
            _ => true,
        },
    }
}

/// Intersection of two sorted row-id sets.
pub fn intersect_sorted(a: &[RowId], b: &[RowId]) -> Vec<RowId> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Union of any number of sorted row-id sets, deduplicated.
pub fn union_sorted(sets: &[&[RowId]]) -> Vec<RowId> {
    match sets.len() {
        0 => Vec::new(),
        1 => sets[0].to_vec(),
        _ => {
            let mut merged: Vec<RowId> = sets.iter().flat_map(|s| s.iter().copied()).collect();
            merged.sort_unstable();
            merged.dedup();
            merged
        }
    }
}

/// Elements of sorted `a` absent from sorted `b`.
pub fn difference_sorted(a: &[RowId], b: &[RowId]) -> Vec<RowId> {
    let mut out = Vec::with_capacity(a.len());
    let mut j = 0;
    for &x in a {
        while j < b.len() && b[j] < x {
            j += 1;
        }
        if j >= b.len() || b[j] != x {
            out.push(x);
        }
    }
    out
}
