//! Shared helpers for integration tests: synthetic frames and an
//! unoptimized cross-product reference for pair enumeration.
#![allow(dead_code)] // each test binary uses a subset of these helpers

use std::collections::HashSet;

use indexmap::IndexMap;
use rand::prelude::*;
use rand::rngs::StdRng;

use rowpairs::index::cells_differ;
use rowpairs::{Cell, ColumnKind, Frame, GroupKey, Pair, Value};

/// Frame with columns `c`, `p`, `w`, each drawn uniformly from `n_options`
/// categorical values.
pub fn create_frame(n_options: usize, n_rows: usize, seed: u64) -> Frame {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut columns = Vec::new();
    for prefix in ["c", "p", "w"] {
        let cells: Vec<Cell> = (0..n_rows)
            .map(|_| Cell::from(format!("{prefix}{}", rng.random_range(0..n_options))))
            .collect();
        columns.push((prefix, cells));
    }
    Frame::from_columns(columns).unwrap()
}

/// Frame with float-valued columns `c`, `p`, `w` where each cell is NaN with
/// probability `nan_share`.
pub fn create_float_frame(n_options: usize, n_rows: usize, nan_share: f64, seed: u64) -> Frame {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut columns = Vec::new();
    for prefix in ["c", "p", "w"] {
        let cells: Vec<Cell> = (0..n_rows)
            .map(|_| {
                if rng.random::<f64>() < nan_share {
                    Cell::Scalar(Value::Float(f64::NAN))
                } else {
                    Cell::from(rng.random_range(0..n_options) as f64)
                }
            })
            .collect();
        columns.push((prefix, cells));
    }
    Frame::from_columns(columns).unwrap()
}

/// Plate-layout frame: `n_compounds * n_replicates` rows where row `i` holds
/// compound `i % n_compounds`, well `i % plate_size`, plate `i / plate_size`.
pub fn simulate_plates(n_compounds: usize, n_replicates: usize, plate_size: usize) -> Frame {
    let total = n_compounds * n_replicates;
    let mut compounds = Vec::with_capacity(total);
    let mut plates = Vec::with_capacity(total);
    let mut wells = Vec::with_capacity(total);
    for i in 0..total {
        compounds.push(Cell::from(format!("c{}", i % n_compounds)));
        plates.push(Cell::from(format!("p{}", i / plate_size)));
        wells.push(Cell::from(format!("w{}", i % plate_size)));
    }
    Frame::from_columns(vec![("c", compounds), ("p", plates), ("w", wells)]).unwrap()
}

fn kind_of(col: &str, multilabel_col: Option<&str>) -> ColumnKind {
    if multilabel_col == Some(col) {
        ColumnKind::Multilabel
    } else {
        ColumnKind::Scalar
    }
}

/// Valid pair set computed by filtering the full row cross product. The
/// reference the inverted-index enumerator must agree with, as a set.
pub fn naive_pairs(
    frame: &Frame,
    groupby: &[&str],
    diffby: &[&str],
    multilabel_col: Option<&str>,
) -> HashSet<Pair> {
    let n = frame.n_rows();
    let mut out = HashSet::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let grouped = groupby.iter().all(|col| {
                let a = frame.cell(i, col).unwrap();
                let b = frame.cell(j, col).unwrap();
                !cells_differ(kind_of(col, multilabel_col), a, b)
            });
            let separated = diffby.iter().all(|col| {
                let a = frame.cell(i, col).unwrap();
                let b = frame.cell(j, col).unwrap();
                cells_differ(kind_of(col, multilabel_col), a, b)
            });
            if grouped && separated {
                out.insert((i, j));
            }
        }
    }
    out
}

/// Canonical pair set from an enumerator result.
pub fn flatten_pairs(pairs_by_group: &IndexMap<GroupKey, Vec<Pair>>) -> HashSet<Pair> {
    pairs_by_group
        .values()
        .flatten()
        .map(|&(i, j)| (i.min(j), i.max(j)))
        .collect()
}

/// Assert every pair in the result honors the groupby/diffby contract and
/// matches its group key.
pub fn assert_groupby_diffby(
    frame: &Frame,
    pairs_by_group: &IndexMap<GroupKey, Vec<Pair>>,
    groupby: &[&str],
    diffby: &[&str],
    multilabel_col: Option<&str>,
) {
    for (key, pairs) in pairs_by_group {
        assert!(!pairs.is_empty(), "group {key:?} has an empty pair list");
        assert_eq!(key.len(), groupby.len());
        let mut seen = HashSet::new();
        for &(id1, id2) in pairs {
            assert!(id1 < id2, "pair ({id1}, {id2}) is not canonical");
            assert!(seen.insert((id1, id2)), "duplicate pair ({id1}, {id2})");
            for (col, key_value) in groupby.iter().zip(key) {
                for id in [id1, id2] {
                    let cell = frame.cell(id, col).unwrap();
                    let matches_key = match cell {
                        Cell::Scalar(value) => value == key_value,
                        Cell::Labels(labels) => labels.contains(key_value),
                    };
                    assert!(matches_key, "row {id} does not match key {key_value} in '{col}'");
                }
            }
            for col in diffby {
                let a = frame.cell(id1, col).unwrap();
                let b = frame.cell(id2, col).unwrap();
                assert!(
                    cells_differ(kind_of(col, multilabel_col), a, b),
                    "rows {id1} and {id2} share '{col}'"
                );
            }
        }
    }
}
