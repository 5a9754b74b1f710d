//! In-memory tabular dataset model.
//!
//! A [`Frame`] is an ordered collection of named columns over rows with
//! stable integer ids (`0..n_rows`). Cells hold either a scalar [`Value`]
//! (categorical or numeric, possibly missing) or, for multilabel columns, a
//! list of labels. Frames are immutable once built; samplers only ever read
//! them.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::errors::SamplerError;
use crate::types::{ColumnName, RowId};

/// Ordered tuple of groupby-column values identifying one row partition.
pub type GroupKey = Vec<Value>;

/// Scalar cell value.
///
/// `Null` and `Float(NaN)` are both *missing*: they never enter an inverted
/// index and never satisfy an equality match. Floats compare and hash by
/// canonical bit pattern (`-0.0` folded into `0.0`) so `Value` can key
/// bucket maps.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Value {
    /// Explicitly missing value.
    Null,
    /// Integer value.
    Int(i64),
    /// Floating point value; NaN is treated as missing.
    Float(f64),
    /// Categorical/text value.
    Text(String),
}

impl Value {
    /// True when this value is missing (`Null` or a NaN float).
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    fn float_key(f: f64) -> u64 {
        // Fold -0.0 into 0.0 and all NaN payloads into one key so hashing
        // and equality agree with the bucket semantics.
        if f == 0.0 {
            0f64.to_bits()
        } else if f.is_nan() {
            f64::NAN.to_bits()
        } else {
            f.to_bits()
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => Self::float_key(*a) == Self::float_key(*b),
            (Value::Text(a), Value::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Int(i) => {
                1u8.hash(state);
                i.hash(state);
            }
            Value::Float(f) => {
                2u8.hash(state);
                Self::float_key(*f).hash(state);
            }
            Value::Text(s) => {
                3u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

/// One cell of a frame: a scalar value or a multilabel label list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    /// Scalar-valued cell.
    Scalar(Value),
    /// Label-set-valued cell (multilabel columns). Order is irrelevant;
    /// duplicates are ignored by the index.
    Labels(Vec<Value>),
}

impl Cell {
    /// Build a multilabel cell from anything yielding values.
    pub fn labels<I, V>(labels: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Cell::Labels(labels.into_iter().map(Into::into).collect())
    }

    /// True when the cell carries no usable value: a missing scalar or an
    /// empty label list.
    pub fn is_missing(&self) -> bool {
        match self {
            Cell::Scalar(value) => value.is_missing(),
            Cell::Labels(labels) => labels.iter().all(Value::is_missing),
        }
    }
}

impl<V: Into<Value>> From<V> for Cell {
    fn from(value: V) -> Self {
        Cell::Scalar(value.into())
    }
}

/// Ordered, named-column dataset with stable integer row ids.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Frame {
    columns: IndexMap<ColumnName, Vec<Cell>>,
    n_rows: usize,
}

impl Frame {
    /// Build a frame from `(name, cells)` columns. All columns must have the
    /// same length and distinct names.
    pub fn from_columns<N>(columns: Vec<(N, Vec<Cell>)>) -> Result<Self, SamplerError>
    where
        N: Into<ColumnName>,
    {
        let mut map: IndexMap<ColumnName, Vec<Cell>> = IndexMap::with_capacity(columns.len());
        let mut n_rows = None;
        for (name, cells) in columns {
            let name = name.into();
            match n_rows {
                None => n_rows = Some(cells.len()),
                Some(expected) if expected != cells.len() => {
                    return Err(SamplerError::Configuration(format!(
                        "column '{}' has {} rows, expected {}",
                        name,
                        cells.len(),
                        expected
                    )));
                }
                Some(_) => {}
            }
            if map.insert(name.clone(), cells).is_some() {
                return Err(SamplerError::Configuration(format!(
                    "duplicate column name '{name}'"
                )));
            }
        }
        Ok(Self {
            columns: map,
            n_rows: n_rows.unwrap_or(0),
        })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// True when the frame has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &ColumnName> {
        self.columns.keys()
    }

    /// Cells of one column, in row order.
    pub fn column(&self, name: &str) -> Option<&[Cell]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Single cell lookup.
    pub fn cell(&self, row: RowId, name: &str) -> Option<&Cell> {
        self.columns.get(name).and_then(|cells| cells.get(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_values_hash_by_canonical_bits() {
        assert_eq!(Value::Float(0.0), Value::Float(-0.0));
        assert_eq!(Value::Float(f64::NAN), Value::Float(-f64::NAN));
        assert_ne!(Value::Float(1.0), Value::Float(2.0));
    }

    #[test]
    fn missing_detection() {
        assert!(Value::Null.is_missing());
        assert!(Value::Float(f64::NAN).is_missing());
        assert!(!Value::Float(0.0).is_missing());
        assert!(!Value::Text("x".into()).is_missing());
        assert!(Cell::labels(Vec::<Value>::new()).is_missing());
        assert!(!Cell::labels(["a"]).is_missing());
    }

    #[test]
    fn from_columns_rejects_ragged_input() {
        let result = Frame::from_columns(vec![
            ("a", vec![Cell::from("x"), Cell::from("y")]),
            ("b", vec![Cell::from("z")]),
        ]);
        assert!(matches!(result, Err(SamplerError::Configuration(_))));
    }

    #[test]
    fn from_columns_rejects_duplicate_names() {
        let result = Frame::from_columns(vec![
            ("a", vec![Cell::from("x")]),
            ("a", vec![Cell::from("y")]),
        ]);
        assert!(matches!(result, Err(SamplerError::Configuration(_))));
    }

    #[test]
    fn cell_lookup() {
        let frame = Frame::from_columns(vec![
            ("a", vec![Cell::from("x"), Cell::from("y")]),
            ("b", vec![Cell::from(1i64), Cell::from(2i64)]),
        ])
        .unwrap();
        assert_eq!(frame.n_rows(), 2);
        assert_eq!(frame.cell(1, "a"), Some(&Cell::from("y")));
        assert_eq!(frame.cell(0, "b"), Some(&Cell::from(1i64)));
        assert!(frame.cell(2, "a").is_none());
        assert!(frame.column("c").is_none());
    }
}
