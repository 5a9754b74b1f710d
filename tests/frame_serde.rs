//! Frames round-trip through serde without losing cell semantics.

use rowpairs::{Cell, Frame, Value};

#[test]
fn frame_roundtrips_through_json() {
    let frame = Frame::from_columns(vec![
        (
            "c",
            vec![Cell::from("c0"), Cell::Scalar(Value::Null), Cell::from(3i64)],
        ),
        (
            "x",
            vec![Cell::from(1.5), Cell::from(-0.0), Cell::from(2.5)],
        ),
        (
            "tags",
            vec![
                Cell::labels(["a", "b"]),
                Cell::labels(["b"]),
                Cell::labels(Vec::<Value>::new()),
            ],
        ),
    ])
    .unwrap();

    let json = serde_json::to_string(&frame).unwrap();
    let back: Frame = serde_json::from_str(&json).unwrap();

    assert_eq!(back.n_rows(), frame.n_rows());
    let names: Vec<_> = back.column_names().cloned().collect();
    assert_eq!(names, vec!["c", "x", "tags"]);
    assert_eq!(back.cell(0, "c"), Some(&Cell::from("c0")));
    assert_eq!(back.cell(1, "c"), Some(&Cell::Scalar(Value::Null)));
    assert_eq!(back.cell(1, "x"), Some(&Cell::from(0.0)));
    assert!(back.cell(2, "tags").unwrap().is_missing());
}
