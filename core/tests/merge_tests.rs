mod common;

use common::table;
use table_diff::{
    Answer, CellValue, CompareFlags, ConflictRow, MatchSession, Merger,
};

#[test]
fn merge_combines_independent_row_and_cell_changes() {
    let ancestor = table(&[
        &["id", "name", "city"],
        &["1", "Alice", "Ottawa"],
        &["2", "Bob", "Toronto"],
    ]);
    // Local fixes a name, remote adds a row and retires another.
    let local = table(&[
        &["id", "name", "city"],
        &["1", "Alicia", "Ottawa"],
        &["2", "Bob", "Toronto"],
    ]);
    let remote = table(&[
        &["id", "name", "city"],
        &["1", "Alice", "Ottawa"],
        &["3", "Cara", "Hamilton"],
    ]);

    let mut merger = Merger::new(ancestor, local, remote, CompareFlags::default());
    assert_eq!(merger.apply(), 0);

    let merged = merger.merged().unwrap();
    assert_eq!(merged.row_count(), 2);
    assert_eq!(merged.cell(0, 1), &CellValue::text("Alicia"));
    assert_eq!(merged.cell(1, 1), &CellValue::text("Cara"));
}

#[test]
fn merge_carries_a_remote_column_onto_local_rows() {
    let ancestor = table(&[&["id", "name"], &["1", "Alice"], &["2", "Bob"]]);
    let local = table(&[&["id", "name"], &["1", "Alicia"], &["2", "Bob"]]);
    let remote = table(&[
        &["id", "name", "phone"],
        &["1", "Alice", "555-1"],
        &["2", "Bob", "555-2"],
    ]);

    let mut merger = Merger::new(ancestor, local, remote, CompareFlags::default());
    assert_eq!(merger.apply(), 0);

    let merged = merger.merged().unwrap();
    assert_eq!(merged.column_names(), ["id", "name", "phone"]);
    assert_eq!(merged.cell(0, 1), &CellValue::text("Alicia"));
    assert_eq!(merged.cell(0, 2), &CellValue::text("555-1"));
    assert_eq!(merged.cell(1, 2), &CellValue::text("555-2"));
}

#[test]
fn conflicts_are_reported_in_row_major_order() {
    let ancestor = table(&[
        &["id", "a", "b"],
        &["1", "x", "y"],
        &["2", "p", "q"],
    ]);
    let local = table(&[
        &["id", "a", "b"],
        &["1", "x1", "y1"],
        &["2", "p1", "q"],
    ]);
    let remote = table(&[
        &["id", "a", "b"],
        &["1", "x2", "y2"],
        &["2", "p2", "q"],
    ]);

    let mut merger = Merger::new(ancestor, local, remote, CompareFlags::default());
    assert_eq!(merger.apply(), 3);

    let positions: Vec<(ConflictRow, String)> = merger
        .conflicts()
        .iter()
        .map(|c| (c.row, c.column.clone()))
        .collect();
    assert_eq!(
        positions,
        vec![
            (ConflictRow::Merged(0), "a".to_string()),
            (ConflictRow::Merged(0), "b".to_string()),
            (ConflictRow::Merged(1), "a".to_string()),
        ]
    );
}

#[test]
fn conflict_records_serialize_for_downstream_review() {
    let ancestor = table(&[&["id", "v"], &["1", "x"]]);
    let local = table(&[&["id", "v"], &["1", "y"]]);
    let remote = table(&[&["id", "v"], &["1", "z"]]);

    let mut merger = Merger::new(ancestor, local, remote, CompareFlags::default());
    merger.apply();

    let json = serde_json::to_value(merger.conflicts()).unwrap();
    let first = &json[0];
    assert_eq!(first["column"], "v");
    assert_eq!(first["ancestor"], "x");
    assert_eq!(first["local"], "y");
    assert_eq!(first["remote"], "z");
}

#[test]
fn renamed_remote_columns_merge_after_pre_matching() {
    let ancestor = table(&[
        &["centre", "city"],
        &["Sunnybrook", "Toronto"],
        &["Humber", "Toronto"],
    ]);
    let local = ancestor.clone();
    // Same data under a renamed column, plus a new centre.
    let remote = table(&[
        &["location_name", "city"],
        &["Sunnybrook", "Toronto"],
        &["Humber", "Toronto"],
        &["Birchmount", "Scarborough"],
    ]);

    let mut session = MatchSession::with_default_threshold(&local, &remote);
    while let Some(question) = session.next_question() {
        let best = question.candidates[0].name.clone();
        assert!(session.answer(Answer::Pick(best)));
    }
    let remote = remote.apply_column_renames(&session.into_remap());

    let mut merger = Merger::new(ancestor, local, remote, CompareFlags::default());
    assert_eq!(merger.apply(), 0);

    let merged = merger.merged().unwrap();
    assert_eq!(merged.column_names(), ["centre", "city"]);
    assert_eq!(merged.row_count(), 3);
    assert_eq!(merged.cell(2, 0), &CellValue::text("Birchmount"));
}

#[test]
fn merge_of_disjoint_edits_is_stable_under_repeat() {
    let ancestor = table(&[&["id", "v"], &["1", "x"], &["2", "y"]]);
    let local = table(&[&["id", "v"], &["1", "x9"], &["2", "y"]]);
    let remote = table(&[&["id", "v"], &["1", "x"], &["2", "y9"]]);

    let mut merger = Merger::new(ancestor, local, remote, CompareFlags::default());
    let conflicts = merger.apply();
    let snapshot = merger.merged().cloned();

    assert_eq!(merger.apply(), conflicts);
    assert_eq!(merger.merged().cloned(), snapshot);
    assert_eq!(conflicts, 0);
    let merged = merger.merged().unwrap();
    assert_eq!(merged.cell(0, 1), &CellValue::text("x9"));
    assert_eq!(merged.cell(1, 1), &CellValue::text("y9"));
}
