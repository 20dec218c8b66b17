//! Bulk CSV work-list tests.
//!
//! Each case writes its own file into an isolated `TempDir`.

use mxpatch_core::WorkItem;
use mxpatch_worklist::{BulkFile, WorkListError, WorkListProvider};
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn bulk(contents: &str) -> (TempDir, BulkFile) {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("tables.csv");
    fs::write(&path, contents).expect("write fixture");
    (dir, BulkFile::new(path))
}

// ---------------------------------------------------------------------------
// Cases
// ---------------------------------------------------------------------------

#[test]
fn rows_keep_file_order() {
    let (_dir, file) = bulk("table,where,outfile\nZED,,\nALPHA,,\nMID,,\n");
    let names: Vec<_> = file
        .list_resources()
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, vec!["ZED", "ALPHA", "MID"]);
}

#[rstest]
#[case("ASSET,,", None, None)]
#[case("ASSET,  ,  ", None, None)]
#[case("ASSET,siteid = 'BEDFORD',", Some("siteid = 'BEDFORD'"), None)]
#[case("ASSET,,V1000_010", None, Some("V1000_010"))]
#[case("ASSET,\"status in ('A','B')\",ASSET-fix", Some("status in ('A','B')"), Some("ASSET-fix"))]
fn optional_cells(
    #[case] row: &str,
    #[case] filter: Option<&str>,
    #[case] outfile: Option<&str>,
) {
    let (_dir, file) = bulk(&format!("table,where,outfile\n{row}\n"));
    let items = file.list_resources().unwrap();
    assert_eq!(
        items,
        vec![WorkItem::named("ASSET")
            .with_filter(filter.map(str::to_string))
            .with_output(outfile.map(str::to_string))]
    );
}

#[test]
fn header_only_is_an_empty_list() {
    let (_dir, file) = bulk("table,where,outfile\n");
    assert!(file.list_resources().unwrap().is_empty());
}

#[test]
fn missing_file_is_a_bulk_error() {
    let dir = TempDir::new().unwrap();
    let err = BulkFile::new(dir.path().join("nope.csv"))
        .list_resources()
        .unwrap_err();
    assert!(matches!(err, WorkListError::Bulk { .. }));
    assert!(err.to_string().contains("nope.csv"));
}

#[test]
fn ragged_row_is_a_bulk_error() {
    let (_dir, file) = bulk("table,where,outfile\nASSET,,,extra\n");
    assert!(matches!(
        file.list_resources().unwrap_err(),
        WorkListError::Bulk { .. }
    ));
}

#[test]
fn blank_table_name_is_rejected() {
    let (_dir, file) = bulk("table,where,outfile\nASSET,,\n,,V1\n");
    match file.list_resources().unwrap_err() {
        WorkListError::MissingName { row, .. } => assert_eq!(row, 2),
        other => panic!("unexpected error: {other}"),
    }
}
