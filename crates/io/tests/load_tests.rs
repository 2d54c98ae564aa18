// Workbook loading through the public entry point.

use bomrecon_io::{load_dataset, IoError};
use bomrecon_recon::model::CellValue;
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

#[test]
fn xlsx_numeric_part_numbers_load_as_text() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("sap.xlsx");

    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "Component number").unwrap();
    ws.write_string(0, 1, "Component quantity").unwrap();
    ws.write_string(0, 2, "Component UoM").unwrap();
    ws.write_number(1, 0, 12345.0).unwrap();
    ws.write_number(1, 1, 2.5).unwrap();
    ws.write_string(1, 2, " PCS ").unwrap();
    // fully blank row in the middle is dropped
    ws.write_string(3, 0, "A-200").unwrap();
    ws.write_number(3, 1, 4.0).unwrap();
    wb.save(&path).unwrap();

    let ds = load_dataset(&path).unwrap();
    assert_eq!(ds.columns(), ["Component number", "Component quantity", "Component UoM"]);
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.rows()[0][0], CellValue::text("12345"));
    assert_eq!(ds.rows()[0][1], CellValue::Number(2.5));
    assert_eq!(ds.rows()[0][2], CellValue::text("PCS"));
    assert_eq!(ds.rows()[1][0], CellValue::text("A-200"));
    assert_eq!(ds.rows()[1][2], CellValue::Empty);
}

#[test]
fn only_first_sheet_is_read() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("two.xlsx");

    let mut wb = Workbook::new();
    let first = wb.add_worksheet().set_name("BOM").unwrap();
    first.write_string(0, 0, "Part Number").unwrap();
    first.write_string(1, 0, "P1").unwrap();
    let second = wb.add_worksheet().set_name("Notes").unwrap();
    second.write_string(0, 0, "Comment").unwrap();
    wb.save(&path).unwrap();

    let ds = load_dataset(&path).unwrap();
    assert_eq!(ds.columns(), ["Part Number"]);
    assert_eq!(ds.rows()[0][0], CellValue::text("P1"));
}

#[test]
fn extension_dispatch_is_case_insensitive() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("BOM.CSV");
    std::fs::write(&path, "Part;Qty\n007;1\n").unwrap();

    let ds = load_dataset(&path).unwrap();
    assert_eq!(ds.rows()[0][0], CellValue::text("007"));
}

#[test]
fn corrupt_workbook_is_a_read_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"not a zip archive").unwrap();

    let err = load_dataset(&path).unwrap_err();
    assert!(matches!(err, IoError::Read { .. }), "{err:?}");
}
