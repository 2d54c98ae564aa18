// Reconciliation workbook and CSV exports

use std::path::Path;

use bomrecon_recon::model::{CellValue, ReconRow, ReconRun, ReconStatus, RunMeta, StatusReport};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use crate::error::IoError;
use crate::xlsx::{
    fill_format, header_format, ColumnWidths, CORRECT_GREEN, SHORTAGE_RED, SURPLUS_AMBER,
};

pub const SUMMARY_SHEET: &str = "Summary";
pub const ISSUES_SHEET: &str = "Issues";
pub const ALL_DATA_SHEET: &str = "All Data";

/// Column headers in export order, derived from the run's source labels.
pub fn row_headers(meta: &RunMeta) -> Vec<String> {
    let r = &meta.reference_label;
    let c = &meta.comparison_label;
    vec![
        "Part Number".to_string(),
        "Status".to_string(),
        "Issues".to_string(),
        format!("{r} Quantity"),
        format!("{c} Quantity"),
        format!("{r} Unit"),
        format!("{c} Unit"),
        format!("{r} Description"),
        format!("{c} Description"),
    ]
}

enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

impl Cell<'_> {
    fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.to_string(),
            Cell::Number(n) => CellValue::Number(*n).to_string(),
            Cell::Blank => String::new(),
        }
    }
}

fn row_cells(row: &ReconRow) -> [Cell<'_>; 9] {
    fn text(v: &Option<String>) -> Cell<'_> {
        match v.as_deref() {
            Some(s) if !s.is_empty() => Cell::Text(s),
            _ => Cell::Blank,
        }
    }
    let qty = |q: Option<f64>| q.map_or(Cell::Blank, Cell::Number);

    [
        Cell::Text(&row.part_number),
        Cell::Text(row.status.label()),
        Cell::Text(&row.issue),
        qty(row.reference_quantity),
        qty(row.comparison_quantity),
        text(&row.reference_unit),
        text(&row.comparison_unit),
        text(&row.reference_description),
        text(&row.comparison_description),
    ]
}

fn status_fill(status: ReconStatus) -> u32 {
    match status {
        ReconStatus::Correct => CORRECT_GREEN,
        ReconStatus::Shortage => SHORTAGE_RED,
        ReconStatus::Surplus => SURPLUS_AMBER,
    }
}

// ---------------------------------------------------------------------------
// Workbook
// ---------------------------------------------------------------------------

/// Write the three-sheet reconciliation workbook.
///
/// `Issues` is always written, with headers only when every row is correct.
pub fn export_report(path: &Path, run: &ReconRun) -> Result<(), IoError> {
    build_report(run)
        .and_then(|mut wb| wb.save(path))
        .map_err(|e| IoError::write(path, e))?;
    log::info!("wrote report {} ({} rows)", path.display(), run.rows.len());
    Ok(())
}

fn build_report(run: &ReconRun) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let headers = row_headers(&run.meta);

    let summary = workbook.add_worksheet().set_name(SUMMARY_SHEET)?;
    write_summary_sheet(summary, &run.report, &run.meta)?;

    let issues = workbook.add_worksheet().set_name(ISSUES_SHEET)?;
    write_rows_sheet(issues, &headers, &run.issues())?;

    let all: Vec<&ReconRow> = run.rows.iter().collect();
    let all_data = workbook.add_worksheet().set_name(ALL_DATA_SHEET)?;
    write_rows_sheet(all_data, &headers, &all)?;

    Ok(workbook)
}

fn write_summary_sheet(ws: &mut Worksheet, report: &StatusReport, meta: &RunMeta) -> Result<(), XlsxError> {
    let header = header_format();
    let plain = Format::new();
    let bold = Format::new().set_bold();

    let pairs = report.as_pairs();
    let labels: Vec<String> = pairs.iter().map(|(l, _)| l.to_string()).collect();
    let mut widths = ColumnWidths::new(&labels);

    for (col, (label, value)) in pairs.iter().enumerate() {
        let col = col as u16;
        ws.write_string_with_format(0, col, *label, &header)?;
        match value.parse::<f64>() {
            Ok(n) => ws.write_number_with_format(1, col, n, &plain)?,
            Err(_) => ws.write_string_with_format(1, col, value, &plain)?,
        };
    }

    let details = [
        ("Reference", meta.reference_label.clone()),
        ("Comparison", meta.comparison_label.clone()),
        ("Quantity Tolerance", format!("{}%", meta.quantity_tolerance * 100.0)),
        ("Generated", meta.run_at.clone()),
    ];
    for (i, (label, value)) in details.iter().enumerate() {
        let row = 3 + i as u32;
        ws.write_string_with_format(row, 0, *label, &bold)?;
        ws.write_string_with_format(row, 1, value, &plain)?;
        widths.observe(0, label);
        widths.observe(1, value);
    }

    widths.apply(ws)?;
    Ok(())
}

fn write_rows_sheet(ws: &mut Worksheet, headers: &[String], rows: &[&ReconRow]) -> Result<(), XlsxError> {
    let header = header_format();
    for (col, h) in headers.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, h, &header)?;
    }

    let fills = [
        (ReconStatus::Correct, fill_format(status_fill(ReconStatus::Correct))),
        (ReconStatus::Shortage, fill_format(status_fill(ReconStatus::Shortage))),
        (ReconStatus::Surplus, fill_format(status_fill(ReconStatus::Surplus))),
    ];

    let mut widths = ColumnWidths::new(headers);
    for (i, row) in rows.iter().enumerate() {
        let r = i as u32 + 1;
        let format = fills
            .iter()
            .find(|(s, _)| *s == row.status)
            .map(|(_, f)| f)
            .unwrap_or(&header);

        for (col, cell) in row_cells(row).iter().enumerate() {
            let c = col as u16;
            match cell {
                Cell::Text(s) => ws.write_string_with_format(r, c, *s, format)?,
                Cell::Number(n) => ws.write_number_with_format(r, c, *n, format)?,
                Cell::Blank => ws.write_blank(r, c, format)?,
            };
            widths.observe(col, &cell.display());
        }
    }

    ws.set_freeze_panes(1, 0)?;
    if !rows.is_empty() {
        ws.autofilter(0, 0, rows.len() as u32, headers.len() as u16 - 1)?;
    }
    widths.apply(ws)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Write rows (typically the issues subset) as CSV with the export headers.
pub fn write_rows_csv(path: &Path, meta: &RunMeta, rows: &[&ReconRow]) -> Result<(), IoError> {
    let mut writer = csv::Writer::from_path(path).map_err(|e| IoError::write(path, e))?;
    writer
        .write_record(row_headers(meta))
        .map_err(|e| IoError::write(path, e))?;
    for row in rows {
        let record: Vec<String> = row_cells(row).iter().map(Cell::display).collect();
        writer.write_record(&record).map_err(|e| IoError::write(path, e))?;
    }
    writer.flush().map_err(|e| IoError::write(path, e))?;
    Ok(())
}

/// Write the status report as a one-row CSV.
pub fn write_summary_csv(path: &Path, report: &StatusReport) -> Result<(), IoError> {
    let pairs = report.as_pairs();
    let mut writer = csv::Writer::from_path(path).map_err(|e| IoError::write(path, e))?;
    writer
        .write_record(pairs.iter().map(|(label, _)| *label))
        .map_err(|e| IoError::write(path, e))?;
    writer
        .write_record(pairs.iter().map(|(_, value)| value.as_str()))
        .map_err(|e| IoError::write(path, e))?;
    writer.flush().map_err(|e| IoError::write(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bomrecon_recon::config::ReconConfig;
    use bomrecon_recon::engine::run;
    use bomrecon_recon::model::RawDataset;
    use calamine::{open_workbook_auto, Data, Reader};
    use tempfile::tempdir;

    fn dataset(part_col: &str, qty_col: &str, rows: &[(&str, &str)]) -> RawDataset {
        RawDataset::new(
            vec![part_col.into(), qty_col.into(), "Description".into()],
            rows.iter()
                .map(|(p, q)| vec![CellValue::text(*p), CellValue::text(*q), CellValue::text("Bolt")])
                .collect(),
        )
        .unwrap()
    }

    fn sample_run() -> ReconRun {
        run(
            &dataset("Component number", "Component quantity", &[("P1", "10"), ("P2", "100"), ("P3", "4")]),
            &dataset("ERP Part Number", "Quantity", &[("P1", "10"), ("P2", "95"), ("P4", "2")]),
            &ReconConfig::default(),
        )
        .unwrap()
    }

    fn read_sheet(path: &Path, name: &str) -> Vec<Vec<Data>> {
        let mut wb = open_workbook_auto(path).unwrap();
        let range = wb.worksheet_range(name).unwrap();
        range.rows().map(|r| r.to_vec()).collect()
    }

    fn as_string(d: &Data) -> String {
        match d {
            Data::String(s) => s.clone(),
            Data::Float(f) => CellValue::Number(*f).to_string(),
            Data::Int(i) => i.to_string(),
            _ => String::new(),
        }
    }

    #[test]
    fn issues_sheet_round_trips_to_issue_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        let result = sample_run();
        export_report(&path, &result).unwrap();

        let rows = read_sheet(&path, ISSUES_SHEET);
        assert_eq!(rows[0].iter().map(as_string).collect::<Vec<_>>(), row_headers(&result.meta));

        let parts: Vec<String> = rows[1..].iter().map(|r| as_string(&r[0])).collect();
        let expected: Vec<String> = result.issues().iter().map(|r| r.part_number.clone()).collect();
        assert_eq!(parts, expected);
        assert_eq!(parts, vec!["P2", "P3", "P4"]);

        for r in &rows[1..] {
            assert_ne!(as_string(&r[1]), "Correct");
        }
    }

    #[test]
    fn all_data_sheet_has_every_row_and_blank_absent_quantities() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        let result = sample_run();
        export_report(&path, &result).unwrap();

        let rows = read_sheet(&path, ALL_DATA_SHEET);
        assert_eq!(rows.len(), result.rows.len() + 1);
        // P4 never appeared in the reference
        let p4 = rows.iter().find(|r| as_string(&r[0]) == "P4").unwrap();
        assert!(matches!(p4[3], Data::Empty));
        assert_eq!(p4[4], Data::Float(2.0));
        assert_eq!(as_string(&p4[1]), "Surplus");
    }

    #[test]
    fn summary_sheet_holds_counts() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.xlsx");
        export_report(&path, &sample_run()).unwrap();

        let rows = read_sheet(&path, SUMMARY_SHEET);
        assert_eq!(as_string(&rows[0][0]), "Total Parts");
        assert_eq!(rows[1][0], Data::Float(4.0));
        assert_eq!(as_string(&rows[0][2]), "Shortages (-)");
        assert_eq!(rows[1][2], Data::Float(2.0));
    }

    #[test]
    fn issues_sheet_present_without_issues() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("clean.xlsx");
        let mut result = sample_run();
        result.rows.retain(|r| !r.status.is_issue());
        export_report(&path, &result).unwrap();

        let rows = read_sheet(&path, ISSUES_SHEET);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn csv_exports() {
        let dir = tempdir().unwrap();
        let result = sample_run();

        let issues_path = dir.path().join("issues.csv");
        write_rows_csv(&issues_path, &result.meta, &result.issues()).unwrap();
        let mut reader = csv::Reader::from_path(&issues_path).unwrap();
        assert_eq!(reader.headers().unwrap().get(3), Some("SAP Quantity"));
        let records: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].get(0), Some("P2"));
        assert_eq!(records[0].get(2), Some("Missing 5 in HPLM"));
        assert_eq!(records[2].get(3), Some(""));

        let summary_path = dir.path().join("summary.csv");
        write_summary_csv(&summary_path, &result.report).unwrap();
        let mut reader = csv::Reader::from_path(&summary_path).unwrap();
        assert_eq!(reader.headers().unwrap().get(0), Some("Total Parts"));
        let values = reader.records().next().unwrap().unwrap();
        assert_eq!(values.get(0), Some("4"));
        assert_eq!(values.get(6), Some("75.00"));
    }

    #[test]
    fn unwritable_path_is_export_error() {
        let err = export_report(Path::new("/nonexistent/dir/report.xlsx"), &sample_run()).unwrap_err();
        assert!(err.is_export_error());
    }
}
