// Printable floor validation checklist

use std::path::Path;

use bomrecon_recon::model::{ReconRow, ReconRun};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};

use crate::error::IoError;
use crate::xlsx::{header_format, fill_format, INPUT_SHADE};

pub const CHECKLIST_SHEET: &str = "Floor Validation";
pub const INSTRUCTIONS_SHEET: &str = "Instructions";

const CHECKBOX: &str = "\u{2610}";
const TITLE_BLUE: u32 = 0x1E40AF;
const HEADER_ROW: u32 = 4;
/// A4 in the Excel paper size table.
const PAPER_A4: u8 = 9;

const INSTRUCTIONS: &[&str] = &[
    "1. Physically verify every part number listed.",
    "2. Write the quantity actually found in the \"Physical Count\" column.",
    "3. Note anything unusual (damage, wrong location, mislabeling) under \"Observations\".",
    "4. Tick the \"Validated\" box once the line has been checked.",
    "5. Sign and date the sheet when finished.",
];

/// One line of the checklist table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistLine {
    pub part_number: String,
    pub description: String,
    pub reference_quantity: Option<f64>,
    pub comparison_quantity: Option<f64>,
    pub unit: String,
}

/// Lines to validate on the floor, sorted by part number then unit.
/// Only shortages and surpluses unless `include_correct`.
pub fn checklist_lines(run: &ReconRun, include_correct: bool) -> Vec<ChecklistLine> {
    let mut rows: Vec<&ReconRow> = if include_correct {
        run.rows.iter().collect()
    } else {
        run.issues()
    };
    rows.sort_by(|a, b| (&a.part_number, &a.unit).cmp(&(&b.part_number, &b.unit)));

    rows.into_iter()
        .map(|r| ChecklistLine {
            part_number: r.part_number.clone(),
            description: r.display_description().unwrap_or_default().to_string(),
            reference_quantity: r.reference_quantity,
            comparison_quantity: r.comparison_quantity,
            unit: r.unit.clone(),
        })
        .collect()
}

/// Column headers of the checklist table.
pub fn checklist_headers(run: &ReconRun) -> Vec<String> {
    vec![
        "Validated".to_string(),
        "Part Number".to_string(),
        "Description".to_string(),
        format!("{} Quantity", run.meta.reference_label),
        format!("{} Quantity", run.meta.comparison_label),
        "Unit".to_string(),
        "Physical Count".to_string(),
        "Observations".to_string(),
    ]
}

/// Write the print-oriented checklist workbook.
pub fn export_checklist(path: &Path, run: &ReconRun, include_correct: bool) -> Result<(), IoError> {
    let lines = checklist_lines(run, include_correct);
    build_checklist(run, &lines)
        .and_then(|mut wb| wb.save(path))
        .map_err(|e| IoError::write(path, e))?;
    log::info!("wrote checklist {} ({} items)", path.display(), lines.len());
    Ok(())
}

fn build_checklist(run: &ReconRun, lines: &[ChecklistLine]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let headers = checklist_headers(run);
    let last_col = headers.len() as u16 - 1;

    let title = Format::new()
        .set_bold()
        .set_font_size(16)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_background_color(Color::RGB(TITLE_BLUE))
        .set_font_color(Color::White);
    let info = Format::new().set_bold().set_font_size(10);
    let header = header_format().set_font_size(10);
    let cell = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();
    let checkbox = Format::new()
        .set_border(FormatBorder::Thin)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_font_size(14);
    let input = fill_format(INPUT_SHADE).set_align(FormatAlign::VerticalCenter);
    let signature = Format::new()
        .set_border_top(FormatBorder::Thin)
        .set_align(FormatAlign::Center);

    let ws = workbook.add_worksheet().set_name(CHECKLIST_SHEET)?;
    ws.set_landscape();
    ws.set_paper_size(PAPER_A4);
    ws.set_print_fit_to_pages(1, 0);
    ws.set_margins(0.5, 0.5, 0.75, 0.75, 0.3, 0.3);
    ws.set_repeat_rows(HEADER_ROW, HEADER_ROW)?;

    ws.merge_range(
        0,
        0,
        0,
        last_col,
        &format!(
            "FLOOR VALIDATION CHECKLIST - BOM ({} vs {})",
            run.meta.reference_label, run.meta.comparison_label
        ),
        &title,
    )?;
    ws.set_row_height(0, 25)?;
    let generated = chrono::Local::now().format("%Y-%m-%d %H:%M");
    ws.write_string_with_format(1, 0, format!("Generated: {generated}"), &info)?;
    ws.write_string_with_format(2, 0, format!("Items to validate: {}", lines.len()), &info)?;

    for (col, h) in headers.iter().enumerate() {
        ws.write_string_with_format(HEADER_ROW, col as u16, h, &header)?;
    }
    ws.set_row_height(HEADER_ROW, 30)?;

    for (i, line) in lines.iter().enumerate() {
        let row = HEADER_ROW + 1 + i as u32;
        ws.write_string_with_format(row, 0, CHECKBOX, &checkbox)?;
        ws.write_string_with_format(row, 1, &line.part_number, &cell)?;
        ws.write_string_with_format(row, 2, &line.description, &cell)?;
        for (col, qty) in [(3u16, line.reference_quantity), (4, line.comparison_quantity)] {
            match qty {
                Some(q) => ws.write_number_with_format(row, col, q, &cell)?,
                None => ws.write_blank(row, col, &cell)?,
            };
        }
        ws.write_string_with_format(row, 5, &line.unit, &cell)?;
        ws.write_blank(row, 6, &input)?;
        ws.write_blank(row, 7, &input)?;
    }

    let widths = [10.0, 18.0, 45.0, 14.0, 14.0, 10.0, 16.0, 30.0];
    for (col, w) in widths.iter().enumerate() {
        ws.set_column_width(col as u16, *w)?;
    }

    let sign_row = HEADER_ROW + lines.len() as u32 + 4;
    ws.write_string_with_format(sign_row, 1, "Performed By", &signature)?;
    ws.write_string_with_format(sign_row, 4, "Reviewed By", &signature)?;
    ws.write_string_with_format(sign_row, 6, "Date", &signature)?;

    let instructions = workbook.add_worksheet().set_name(INSTRUCTIONS_SHEET)?;
    instructions.set_column_width(0, 80)?;
    instructions.write_string_with_format(0, 0, "INSTRUCTIONS", &title)?;
    for (i, text) in INSTRUCTIONS.iter().enumerate() {
        instructions.write_string(2 + i as u32, 0, *text)?;
    }

    Ok(workbook)
}
