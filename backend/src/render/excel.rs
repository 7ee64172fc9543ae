//! "All Staff List" workbook.
//!
//! One header row (the mapping table's destination fields, in order) and
//! one row per person. Columns with the Percentage display type are
//! written as numbers with a percent format; everything else is text.

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};
use std::path::Path;
use tracing::{info, warn};

use crate::error::RenderResult;
use crate::transform::{DisplayType, FieldMappingEngine, OutputRecord};

pub const SHEET_NAME: &str = "All Staff List";

const PERCENT_FORMAT: &str = "0.00%";

/// Sheet protection and filtering.
#[derive(Debug, Clone, Default)]
pub struct ExcelOptions {
    /// Protect the sheet with this password
    pub password: Option<String>,

    /// Add an autofilter on the header row
    pub autofilter: bool,
}

struct Formats {
    header: Format,
    percent: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_background_color(Color::RGB(0xC0C0C0))
                .set_align(FormatAlign::Center),
            percent: Format::new().set_num_format(PERCENT_FORMAT),
        }
    }
}

/// `"12.5"` -> `0.125`. `None` when the value is not a finite number.
pub fn percentage_fraction(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v / 100.0)
}

/// What goes into one data cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellValue<'a> {
    Text(&'a str),
    /// Fraction written with the percent format
    Percent(f64),
    /// Percentage column holding something other than a number
    Blank,
}

impl<'a> CellValue<'a> {
    pub fn new(value: &'a str, percentage: bool) -> Self {
        if !percentage {
            return CellValue::Text(value);
        }
        percentage_fraction(value).map_or(CellValue::Blank, CellValue::Percent)
    }
}

/// Build the workbook in memory.
pub fn build_workbook(
    engine: &FieldMappingEngine,
    records: &[(String, OutputRecord)],
    options: &ExcelOptions,
) -> RenderResult<Workbook> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let formats = Formats::new();
    let columns = engine.columns();

    for (col, column) in columns.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, column, &formats.header)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    for (i, (uid, record)) in records.iter().enumerate() {
        let row = (i + 1) as u32;
        for (col, column) in columns.iter().enumerate() {
            let Some(value) = record.get(column) else {
                continue;
            };
            let percentage = matches!(engine.display_type(column), Some(DisplayType::Percentage));
            write_cell(sheet, row, col as u16, uid, column, value, percentage, &formats)?;
        }
    }

    if options.autofilter && !columns.is_empty() {
        sheet.autofilter(0, 0, records.len() as u32, (columns.len() - 1) as u16)?;
    }
    if let Some(password) = &options.password {
        sheet.protect_with_password(password);
    }
    sheet.autofit();

    Ok(workbook)
}

#[allow(clippy::too_many_arguments)]
fn write_cell(
    sheet: &mut Worksheet,
    row: u32,
    col: u16,
    uid: &str,
    column: &str,
    value: &str,
    percentage: bool,
    formats: &Formats,
) -> RenderResult<()> {
    match CellValue::new(value, percentage) {
        CellValue::Text(text) => {
            sheet.write_string(row, col, text)?;
        }
        CellValue::Percent(fraction) => {
            sheet.write_number_with_format(row, col, fraction, &formats.percent)?;
        }
        CellValue::Blank => warn!(
            uid = %uid,
            field = %column,
            value = %value,
            "Percentage is not a number, leaving cell blank"
        ),
    }
    Ok(())
}

/// Render the workbook to xlsx bytes.
pub fn render_xlsx(
    engine: &FieldMappingEngine,
    records: &[(String, OutputRecord)],
    options: &ExcelOptions,
) -> RenderResult<Vec<u8>> {
    let mut workbook = build_workbook(engine, records, options)?;
    Ok(workbook.save_to_buffer()?)
}

pub fn write_xlsx(
    path: &Path,
    engine: &FieldMappingEngine,
    records: &[(String, OutputRecord)],
    options: &ExcelOptions,
) -> RenderResult<()> {
    let mut workbook = build_workbook(engine, records, options)?;
    workbook.save(path)?;
    info!(path = %path.display(), persons = records.len(), "Wrote spreadsheet");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::Row;
    use crate::transform::OutputProfile;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn engine() -> FieldMappingEngine {
        let mapping = |dest: &str, source: &str, field: &str, display: &str| {
            row(&[
                ("Destination Field", dest),
                ("Source", source),
                ("Source Field", field),
                ("Display Type", display),
            ])
        };
        FieldMappingEngine::from_rows(
            &[
                mapping("LastName", "LDAP", "sn", "Text"),
                mapping("Appy Fte", "Grouper", "FTE", "Percentage"),
                mapping("Expr1", "Derived", "", ""),
            ],
            &[],
            OutputProfile::ALL_STAFF_LIST,
        )
        .unwrap()
    }

    fn records() -> Vec<(String, OutputRecord)> {
        let record = |pairs: &[(&str, &str)]| -> OutputRecord {
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()
        };
        vec![
            (
                "tp1".to_string(),
                record(&[("LastName", "Person1"), ("Appy Fte", "50.00"), ("Expr1", "T P <t@x>")]),
            ),
            (
                "tp2".to_string(),
                record(&[("LastName", "Person2"), ("Appy Fte", "half")]),
            ),
        ]
    }

    #[test]
    fn test_percentage_fraction() {
        assert_eq!(percentage_fraction("100"), Some(1.0));
        assert_eq!(percentage_fraction("12.5"), Some(0.125));
        assert_eq!(percentage_fraction(" 50.00 "), Some(0.5));
        assert_eq!(percentage_fraction("ABC"), None);
        assert_eq!(percentage_fraction(""), None);
        assert_eq!(percentage_fraction("NaN"), None);
        assert_eq!(percentage_fraction("inf"), None);
        assert_eq!(percentage_fraction("-infinity"), None);
    }

    #[test]
    fn test_cell_value() {
        assert_eq!(CellValue::new("50.00", true), CellValue::Percent(0.5));
        assert_eq!(CellValue::new("half", true), CellValue::Blank);
        assert_eq!(CellValue::new("NaN", true), CellValue::Blank);
        assert_eq!(CellValue::new("", true), CellValue::Blank);
        assert_eq!(CellValue::new("half", false), CellValue::Text("half"));
        assert_eq!(CellValue::new("50.00", false), CellValue::Text("50.00"));
    }

    #[test]
    fn test_render_xlsx_with_bad_percentage() {
        let engine = engine();
        let records = records();
        let percentage = matches!(engine.display_type("Appy Fte"), Some(DisplayType::Percentage));
        assert!(percentage);
        let cells: Vec<CellValue> = records
            .iter()
            .map(|(_, record)| CellValue::new(record["Appy Fte"].as_str(), percentage))
            .collect();
        assert_eq!(cells, vec![CellValue::Percent(0.5), CellValue::Blank]);

        let options = ExcelOptions {
            password: Some("secret".into()),
            autofilter: true,
        };
        let bytes = render_xlsx(&engine, &records, &options).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_render_xlsx_no_records() {
        let bytes = render_xlsx(&engine(), &[], &ExcelOptions::default()).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_write_xlsx() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all-staff-list.xlsx");
        write_xlsx(&path, &engine(), &records(), &ExcelOptions::default()).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }
}
