//! Spreadsheet retrieval.
//!
//! Every sheet of the configuration workbook is consumed as a list of
//! [`Row`]s: the first row is the header row and supplies the keys.
//!
//! ```text
//! ┌──────────────────┐
//! │ Sheets values API│──┐
//! └──────────────────┘  │    ┌─────────────┐
//!                       ├───▶│  Vec<Row>   │
//! ┌──────────────────┐  │    └─────────────┘
//! │ <dir>/<Name>.csv │──┘
//! └──────────────────┘
//! ```

pub mod google;

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{SheetError, SheetResult};
use crate::parser::{self, ParseError};

pub use google::GoogleSheets;

/// One spreadsheet row keyed by column header.
pub type Row = BTreeMap<String, String>;

/// Sheet names in the configuration workbook.
pub mod names {
    pub const ORGANIZATION: &str = "Organization";
    pub const STAFF: &str = "Staff";
    pub const DRUPAL_MAPPING: &str = "Drupal Mapping";
    pub const ALL_STAFF_LIST_MAPPING: &str = "All Staff List Mapping";
    pub const CATEGORY_STATUS: &str = "CategoryStatus";
}

/// A block of cells as returned by the sheets values API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<String>>,
}

/// Convert a value range into header-keyed rows.
///
/// A missing or empty range yields no rows. Cells missing from a short row
/// are absent from its map.
pub fn value_range_to_rows(range: Option<&ValueRange>) -> Vec<Row> {
    let Some(range) = range else {
        return Vec::new();
    };
    let Some((header, body)) = range.values.split_first() else {
        return Vec::new();
    };

    body.iter()
        .map(|cells| {
            header
                .iter()
                .zip(cells.iter())
                .map(|(h, c)| (h.clone(), c.clone()))
                .collect()
        })
        .collect()
}

// =============================================================================
// CSV exports
// =============================================================================

/// A directory of sheet exports named `<Sheet Name>.csv`.
#[derive(Debug, Clone)]
pub struct SheetExport {
    dir: PathBuf,
}

impl SheetExport {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{sheet}.csv"))
    }

    /// Read and parse one exported sheet.
    pub fn rows(&self, sheet: &str) -> SheetResult<Vec<Row>> {
        let path = self.path_for(sheet);
        read_csv_sheet(&path, sheet)
    }
}

fn read_csv_sheet(path: &Path, sheet: &str) -> SheetResult<Vec<Row>> {
    let bytes = std::fs::read(path).map_err(|source| SheetError::Io {
        sheet: sheet.to_string(),
        source,
    })?;

    let result = parser::parse_bytes_auto(&bytes).map_err(|e| match e {
        ParseError::Encoding(encoding) => SheetError::Encoding {
            sheet: sheet.to_string(),
            encoding,
        },
        ParseError::Csv(source) => SheetError::Csv {
            sheet: sheet.to_string(),
            source,
        },
    })?;

    debug!(
        sheet,
        encoding = %result.encoding,
        delimiter = ?result.delimiter,
        rows = result.rows.len(),
        "Parsed sheet export"
    );
    Ok(result.rows)
}

// =============================================================================
// Source dispatch
// =============================================================================

/// Where the configuration workbook is read from.
#[derive(Debug, Clone)]
pub enum SheetSource {
    Google(GoogleSheets),
    Export(SheetExport),
}

impl SheetSource {
    /// Rows of the named sheet.
    pub async fn rows(&self, sheet: &str) -> SheetResult<Vec<Row>> {
        match self {
            SheetSource::Google(client) => client.rows(sheet).await,
            SheetSource::Export(export) => export.rows(sheet),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(values: &[&[&str]]) -> ValueRange {
        ValueRange {
            values: values
                .iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect())
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_range_is_empty() {
        assert!(value_range_to_rows(None).is_empty());
        assert!(value_range_to_rows(Some(&ValueRange::default())).is_empty());
    }

    #[test]
    fn test_header_only_range_is_empty() {
        let r = range(&[&["Cost Center", "Division"]]);
        assert!(value_range_to_rows(Some(&r)).is_empty());
    }

    #[test]
    fn test_rows_keyed_by_header() {
        let r = range(&[
            &["Cost Center", "Division Code", "Division", "Department", "Unit", "Location"],
            &["030000", "DO", "Dean's Office", "", "", "Dean's Office"],
            &["032200", "", "", "Communications"],
        ]);
        let rows = value_range_to_rows(Some(&r));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["Division"], "Dean's Office");
        assert_eq!(rows[0]["Unit"], "");
        assert_eq!(rows[1]["Department"], "Communications");
        assert!(!rows[1].contains_key("Unit"));
        assert!(!rows[1].contains_key("Location"));
    }

    #[test]
    fn test_value_range_deserialize() {
        let json = r#"{
            "range": "Staff!A1:Z1000",
            "majorDimension": "ROWS",
            "values": [["Directory ID", "Cost Center"], ["jdoe", "044100"]]
        }"#;
        let r: ValueRange = serde_json::from_str(json).unwrap();
        assert_eq!(r.major_dimension.as_deref(), Some("ROWS"));

        let rows = value_range_to_rows(Some(&r));
        assert_eq!(rows[0]["Cost Center"], "044100");
    }

    #[test]
    fn test_value_range_without_values() {
        let r: ValueRange = serde_json::from_str(r#"{"range": "Empty!A1:Z1000"}"#).unwrap();
        assert!(value_range_to_rows(Some(&r)).is_empty());
    }

    #[test]
    fn test_export_reads_named_csv() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("CategoryStatus.csv"),
            "Abbreviation,Full Text\nAbbr1,Abbreviation 1\nAbbr2,Abbreviation 2\n",
        )
        .unwrap();

        let export = SheetExport::new(dir.path());
        let rows = export.rows(names::CATEGORY_STATUS).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1]["Full Text"], "Abbreviation 2");
    }

    #[test]
    fn test_export_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let export = SheetExport::new(dir.path());
        let err = export.rows(names::STAFF).unwrap_err();
        assert!(matches!(err, SheetError::Io { ref sheet, .. } if sheet == "Staff"));
    }
}
