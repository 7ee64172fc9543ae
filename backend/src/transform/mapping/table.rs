//! Field-mapping table definition
//!
//! Each row of a mapping sheet says where one output field comes from:
//!
//! | Destination Field | Source  | Source Field | Display Type |
//! |-------------------|---------|--------------|--------------|
//! | last_name         | LDAP    | sn           | Text         |
//! | phone             | LDAP    | telephoneNumber | PhoneNumber |
//! | title             | Derived |              |              |

use std::collections::HashMap;
use tracing::warn;

use super::display::DisplayType;
use crate::error::{MappingError, MappingResult};
use crate::models::source;
use crate::sheets::Row;

/// Column names of a mapping sheet.
pub mod columns {
    pub const DESTINATION_FIELD: &str = "Destination Field";
    pub const SOURCE: &str = "Source";
    pub const SOURCE_FIELD: &str = "Source Field";
    pub const DISPLAY_TYPE: &str = "Display Type";
}

/// Mapping rule for a single output field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMapping {
    /// Output key or column header
    pub destination_field: String,

    /// Person source name, or "Derived"
    pub source: String,

    /// Field within the source (unused for derived fields)
    pub source_field: String,

    /// Formatting applied to the value; `None` when the cell is blank
    pub display_type: Option<DisplayType>,
}

impl FieldMapping {
    /// Derived fields are computed by fixed rules, not looked up.
    pub fn is_derived(&self) -> bool {
        self.source == source::DERIVED
    }

    /// `None` (with a warning) when the row lacks a destination or source.
    fn from_row(row: &Row, index: usize) -> Option<Self> {
        let destination_field = cell(row, columns::DESTINATION_FIELD);
        if destination_field.is_empty() {
            warn!(row = index, "Mapping row has no destination field, skipping");
            return None;
        }
        let source = cell(row, columns::SOURCE);
        if source.is_empty() {
            warn!(row = index, field = %destination_field, "Mapping row has no source, skipping");
            return None;
        }

        let display_type = Some(cell(row, columns::DISPLAY_TYPE))
            .filter(|s| !s.is_empty())
            .map(|s| DisplayType::parse(&s));

        Some(Self {
            destination_field,
            source,
            source_field: cell(row, columns::SOURCE_FIELD),
            display_type,
        })
    }
}

/// Trimmed cell value; an absent cell reads as empty.
fn cell(row: &Row, column: &str) -> String {
    row.get(column).map(|s| s.trim().to_string()).unwrap_or_default()
}

/// A sheet with rows must carry `column` in at least one of them.
fn require_column(rows: &[Row], column: &str) -> MappingResult<()> {
    if rows.is_empty() || rows.iter().any(|row| row.contains_key(column)) {
        Ok(())
    } else {
        Err(MappingError::MissingColumn {
            column: column.to_string(),
        })
    }
}

/// A complete mapping table, indexed by destination field.
///
/// Destination fields should be unique. When one repeats, the last mapping
/// wins but the column keeps its first position.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    /// Destination fields in first-occurrence order
    columns: Vec<String>,

    /// Destination field to its (last) mapping
    mappings: HashMap<String, FieldMapping>,
}

impl MappingTable {
    /// Build from the rows of a mapping sheet.
    ///
    /// Incomplete rows are skipped with a warning naming the sheet row
    /// (the header is row 1). A sheet without a "Destination Field" or
    /// "Source" column is an error.
    pub fn from_rows(rows: &[Row]) -> MappingResult<Self> {
        require_column(rows, columns::DESTINATION_FIELD)?;
        require_column(rows, columns::SOURCE)?;

        let mut table = Self::default();
        for (i, row) in rows.iter().enumerate() {
            if let Some(mapping) = FieldMapping::from_row(row, i + 2) {
                table.insert(mapping);
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, mapping: FieldMapping) {
        let field = mapping.destination_field.clone();
        if self.mappings.insert(field.clone(), mapping).is_some() {
            warn!(field = %field, "Duplicate destination field, last mapping wins");
        } else {
            self.columns.push(field);
        }
    }

    /// Destination fields in output column order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn get(&self, destination_field: &str) -> Option<&FieldMapping> {
        self.mappings.get(destination_field)
    }

    /// Mappings in output column order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldMapping> {
        self.columns.iter().filter_map(|c| self.mappings.get(c))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
