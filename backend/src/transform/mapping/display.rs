//! Display types for mapped values
//!
//! A display type decides how a looked-up value is formatted before it is
//! rendered. Unknown display types are kept and pass values through
//! unchanged with a warning.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::sheets::Row;

/// `+<country> <area> <exchange> <line>`, any separators.
static PHONE_PATTERN: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"^.*(\+\w+)\W+(\w+)\W(\w+)\W(\w+).*$").ok());

/// Percentage assumed when no FTE value is present.
pub const FULL_PERCENTAGE: &str = "100";

/// All known display types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayType {
    /// Value unchanged
    Text,

    /// Abbreviation expanded through the category-status table
    CategoryStatus,

    /// Percentage; missing means 100
    Percentage,

    /// International number reduced to its national digits
    PhoneNumber,

    /// Any other name found in a mapping sheet
    Other(String),
}

impl DisplayType {
    pub fn parse(name: &str) -> Self {
        match name {
            "Text" => DisplayType::Text,
            "CategoryStatus" => DisplayType::CategoryStatus,
            "Percentage" => DisplayType::Percentage,
            "PhoneNumber" => DisplayType::PhoneNumber,
            other => DisplayType::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DisplayType::Text => "Text",
            DisplayType::CategoryStatus => "CategoryStatus",
            DisplayType::Percentage => "Percentage",
            DisplayType::PhoneNumber => "PhoneNumber",
            DisplayType::Other(name) => name.as_str(),
        }
    }

    /// Format a value. `None` stays `None` except for percentages.
    pub fn apply(&self, value: Option<&str>, categories: &CategoryStatusTable) -> Option<String> {
        match self {
            DisplayType::Text => value.map(str::to_string),
            DisplayType::CategoryStatus => value.map(|v| categories.expand(v).to_string()),
            DisplayType::Percentage => Some(value.unwrap_or(FULL_PERCENTAGE).to_string()),
            DisplayType::PhoneNumber => value.map(format_phone_number),
            DisplayType::Other(name) => {
                warn!(display_type = %name, value = ?value, "Unhandled display type, returning value unchanged");
                value.map(str::to_string)
            }
        }
    }
}

impl std::fmt::Display for DisplayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format `value` for `display_type`; a missing display type is logged and
/// passes the value through.
pub fn display_value(
    display_type: Option<&DisplayType>,
    value: Option<&str>,
    categories: &CategoryStatusTable,
) -> Option<String> {
    match display_type {
        Some(display_type) => display_type.apply(value, categories),
        None => {
            warn!(value = ?value, "Null display type, returning value unchanged");
            value.map(str::to_string)
        }
    }
}

/// `"+1 301 405 9195"` -> `"3014059195"`; anything else is unchanged.
pub fn format_phone_number(value: &str) -> String {
    let captures = PHONE_PATTERN.as_ref().and_then(|re| re.captures(value));
    match captures {
        Some(caps) => format!("{}{}{}", &caps[2], &caps[3], &caps[4]),
        None => value.to_string(),
    }
}

// =============================================================================
// Category status abbreviations
// =============================================================================

/// Column names of the "CategoryStatus" sheet.
pub mod columns {
    pub const ABBREVIATION: &str = "Abbreviation";
    pub const FULL_TEXT: &str = "Full Text";
}

/// Abbreviation to full text, built once per run.
#[derive(Debug, Clone, Default)]
pub struct CategoryStatusTable {
    entries: HashMap<String, String>,
}

impl CategoryStatusTable {
    /// Build from the "CategoryStatus" sheet; incomplete rows are skipped.
    pub fn from_rows(rows: &[Row]) -> Self {
        let mut entries = HashMap::new();
        for (i, row) in rows.iter().enumerate() {
            match (row.get(columns::ABBREVIATION), row.get(columns::FULL_TEXT)) {
                (Some(abbr), Some(full)) => {
                    entries.insert(abbr.clone(), full.clone());
                }
                _ => warn!(row = i + 2, "Incomplete category status row, skipping"),
            }
        }
        Self { entries }
    }

    /// Full text for `abbreviation`, or the abbreviation itself.
    pub fn expand<'a>(&'a self, abbreviation: &'a str) -> &'a str {
        self.entries
            .get(abbreviation)
            .map(String::as_str)
            .unwrap_or(abbreviation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for CategoryStatusTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> CategoryStatusTable {
        [("Abbr1", "Abbreviation 1"), ("Abbr2", "Abbreviation 2")]
            .into_iter()
            .map(|(a, f)| (a.to_string(), f.to_string()))
            .collect()
    }

    fn apply(display_type: &str, value: Option<&str>) -> Option<String> {
        DisplayType::parse(display_type).apply(value, &categories())
    }

    #[test]
    fn test_null_display_type() {
        let table = categories();
        assert_eq!(display_value(None, None, &table), None);
        assert_eq!(display_value(None, Some("Value"), &table).as_deref(), Some("Value"));
    }

    #[test]
    fn test_unknown_display_type_passthrough() {
        assert_eq!(apply("UNKNOWN_DISPLAY_TYPE", None), None);
        assert_eq!(apply("UNKNOWN_DISPLAY_TYPE", Some("")).as_deref(), Some(""));
        assert_eq!(apply("UNKNOWN_DISPLAY_TYPE", Some("Value")).as_deref(), Some("Value"));
    }

    #[test]
    fn test_text() {
        assert_eq!(apply("Text", None), None);
        assert_eq!(apply("Text", Some("")).as_deref(), Some(""));
        assert_eq!(apply("Text", Some("Value")).as_deref(), Some("Value"));
    }

    #[test]
    fn test_category_status() {
        assert_eq!(apply("CategoryStatus", Some("Abbr1")).as_deref(), Some("Abbreviation 1"));
        assert_eq!(apply("CategoryStatus", Some("Abbr2")).as_deref(), Some("Abbreviation 2"));
        assert_eq!(apply("CategoryStatus", Some("Abbr3")).as_deref(), Some("Abbr3"));
        assert_eq!(apply("CategoryStatus", Some("")).as_deref(), Some(""));
        assert_eq!(apply("CategoryStatus", None), None);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(apply("Percentage", None).as_deref(), Some("100"));
        assert_eq!(apply("Percentage", Some("1.23")).as_deref(), Some("1.23"));
        assert_eq!(apply("Percentage", Some("ABC")).as_deref(), Some("ABC"));
    }

    #[test]
    fn test_phone_number() {
        assert_eq!(apply("PhoneNumber", Some("+1 301 405 9195")).as_deref(), Some("3014059195"));
        assert_eq!(apply("PhoneNumber", Some("+1-301-405-9195")).as_deref(), Some("3014059195"));
        assert_eq!(apply("PhoneNumber", Some("Belmont 1234")).as_deref(), Some("Belmont 1234"));
        assert_eq!(apply("PhoneNumber", Some("")).as_deref(), Some(""));
        assert_eq!(apply("PhoneNumber", None), None);
    }

    #[test]
    fn test_display_type_names() {
        for name in ["Text", "CategoryStatus", "Percentage", "PhoneNumber", "Custom"] {
            assert_eq!(DisplayType::parse(name).as_str(), name);
        }
    }

    #[test]
    fn test_category_table_from_rows() {
        let rows: Vec<Row> = vec![
            [("Abbreviation", "Abbr1"), ("Full Text", "Abbreviation 1")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            [("Abbreviation", "Orphan")]
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ];
        let table = CategoryStatusTable::from_rows(&rows);
        assert_eq!(table.len(), 1);
        assert_eq!(table.expand("Abbr1"), "Abbreviation 1");
        assert_eq!(table.expand("Orphan"), "Orphan");
    }
}
