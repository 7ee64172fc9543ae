//! Field-mapping engine: person records to flat output records
//!
//! For every mapping that is not "Derived", the engine looks the value up
//! with [`Person::get_allow_null`], formats it by display type and stores
//! it under the destination field. Null values leave the key out. The
//! derived fields of the output profile are then set on top.

use std::collections::BTreeMap;
use tracing::debug;

use super::derived::OutputProfile;
use super::display::{display_value, CategoryStatusTable, DisplayType};
use super::table::MappingTable;
use crate::error::MappingResult;
use crate::models::Person;
use crate::sheets::Row;

/// Destination field to display string.
pub type OutputRecord = BTreeMap<String, String>;

/// Lookup tables and rules for one output target, fixed at construction.
#[derive(Debug, Clone)]
pub struct FieldMappingEngine {
    table: MappingTable,
    categories: CategoryStatusTable,
    profile: OutputProfile,
}

impl FieldMappingEngine {
    pub fn new(table: MappingTable, categories: CategoryStatusTable, profile: OutputProfile) -> Self {
        Self {
            table,
            categories,
            profile,
        }
    }

    /// Build from the raw mapping and "CategoryStatus" sheet rows.
    pub fn from_rows(
        mapping_rows: &[Row],
        category_rows: &[Row],
        profile: OutputProfile,
    ) -> MappingResult<Self> {
        let table = MappingTable::from_rows(mapping_rows)?;
        let categories = CategoryStatusTable::from_rows(category_rows);
        debug!(
            mappings = table.len(),
            categories = categories.len(),
            "Built field mapping engine"
        );
        Ok(Self::new(table, categories, profile))
    }

    /// Output columns in mapping-table order.
    pub fn columns(&self) -> &[String] {
        self.table.columns()
    }

    /// Display type of a destination field, if it has one.
    pub fn display_type(&self, destination_field: &str) -> Option<&DisplayType> {
        self.table
            .get(destination_field)
            .and_then(|m| m.display_type.as_ref())
    }

    /// Format `value` as the display type would.
    pub fn display_value(&self, display_type: Option<&DisplayType>, value: Option<&str>) -> Option<String> {
        display_value(display_type, value, &self.categories)
    }

    /// Flatten one person into an output record.
    pub fn person_to_map(&self, person: &Person) -> OutputRecord {
        let mut record = OutputRecord::new();

        for mapping in self.table.iter().filter(|m| !m.is_derived()) {
            let value = person.get_allow_null(&mapping.source, &mapping.source_field);
            if value.is_none() {
                continue;
            }
            if let Some(display) = self.display_value(mapping.display_type.as_ref(), value) {
                record.insert(mapping.destination_field.clone(), display);
            }
        }

        for (field, value) in self.profile.derive(person) {
            record.insert(field.to_string(), value);
        }

        record
    }

    /// Flatten every person, keeping their order.
    pub fn persons_to_maps(&self, persons: &[Person]) -> Vec<(String, OutputRecord)> {
        persons
            .iter()
            .map(|p| (p.uid().to_string(), self.person_to_map(p)))
            .collect()
    }
}
