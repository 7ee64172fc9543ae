//! Declarative field mapping for output records
//!
//! This module provides:
//! - `table`: Mapping table rows (what the mapping sheets contain)
//! - `display`: Display types and the category-status table
//! - `derived`: Title, display name and location rules per output target
//! - `engine`: Apply a table to person records
//!
//! ## Usage Flow
//!
//! ```text
//! Mapping sheet rows → MappingTable ─┐
//! CategoryStatus rows ───────────────┼→ FieldMappingEngine → person_to_map → OutputRecord
//! OutputProfile (DRUPAL / ALL_STAFF_LIST) ┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use staffdir::transform::mapping::{FieldMappingEngine, OutputProfile};
//!
//! let engine = FieldMappingEngine::from_rows(&mapping_rows, &category_rows, OutputProfile::DRUPAL)?;
//! for person in &persons {
//!     let record = engine.person_to_map(person);
//!     println!("{}: {:?}", person.uid(), record.get("title"));
//! }
//! ```

pub mod derived;
pub mod display;
pub mod engine;
pub mod table;

// Re-exports for convenience
pub use derived::{DisplayNameStyle, OutputProfile, TitleFallback};
pub use display::{display_value, format_phone_number, CategoryStatusTable, DisplayType};
pub use engine::{FieldMappingEngine, OutputRecord};
pub use table::{FieldMapping, MappingTable};
