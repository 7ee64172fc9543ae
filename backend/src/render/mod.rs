//! Output renderers.
//!
//! Both renderers consume the `(uid, OutputRecord)` pairs produced by
//! [`FieldMappingEngine::persons_to_maps`](crate::transform::FieldMappingEngine::persons_to_maps).
//! A key missing from a record means a blank cell or an absent JSON
//! member, never an error.
//!
//! ```text
//! ┌───────────────────┐     ┌──────────────┐     drupal.json
//! │ Vec<(uid, record)>│──┬─▶│ json         │────▶ { uid: { field: value } }
//! └───────────────────┘  │  └──────────────┘
//!                        │  ┌──────────────┐     all-staff-list.xlsx
//!                        └─▶│ excel        │────▶ header + one row per person
//!                           └──────────────┘
//! ```

pub mod excel;
pub mod json;

pub use excel::{render_xlsx, write_xlsx, ExcelOptions, SHEET_NAME};
pub use json::{render_json, write_json};
