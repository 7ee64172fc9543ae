//! # Staffdir - library staff directory generation
//!
//! Staffdir joins the staff spreadsheet, the organization hierarchy and the
//! campus directory into one record per person, then renders those records
//! through a spreadsheet-driven field mapping.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Sheets    │────▶│ Organization │────▶│   Persons   │────▶│   Mapping   │
//! │ (API / CSV) │     │  + Staff     │     │ (per source)│     │   engine    │
//! └─────────────┘     └──────────────┘     └─────────────┘     └──────┬──────┘
//! ┌─────────────┐                                 ▲                   │
//! │  Directory  │─── attributes + memberships ────┘          JSON feed / xlsx
//! └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use staffdir::{Config, pipeline};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::load(Path::new("staffdir.properties")).unwrap();
//!     let count = pipeline::retrieve(&config, Path::new("persons.json")).await.unwrap();
//!     println!("Retrieved {} persons", count);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`logging`] - Tracing subscriber setup
//! - [`config`] - Properties-file configuration
//! - [`models`] - Person records and the persons file
//! - [`parser`] - CSV parsing with auto-detection
//! - [`sheets`] - Spreadsheet retrieval
//! - [`organization`] - Cost-center hierarchy
//! - [`directory`] - Directory export and membership decoding
//! - [`transform`] - Field mapping engine and pipeline
//! - [`render`] - JSON and xlsx output
//! - [`grouper`] - Grouper group membership maintenance

// Core modules
pub mod error;
pub mod logging;
pub mod config;
pub mod models;

// Inputs
pub mod parser;
pub mod sheets;
pub mod organization;
pub mod directory;

// Transformation
pub mod transform;

// Output
pub mod render;

// Group maintenance
pub mod grouper;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError,
    DirectoryError,
    GrouperError,
    MappingError,
    ModelError,
    OrganizationError,
    PipelineError,
    PipelineResult,
    RenderError,
    SheetError,
};

// =============================================================================
// Re-exports - Configuration & logging
// =============================================================================

pub use config::{Config, GrouperConfig, SheetsConfig};
pub use logging::{init_logging, LogConfig};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{read_persons, sort_persons, write_persons, FieldMap, Person, Sources};

// =============================================================================
// Re-exports - Sources
// =============================================================================

pub use directory::{Directory, DirectoryEntry, MembershipInfo};
pub use organization::{CostCenter, Organizations};
pub use sheets::{GoogleSheets, Row, SheetExport, SheetSource};

// =============================================================================
// Re-exports - Mapping
// =============================================================================

pub use transform::mapping::{
    CategoryStatusTable,
    DisplayType,
    FieldMapping,
    FieldMappingEngine,
    MappingTable,
    OutputProfile,
    OutputRecord,
    TitleFallback,
};

// =============================================================================
// Re-exports - Pipeline & rendering
// =============================================================================

pub use render::{render_json, render_xlsx, ExcelOptions};
pub use transform::pipeline;
pub use grouper::{DeleteMemberResults, GrouperClient};
