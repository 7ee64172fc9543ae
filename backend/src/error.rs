//! Error types for the staff directory pipeline.
//!
//! Each concern has its own error enum:
//!
//! - [`SheetError`] - spreadsheet retrieval (API or CSV exports)
//! - [`DirectoryError`] - directory export loading
//! - [`OrganizationError`] - cost-center hierarchy resolution
//! - [`ModelError`] - person records and the persons file
//! - [`MappingError`] - field-mapping table loading
//! - [`RenderError`] - JSON and spreadsheet output
//! - [`GrouperError`] - Grouper web services
//! - [`ConfigError`] - properties file loading
//! - [`PipelineError`] - top-level orchestration
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Per-record problems (a missing field, an unparseable membership string,
//! a non-numeric percentage) are logged and never surface here.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// Sheet Retrieval Errors
// =============================================================================

/// Errors while retrieving spreadsheet rows.
#[derive(Debug, Error)]
pub enum SheetError {
    /// Failed to read an exported sheet.
    #[error("Failed to read sheet '{sheet}': {source}")]
    Io {
        sheet: String,
        #[source]
        source: std::io::Error,
    },

    /// Exported sheet could not be decoded.
    #[error("Failed to decode sheet '{sheet}' as {encoding}")]
    Encoding { sheet: String, encoding: String },

    /// Invalid CSV content.
    #[error("Invalid CSV in sheet '{sheet}': {source}")]
    Csv {
        sheet: String,
        #[source]
        source: csv::Error,
    },

    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The sheets API answered with a non-success status.
    #[error("Sheets API returned {status} for '{sheet}': {body}")]
    Api {
        sheet: String,
        status: u16,
        body: String,
    },

    /// The API base URL cannot carry a sheet path.
    #[error("Invalid sheets API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

// =============================================================================
// Directory Errors
// =============================================================================

/// Errors while loading the directory export.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// Failed to read the export file.
    #[error("Failed to read directory export '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The export is not valid JSON of the expected shape.
    #[error("Invalid directory export: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Organization Errors
// =============================================================================

/// Errors while resolving the organization hierarchy.
///
/// These signal a data-integrity problem in the organization sheet and
/// abort the run.
#[derive(Debug, Error)]
pub enum OrganizationError {
    /// A cost center is not six ASCII digits.
    #[error("Invalid cost center '{0}': expected 6 digits")]
    InvalidCostCenter(String),

    /// The cost center has no row of its own.
    #[error("Unknown cost center '{0}'")]
    UnknownCostCenter(String),

    /// A division or department row referenced by a child is missing.
    #[error("Cost center '{cost_center}' references missing ancestor '{ancestor}'")]
    MissingAncestor {
        cost_center: String,
        ancestor: String,
    },
}

// =============================================================================
// Model Errors
// =============================================================================

/// Errors constructing or persisting person records.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A person must have a non-empty uid.
    #[error("Person uid is empty")]
    EmptyUid,

    /// Failed to read or write the persons file.
    #[error("Persons file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Persons JSON error.
    #[error("Persons JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Mapping Errors
// =============================================================================

/// Errors while loading a field-mapping table.
#[derive(Debug, Error)]
pub enum MappingError {
    /// The mapping sheet has rows but no such column at all.
    #[error("Mapping sheet has no '{column}' column")]
    MissingColumn { column: String },
}

// =============================================================================
// Grouper Errors
// =============================================================================

/// Errors talking to the Grouper web services.
#[derive(Debug, Error)]
pub enum GrouperError {
    /// `grouper.url` is not a usable base URL.
    #[error("Invalid Grouper URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Grouper answered with an error status and no results document.
    #[error("Grouper returned {status}: {body}")]
    Api { status: u16, body: String },

    /// Unexpected response body.
    #[error("Invalid Grouper response: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// Render Errors
// =============================================================================

/// Errors writing generated output.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Failed to write the output file.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Workbook error.
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while loading the properties file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The properties file could not be opened.
    #[error("Failed to open properties file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The properties file is malformed.
    #[error("Failed to parse properties file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: java_properties::PropertiesError,
    },

    /// A required key is missing.
    #[error("Missing required property '{0}'")]
    MissingKey(String),
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level pipeline errors.
///
/// This is the error type returned by the commands in
/// [`crate::transform::pipeline`]. Any of these aborts the run with a
/// non-zero exit status.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Sheet retrieval error.
    #[error("Sheet error: {0}")]
    Sheet(#[from] SheetError),

    /// Directory export error.
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),

    /// Organization hierarchy error.
    #[error("Organization error: {0}")]
    Organization(#[from] OrganizationError),

    /// Person model error.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Mapping table error.
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    /// Output error.
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Grouper error.
    #[error("Grouper error: {0}")]
    Grouper(#[from] GrouperError),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for sheet retrieval.
pub type SheetResult<T> = Result<T, SheetError>;

/// Result type for directory export loading.
pub type DirectoryResult<T> = Result<T, DirectoryError>;

/// Result type for organization hierarchy resolution.
pub type OrganizationResult<T> = Result<T, OrganizationError>;

/// Result type for person model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Result type for mapping table loading.
pub type MappingResult<T> = Result<T, MappingError>;

/// Result type for Grouper requests.
pub type GrouperResult<T> = Result<T, GrouperError>;

/// Result type for rendering.
pub type RenderResult<T> = Result<T, RenderError>;

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
