//! End-to-end commands.
//!
//! The workflow runs in two stages so the slow directory query is done
//! once and the outputs can be regenerated from a saved persons file:
//!
//! ```text
//! retrieve:   Organization + Staff sheets ─┐
//!             directory export ────────────┴─▶ build_persons ─▶ persons.json
//!
//! drupal:          persons.json + "Drupal Mapping"          ─▶ drupal.json
//! all-staff-list:  persons.json + "All Staff List Mapping"  ─▶ list.xlsx
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use staffdir::{config::Config, transform::pipeline};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("staffdir.properties"))?;
//!     pipeline::retrieve(&config, Path::new("persons.json")).await?;
//!     pipeline::generate_drupal(&config, Path::new("persons.json"), Path::new("drupal.json")).await?;
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use super::mapping::{FieldMappingEngine, OutputProfile};
use crate::config::Config;
use crate::directory::Directory;
use crate::error::{ModelResult, PipelineResult};
use crate::models::{read_persons, sort_persons, source, write_persons, FieldMap, Person, Sources};
use crate::organization::{self, Organizations};
use crate::render::{self, ExcelOptions};
use crate::sheets::{names, Row, SheetSource};

/// Staff sheet column holding the person's uid.
pub const DIRECTORY_ID: &str = "Directory ID";

// =============================================================================
// Person assembly
// =============================================================================

/// Index Staff sheet rows by "Directory ID", trimming every value.
///
/// Rows without an id are skipped; a repeated id keeps the last row.
pub fn index_staff(rows: &[Row]) -> BTreeMap<String, Row> {
    let mut staff = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        let trimmed: Row = row
            .iter()
            .map(|(k, v)| (k.clone(), v.trim().to_string()))
            .collect();

        let uid = trimmed.get(DIRECTORY_ID).cloned().unwrap_or_default();
        if uid.is_empty() {
            warn!(row = i + 2, "Staff row has no Directory ID, skipping");
            continue;
        }
        if staff.insert(uid.clone(), trimmed).is_some() {
            warn!(uid = %uid, "Duplicate Directory ID in Staff sheet, last row wins");
        }
    }
    staff
}

fn to_fields(row: &Row) -> FieldMap {
    row.iter()
        .map(|(k, v)| (k.clone(), Some(v.clone())))
        .collect()
}

/// Join the Staff rows with the organization hierarchy and the directory.
///
/// People missing from the directory are skipped. The result is sorted
/// by last name, then first name.
pub fn build_persons(
    organizations: &Organizations,
    staff: &BTreeMap<String, Row>,
    directory: &Directory,
) -> ModelResult<Vec<Person>> {
    let mut persons = Vec::with_capacity(staff.len());

    for (uid, row) in staff {
        let Some(entry) = directory.get(uid) else {
            warn!(uid = %uid, "Not found in directory, skipping");
            continue;
        };

        let mut sources = Sources::new();
        sources.insert(source::STAFF.to_string(), to_fields(row));

        let cost_center = row
            .get(organization::fields::COST_CENTER)
            .map(String::as_str)
            .unwrap_or("");
        match organizations.get(cost_center) {
            Some(org) => {
                sources.insert(source::ORGANIZATION.to_string(), to_fields(org));
            }
            None => debug!(uid = %uid, cost_center, "No organization entry for cost center"),
        }

        sources.insert(source::LDAP.to_string(), entry.attributes());
        sources.insert(source::GROUPER.to_string(), entry.membership_info().to_fields());

        persons.push(Person::new(uid.as_str(), sources)?);
    }

    sort_persons(&mut persons);
    Ok(persons)
}

// =============================================================================
// Commands
// =============================================================================

/// Fetch every source and write the assembled persons file.
///
/// Returns the number of persons written.
pub async fn retrieve(config: &Config, output: &Path) -> PipelineResult<usize> {
    let sheets = config.sheets.source();

    let organization_rows = sheets.rows(names::ORGANIZATION).await?;
    let organizations = Organizations::from_rows(&organization_rows)?;
    info!(cost_centers = organizations.len(), "Loaded organization hierarchy");

    let staff_rows = sheets.rows(names::STAFF).await?;
    let staff = index_staff(&staff_rows);
    info!(staff = staff.len(), "Loaded staff sheet");

    let directory = Directory::load(config.require_directory_export()?)?;
    info!(entries = directory.len(), "Loaded directory export");

    let persons = build_persons(&organizations, &staff, &directory)?;
    write_persons(output, &persons)?;
    info!(path = %output.display(), persons = persons.len(), "Wrote persons file");

    Ok(persons.len())
}

/// Load a mapping sheet and the category-status table into an engine.
pub async fn load_engine(
    sheets: &SheetSource,
    mapping_sheet: &str,
    profile: OutputProfile,
) -> PipelineResult<FieldMappingEngine> {
    let mapping_rows = sheets.rows(mapping_sheet).await?;
    let category_rows = sheets.rows(names::CATEGORY_STATUS).await?;
    Ok(FieldMappingEngine::from_rows(&mapping_rows, &category_rows, profile)?)
}

/// Persons file to CMS JSON feed.
pub async fn generate_drupal(config: &Config, input: &Path, output: &Path) -> PipelineResult<usize> {
    let persons = read_persons(input)?;
    let engine = load_engine(&config.sheets.source(), names::DRUPAL_MAPPING, OutputProfile::DRUPAL).await?;

    let records = engine.persons_to_maps(&persons);
    render::write_json(output, &records)?;
    Ok(records.len())
}

/// Persons file to the "All Staff List" workbook.
pub async fn generate_all_staff_list(
    config: &Config,
    input: &Path,
    output: &Path,
    options: &ExcelOptions,
) -> PipelineResult<usize> {
    let persons = read_persons(input)?;
    let engine = load_engine(
        &config.sheets.source(),
        names::ALL_STAFF_LIST_MAPPING,
        OutputProfile::ALL_STAFF_LIST,
    )
    .await?;

    let records = engine.persons_to_maps(&persons);
    render::write_xlsx(output, &engine, &records, options)?;
    Ok(records.len())
}
