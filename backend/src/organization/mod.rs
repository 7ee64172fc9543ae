//! Organization hierarchy resolution.
//!
//! The "Organization" sheet lists one row per cost center, but only fills
//! in the fields that belong to that level. A cost center is six digits,
//! `[division:2][department:2][unit:2]`:
//!
//! ```text
//! 030000  DIVISION     Division Code, Division
//! 031800  DEPARTMENT   Department        (inherits from 030000)
//! 032211  UNIT         Unit              (inherits from 030000 and 032200)
//! ```
//!
//! Populating an entry copies "Division Code" and "Division" from the
//! division row and, for units, "Department" from the department row.
//! Location and Unit are never inherited.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{OrganizationError, OrganizationResult};
use crate::sheets::Row;

/// Column names of the "Organization" sheet.
pub mod fields {
    pub const COST_CENTER: &str = "Cost Center";
    pub const DIVISION_CODE: &str = "Division Code";
    pub const DIVISION: &str = "Division";
    pub const DEPARTMENT: &str = "Department";
    pub const UNIT: &str = "Unit";
    pub const LOCATION: &str = "Location";
}

/// One organization row, raw or populated.
pub type OrganizationEntry = Row;

// =============================================================================
// Cost centers
// =============================================================================

/// Level of a cost center in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Division,
    Department,
    Unit,
}

/// A validated six-digit cost center code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CostCenter(String);

impl CostCenter {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn division_code(&self) -> &str {
        &self.0[0..2]
    }

    pub fn department_code(&self) -> &str {
        &self.0[2..4]
    }

    pub fn unit_code(&self) -> &str {
        &self.0[4..6]
    }

    /// Classify by position: a non-zero unit code makes a unit, else a
    /// non-zero department code makes a department.
    pub fn kind(&self) -> Kind {
        if self.unit_code() != "00" {
            Kind::Unit
        } else if self.department_code() != "00" {
            Kind::Department
        } else {
            Kind::Division
        }
    }

    /// `cc[0:2] + "0000"`
    pub fn division_cost_center(&self) -> CostCenter {
        CostCenter(format!("{}0000", self.division_code()))
    }

    /// `cc[0:4] + "00"`
    pub fn department_cost_center(&self) -> CostCenter {
        CostCenter(format!("{}{}00", self.division_code(), self.department_code()))
    }
}

impl FromStr for CostCenter {
    type Err = OrganizationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() == 6 && code.bytes().all(|b| b.is_ascii_digit()) {
            Ok(CostCenter(code.to_string()))
        } else {
            Err(OrganizationError::InvalidCostCenter(s.to_string()))
        }
    }
}

impl fmt::Display for CostCenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Hierarchy
// =============================================================================

/// Index rows by cost center and populate every entry.
///
/// Rows with a blank cost center are skipped with a warning; on duplicate
/// cost centers the last row wins. A malformed code or a missing ancestor
/// row is an error.
pub fn build_map(
    rows: &[Row],
    cost_center_field: &str,
) -> OrganizationResult<BTreeMap<CostCenter, OrganizationEntry>> {
    let mut raw = BTreeMap::new();
    for (i, row) in rows.iter().enumerate() {
        let code = row.get(cost_center_field).map(|c| c.trim()).unwrap_or("");
        if code.is_empty() {
            warn!(row = i + 2, field = cost_center_field, "Organization row has no cost center, skipping");
            continue;
        }
        raw.insert(code.parse::<CostCenter>()?, row.clone());
    }

    let mut populated = BTreeMap::new();
    for cc in raw.keys() {
        populated.insert(cc.clone(), populate(cc, &raw)?);
    }
    Ok(populated)
}

/// The entry for `cost_center` with its ancestor fields filled in.
pub fn populate(
    cost_center: &CostCenter,
    map: &BTreeMap<CostCenter, OrganizationEntry>,
) -> OrganizationResult<OrganizationEntry> {
    let mut entry = map
        .get(cost_center)
        .cloned()
        .ok_or_else(|| OrganizationError::UnknownCostCenter(cost_center.to_string()))?;

    let kind = cost_center.kind();
    if kind == Kind::Division {
        return Ok(entry);
    }

    let division = ancestor(cost_center, &cost_center.division_cost_center(), map)?;
    inherit(&mut entry, division, fields::DIVISION_CODE);
    inherit(&mut entry, division, fields::DIVISION);

    if kind == Kind::Unit {
        let department = ancestor(cost_center, &cost_center.department_cost_center(), map)?;
        inherit(&mut entry, department, fields::DEPARTMENT);
    }

    Ok(entry)
}

fn ancestor<'a>(
    cost_center: &CostCenter,
    ancestor: &CostCenter,
    map: &'a BTreeMap<CostCenter, OrganizationEntry>,
) -> OrganizationResult<&'a OrganizationEntry> {
    map.get(ancestor).ok_or_else(|| OrganizationError::MissingAncestor {
        cost_center: cost_center.to_string(),
        ancestor: ancestor.to_string(),
    })
}

/// Copy `field` from `from`; a field the ancestor lacks is removed.
fn inherit(entry: &mut OrganizationEntry, from: &OrganizationEntry, field: &str) {
    match from.get(field) {
        Some(value) => {
            entry.insert(field.to_string(), value.clone());
        }
        None => {
            entry.remove(field);
        }
    }
}

/// Populated organization entries, built once per run.
#[derive(Debug, Clone, Default)]
pub struct Organizations {
    entries: BTreeMap<CostCenter, OrganizationEntry>,
}

impl Organizations {
    /// Build from the raw "Organization" sheet rows.
    pub fn from_rows(rows: &[Row]) -> OrganizationResult<Self> {
        let entries = build_map(rows, fields::COST_CENTER)?;
        debug!(entries = entries.len(), "Populated organization hierarchy");
        Ok(Self { entries })
    }

    /// Look up a cost center given as text; malformed codes find nothing.
    pub fn get(&self, cost_center: &str) -> Option<&OrganizationEntry> {
        let cc = cost_center.parse::<CostCenter>().ok()?;
        self.entries.get(&cc)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
