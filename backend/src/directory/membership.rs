//! Group-membership decoding.
//!
//! Staff directory groups encode organizational placement in their names:
//!
//! ```text
//! Departmental_Groups:Libraries:Staff_Directory:04_DSS:044100_Software_Systems
//! └──────────── STAFF_DIR_PREFIX ─────────────┘ └────┘ └─────────────────────┘
//!                                               division  department (code = cost center)
//!
//! ...:Staff_Directory:08_AS:0836_Human_Resources:083654_Staff_Development
//!                                                └─────────────────────┘
//!                                                unit (code = cost center)
//!
//! ...:Staff_Directory:Permanent_Status      faculty permanent status
//! ...:Staff_Directory:FTE_50                FTE "50.00"
//! ```

use serde::Serialize;
use tracing::error;

use crate::models::FieldMap;

pub const STAFF_DIR_PREFIX: &str = "Departmental_Groups:Libraries:Staff_Directory:";
pub const FACULTY_PERMANENT_STATUS: &str =
    "Departmental_Groups:Libraries:Staff_Directory:Permanent_Status";
pub const FTE_PREFIX: &str = "Departmental_Groups:Libraries:Staff_Directory:FTE_";

/// FTE when no FTE group is present.
pub const DEFAULT_FTE: &str = "100.00";

/// Field names of the "Grouper" person source.
pub mod fields {
    pub const DIVISION: &str = "Division";
    pub const DEPARTMENT: &str = "Department";
    pub const UNIT: &str = "Unit";
    pub const COST_CENTER: &str = "Cost Center";
    pub const FACULTY_PERMANENT_STATUS: &str = "Faculty Permanent Status";
    pub const FTE: &str = "FTE";
}

/// Facts decoded from one person's group memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipInfo {
    pub division: Option<String>,
    pub department: Option<String>,
    pub unit: Option<String>,
    pub cost_center: Option<String>,
    pub faculty_permanent_status: bool,
    pub fte: String,
}

impl Default for MembershipInfo {
    fn default() -> Self {
        Self {
            division: None,
            department: None,
            unit: None,
            cost_center: None,
            faculty_permanent_status: false,
            fte: DEFAULT_FTE.to_string(),
        }
    }
}

/// Status flags and the staff directory group picked from a membership list.
#[derive(Debug, Default)]
struct Scan<'a> {
    faculty_permanent_status: bool,
    fte: Option<String>,
    library_membership: Option<&'a str>,
}

/// Placement decoded from a staff directory group.
#[derive(Debug, PartialEq)]
struct Placement {
    division: String,
    department: String,
    unit: Option<String>,
    cost_center: String,
}

impl MembershipInfo {
    /// Decode a membership list; `None` yields the defaults.
    pub fn decode<S: AsRef<str>>(memberships: Option<&[Option<S>]>) -> Self {
        let Some(memberships) = memberships else {
            return Self::default();
        };
        let Some(scan) = scan_aborting_on_null_entry(memberships) else {
            return Self::default();
        };

        let mut info = Self {
            faculty_permanent_status: scan.faculty_permanent_status,
            fte: scan.fte.unwrap_or_else(|| DEFAULT_FTE.to_string()),
            ..Self::default()
        };

        if let Some(membership) = scan.library_membership {
            if let Some(placement) = parse_placement(membership) {
                info.division = Some(placement.division);
                info.department = Some(placement.department);
                info.unit = placement.unit;
                info.cost_center = Some(placement.cost_center);
            }
        }

        info
    }

    /// The "Grouper" person source.
    ///
    /// Permanent status is "P" when set and "" otherwise.
    pub fn to_fields(&self) -> FieldMap {
        let mut map = FieldMap::new();
        map.insert(fields::DIVISION.to_string(), self.division.clone());
        map.insert(fields::DEPARTMENT.to_string(), self.department.clone());
        map.insert(fields::UNIT.to_string(), self.unit.clone());
        map.insert(fields::COST_CENTER.to_string(), self.cost_center.clone());
        map.insert(
            fields::FACULTY_PERMANENT_STATUS.to_string(),
            Some(if self.faculty_permanent_status { "P" } else { "" }.to_string()),
        );
        map.insert(fields::FTE.to_string(), Some(self.fte.clone()));
        map
    }
}

/// Classify every membership, stopping at the first null entry.
///
/// A null entry discards everything seen so far: the caller gets `None`
/// and falls back to the defaults. Upstream exports are not expected to
/// contain nulls.
fn scan_aborting_on_null_entry<S: AsRef<str>>(memberships: &[Option<S>]) -> Option<Scan<'_>> {
    let mut scan = Scan::default();

    for membership in memberships {
        let membership: &str = membership.as_ref()?.as_ref();

        if membership == FACULTY_PERMANENT_STATUS {
            scan.faculty_permanent_status = true;
        } else if let Some(percent) = membership.strip_prefix(FTE_PREFIX) {
            scan.fte = Some(format!("{percent}.00"));
        } else if membership.starts_with(STAFF_DIR_PREFIX) {
            scan.library_membership = Some(membership);
        }
    }

    Some(scan)
}

/// Decode `<div>:<dept>[:<unit>]` after the staff directory prefix.
///
/// Malformed groups are logged and decode to nothing.
fn parse_placement(membership: &str) -> Option<Placement> {
    let chopped = membership.strip_prefix(STAFF_DIR_PREFIX).unwrap_or(membership);

    let mut elements: Vec<&str> = chopped.split(':').collect();
    while elements.last().is_some_and(|e| e.is_empty()) {
        elements.pop();
    }

    if !(2..=3).contains(&elements.len()) {
        error!(membership, "Can't parse membership: expected 2 or 3 elements");
        return None;
    }

    let Some(placement) = split_elements(&elements) else {
        error!(membership, "Can't parse membership: element without '<code>_<name>'");
        return None;
    };
    Some(placement)
}

fn split_elements(elements: &[&str]) -> Option<Placement> {
    let (_, division) = split_element(elements[0])?;
    let (department_code, department) = split_element(elements[1])?;

    let (unit, cost_center) = match elements.get(2) {
        Some(unit_element) => {
            let (unit_code, unit) = split_element(unit_element)?;
            (Some(unit), unit_code.to_string())
        }
        None => (None, department_code.to_string()),
    };

    Some(Placement {
        division,
        department,
        unit,
        cost_center,
    })
}

/// `"083600_Human_Resources"` -> `("083600", "Human Resources")`
fn split_element(element: &str) -> Option<(&str, String)> {
    let (code, name) = element.split_once('_')?;
    Some((code, name.replace('_', " ")))
}
