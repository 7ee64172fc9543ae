//! Derived fields.
//!
//! Title, display name and location are computed by fixed rules from the
//! Staff and LDAP sources, whatever the mapping table says. Each output
//! target names them differently and has its own title fallback rule.

use crate::models::{source, Person};

/// Source fields read by the derived rules.
pub mod fields {
    pub const FUNCTIONAL_TITLE: &str = "Functional Title";
    pub const DISPLAY_TITLE: &str = "umDisplayTitle";
    pub const OFFICIAL_TITLE: &str = "umOfficialTitle";
    pub const GIVEN_NAME: &str = "givenName";
    pub const SURNAME: &str = "sn";
    pub const MAIL: &str = "mail";
    pub const ROOM: &str = "umPrimaryCampusRoom";
    pub const BUILDING: &str = "umPrimaryCampusBuilding";
}

/// Official titles with this prefix are appended to the display title.
pub const LIBRARIAN_PREFIX: &str = "Librarian";

/// When the Staff "Functional Title" gives way to LDAP "umDisplayTitle".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleFallback {
    /// Only when the functional title is absent or null.
    WhenAbsent,
    /// Also when it is present but empty.
    WhenBlank,
}

/// How the display name is composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayNameStyle {
    /// `"<first> <last>"`, trimmed
    FirstLast,
    /// `"<first> <last> <<mail>>"`
    FirstLastMail,
}

/// Names and rules of the derived fields for one output target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputProfile {
    pub title_field: &'static str,
    pub display_name_field: &'static str,
    pub location_field: &'static str,
    pub title_fallback: TitleFallback,
    pub display_name_style: DisplayNameStyle,
}

impl OutputProfile {
    /// CMS JSON feed.
    pub const DRUPAL: OutputProfile = OutputProfile {
        title_field: "title",
        display_name_field: "display_name",
        location_field: "location",
        title_fallback: TitleFallback::WhenAbsent,
        display_name_style: DisplayNameStyle::FirstLast,
    };

    /// "All Staff List" spreadsheet.
    pub const ALL_STAFF_LIST: OutputProfile = OutputProfile {
        title_field: "Title",
        display_name_field: "Expr1",
        location_field: "Location",
        title_fallback: TitleFallback::WhenBlank,
        display_name_style: DisplayNameStyle::FirstLastMail,
    };

    /// The derived fields of `person` as (field, value) pairs.
    pub fn derive(&self, person: &Person) -> [(&'static str, String); 3] {
        [
            (self.title_field, title(person, self.title_fallback)),
            (self.display_name_field, display_name(person, self.display_name_style)),
            (self.location_field, location(person)),
        ]
    }
}

/// Functional title (or LDAP display title), with a differing
/// "Librarian..." official title appended in parentheses.
pub fn title(person: &Person, fallback: TitleFallback) -> String {
    let use_functional = match fallback {
        TitleFallback::WhenAbsent => person.has_value(source::STAFF, fields::FUNCTIONAL_TITLE),
        TitleFallback::WhenBlank => {
            person.has_value(source::STAFF, fields::FUNCTIONAL_TITLE)
                && !person.get(source::STAFF, fields::FUNCTIONAL_TITLE).is_empty()
        }
    };

    let title = if use_functional {
        person.get(source::STAFF, fields::FUNCTIONAL_TITLE)
    } else {
        person.get(source::LDAP, fields::DISPLAY_TITLE)
    };

    let official = person.get(source::LDAP, fields::OFFICIAL_TITLE);
    if official != title && official.starts_with(LIBRARIAN_PREFIX) {
        format!("{title} ({official})")
    } else {
        title.to_string()
    }
}

pub fn display_name(person: &Person, style: DisplayNameStyle) -> String {
    let first = person.get(source::LDAP, fields::GIVEN_NAME);
    let last = person.get(source::LDAP, fields::SURNAME);
    match style {
        DisplayNameStyle::FirstLast => format!("{first} {last}").trim().to_string(),
        DisplayNameStyle::FirstLastMail => {
            let mail = person.get(source::LDAP, fields::MAIL);
            format!("{first} {last} <{mail}>")
        }
    }
}

/// `"<room> <building>"`, trimmed; a missing piece counts as empty.
pub fn location(person: &Person) -> String {
    let part = |field: &'static str| {
        if person.has_value(source::LDAP, field) {
            person.get(source::LDAP, field)
        } else {
            ""
        }
    };
    format!("{} {}", part(fields::ROOM), part(fields::BUILDING))
        .trim()
        .to_string()
}
