//! Person records shared by every stage of the pipeline.
//!
//! A [`Person`] is the union of everything known about one staff member,
//! grouped by the source it came from:
//!
//! ```text
//! Person { uid: "jdoe", sources: {
//!     "Staff":        { "Directory ID": "jdoe", "Cost Center": "044100", ... },
//!     "Organization": { "Division": "Digital Services", ... },
//!     "LDAP":         { "sn": "Doe", "givenName": "Jane", "mail": ... },
//!     "Grouper":      { "FTE": "100.00", ... },
//! }}
//! ```
//!
//! Lookups never fail: a missing source or field is logged and resolved to
//! an empty string (or `None`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::{ModelError, ModelResult};

/// Field name to value; a value may be explicitly null.
pub type FieldMap = BTreeMap<String, Option<String>>;

/// Source name to its fields.
pub type Sources = BTreeMap<String, FieldMap>;

/// Well-known source names.
pub mod source {
    /// Row of the "Staff" sheet.
    pub const STAFF: &str = "Staff";
    /// Populated row of the "Organization" sheet.
    pub const ORGANIZATION: &str = "Organization";
    /// Directory attributes.
    pub const LDAP: &str = "LDAP";
    /// Facts decoded from group memberships.
    pub const GROUPER: &str = "Grouper";
    /// Mapping-table sentinel for fields computed by fixed rules.
    pub const DERIVED: &str = "Derived";
}

// =============================================================================
// Person
// =============================================================================

/// A staff member and the per-source fields known about them.
///
/// Immutable once built; the uid is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPerson")]
pub struct Person {
    uid: String,
    sources: Sources,
}

#[derive(Deserialize)]
struct RawPerson {
    uid: String,
    sources: Sources,
}

impl TryFrom<RawPerson> for Person {
    type Error = ModelError;

    fn try_from(raw: RawPerson) -> Result<Self, Self::Error> {
        Person::new(raw.uid, raw.sources)
    }
}

impl Person {
    /// Create a person. Fails if `uid` is empty.
    pub fn new(uid: impl Into<String>, sources: Sources) -> ModelResult<Self> {
        let uid = uid.into();
        if uid.is_empty() {
            return Err(ModelError::EmptyUid);
        }
        Ok(Self { uid, sources })
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn sources(&self) -> &Sources {
        &self.sources
    }

    /// Value of `field` in `source`, or `""`.
    ///
    /// Logs a warning naming which lookup failed: the source, the field,
    /// or a null value.
    pub fn get(&self, source: &str, field: &str) -> &str {
        let Some(fields) = self.sources.get(source) else {
            warn!(uid = %self.uid, source, "Source not found, returning empty string");
            return "";
        };

        match fields.get(field) {
            Some(Some(value)) => value,
            Some(None) => {
                warn!(uid = %self.uid, source, field, "Value is null, returning empty string");
                ""
            }
            None => {
                warn!(uid = %self.uid, source, field, "Field not found, returning empty string");
                ""
            }
        }
    }

    /// Value of `field` in `source`, or `None` on any miss.
    ///
    /// Only a missing source is logged.
    pub fn get_allow_null(&self, source: &str, field: &str) -> Option<&str> {
        let Some(fields) = self.sources.get(source) else {
            warn!(uid = %self.uid, source, "Source not found, returning null");
            return None;
        };

        fields.get(field).and_then(|v| v.as_deref())
    }

    /// True if `source` exists and holds a non-null `field`.
    ///
    /// An empty string counts as a value.
    pub fn has_value(&self, source: &str, field: &str) -> bool {
        self.sources
            .get(source)
            .and_then(|fields| fields.get(field))
            .is_some_and(|v| v.is_some())
    }

    /// Case-insensitive last name + first name, used to order output.
    pub fn sort_key(&self) -> String {
        format!(
            "{}{}",
            self.get(source::LDAP, "sn"),
            self.get(source::LDAP, "givenName")
        )
        .to_lowercase()
    }
}

impl std::fmt::Display for Person {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Person[uid: {}]", self.uid)
    }
}

/// Sort persons by last name then first name, ignoring case.
pub fn sort_persons(persons: &mut [Person]) {
    persons.sort_by_cached_key(Person::sort_key);
}

// =============================================================================
// Persons file
// =============================================================================

/// Read a persons file written by [`write_persons`].
pub fn read_persons(path: &Path) -> ModelResult<Vec<Person>> {
    let content = fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

/// Write persons as a pretty-printed JSON array.
pub fn write_persons(path: &Path, persons: &[Person]) -> ModelResult<()> {
    let mut json = serde_json::to_string_pretty(persons)?;
    json.push('\n');
    fs::write(path, json).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, Option<&str>)]) -> FieldMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    fn test_person() -> Person {
        let mut sources = Sources::new();
        sources.insert(
            source::LDAP.to_string(),
            fields(&[
                ("sn", Some("Person1")),
                ("givenName", Some("Test")),
                ("umOptionalTitle", None),
                ("umPrimaryCampusRoom", Some("")),
            ]),
        );
        Person::new("testperson1", sources).unwrap()
    }

    #[test]
    fn test_empty_uid_rejected() {
        let result = Person::new("", Sources::new());
        assert!(matches!(result, Err(ModelError::EmptyUid)));
    }

    #[test]
    fn test_get_on_empty_sources() {
        let person = Person::new("nobody", Sources::new()).unwrap();
        assert_eq!(person.get("Staff", "Functional Title"), "");
        assert_eq!(person.get_allow_null("Staff", "Functional Title"), None);
        assert!(!person.has_value("Staff", "Functional Title"));
    }

    #[test]
    fn test_get_present_value() {
        let person = test_person();
        assert_eq!(person.get("LDAP", "sn"), "Person1");
        assert_eq!(person.get_allow_null("LDAP", "givenName"), Some("Test"));
    }

    #[test]
    fn test_get_null_and_missing_field() {
        let person = test_person();
        assert_eq!(person.get("LDAP", "umOptionalTitle"), "");
        assert_eq!(person.get("LDAP", "mail"), "");
        assert_eq!(person.get_allow_null("LDAP", "umOptionalTitle"), None);
        assert_eq!(person.get_allow_null("LDAP", "mail"), None);
    }

    #[test]
    fn test_has_value_distinguishes_empty_from_absent() {
        let person = test_person();
        assert!(person.has_value("LDAP", "umPrimaryCampusRoom"));
        assert!(!person.has_value("LDAP", "umOptionalTitle"));
        assert!(!person.has_value("LDAP", "mail"));
        assert!(!person.has_value("Staff", "sn"));
    }

    #[test]
    fn test_sort_persons_case_insensitive() {
        let make = |uid: &str, sn: &str, given: &str| {
            let mut sources = Sources::new();
            sources.insert(
                source::LDAP.to_string(),
                fields(&[("sn", Some(sn)), ("givenName", Some(given))]),
            );
            Person::new(uid, sources).unwrap()
        };
        let mut persons = vec![
            make("c", "smith", "Zed"),
            make("a", "Smith", "Anna"),
            make("b", "Adams", "Bob"),
        ];
        sort_persons(&mut persons);
        let uids: Vec<&str> = persons.iter().map(Person::uid).collect();
        assert_eq!(uids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_deserialize_rejects_empty_uid() {
        let json = r#"[{"uid": "", "sources": {}}]"#;
        let result: Result<Vec<Person>, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_persons_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("persons.json");

        let persons = vec![test_person()];
        write_persons(&path, &persons).unwrap();
        let loaded = read_persons(&path).unwrap();

        assert_eq!(loaded, persons);
        assert_eq!(loaded[0].get_allow_null("LDAP", "umOptionalTitle"), None);
    }
}
