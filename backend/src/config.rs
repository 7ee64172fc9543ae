//! Properties-file configuration.
//!
//! The file follows Java properties rules: `key=value` or `key: value`,
//! `#` and `!` comments, backslash escapes. Values are taken literally,
//! with no variable substitution.
//!
//! ```text
//! # Google Sheets; the token may also come from STAFFDIR_SHEETS_ACCESS_TOKEN
//! spreadsheetDocId=1AbC...
//! sheets.accessToken=ya29...
//!
//! # ...or a directory of CSV exports (wins when set)
//! sheets.exportDir=sheets
//!
//! directory.exportFile=ldap.json
//! excel.password=secret
//!
//! # Group membership maintenance
//! grouper.url=https://grouper.example.edu/grouper-ws/servicesRest
//! grouper.user=svc-staffdir
//! grouper.password=secret
//! ```
//!
//! Relative paths are resolved against the properties file's directory.

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::grouper::GrouperClient;
use crate::sheets::{GoogleSheets, SheetExport, SheetSource};

/// Property names.
pub mod keys {
    pub const SPREADSHEET_DOC_ID: &str = "spreadsheetDocId";
    pub const SHEETS_ACCESS_TOKEN: &str = "sheets.accessToken";
    pub const SHEETS_EXPORT_DIR: &str = "sheets.exportDir";
    pub const DIRECTORY_EXPORT_FILE: &str = "directory.exportFile";
    pub const EXCEL_PASSWORD: &str = "excel.password";
    pub const GROUPER_URL: &str = "grouper.url";
    pub const GROUPER_USER: &str = "grouper.user";
    pub const GROUPER_PASSWORD: &str = "grouper.password";
}

/// Environment fallback for the sheets access token.
pub const ACCESS_TOKEN_ENV: &str = "STAFFDIR_SHEETS_ACCESS_TOKEN";

/// Raw `key=value` pairs.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    /// Parse a properties file without touching the process environment.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let values = java_properties::read(BufReader::new(file)).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { values })
    }

    /// Value of `key`; blank values count as missing.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn require(&self, key: &str) -> ConfigResult<&str> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }
}

impl FromIterator<(String, String)> for Properties {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Where the configuration workbook comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetsConfig {
    Google { doc_id: String, access_token: String },
    Export { dir: PathBuf },
}

impl SheetsConfig {
    pub fn source(&self) -> SheetSource {
        match self {
            SheetsConfig::Google {
                doc_id,
                access_token,
            } => SheetSource::Google(GoogleSheets::new(doc_id.as_str(), access_token.as_str())),
            SheetsConfig::Export { dir } => SheetSource::Export(SheetExport::new(dir.clone())),
        }
    }
}

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub sheets: SheetsConfig,
    pub directory_export: Option<PathBuf>,
    pub excel_password: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let props = Properties::load(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_properties(&props, base_dir, std::env::var(ACCESS_TOKEN_ENV).ok())
    }

    /// Build from parsed properties; `env_token` is used when the file
    /// has no access token.
    pub fn from_properties(
        props: &Properties,
        base_dir: &Path,
        env_token: Option<String>,
    ) -> ConfigResult<Self> {
        let sheets = match props.get(keys::SHEETS_EXPORT_DIR) {
            Some(dir) => SheetsConfig::Export {
                dir: base_dir.join(dir),
            },
            None => {
                let doc_id = props.require(keys::SPREADSHEET_DOC_ID)?.to_string();
                let access_token = props
                    .get(keys::SHEETS_ACCESS_TOKEN)
                    .map(str::to_string)
                    .or(env_token)
                    .ok_or_else(|| ConfigError::MissingKey(keys::SHEETS_ACCESS_TOKEN.to_string()))?;
                SheetsConfig::Google {
                    doc_id,
                    access_token,
                }
            }
        };

        Ok(Self {
            sheets,
            directory_export: props.get(keys::DIRECTORY_EXPORT_FILE).map(|f| base_dir.join(f)),
            excel_password: props.get(keys::EXCEL_PASSWORD).map(str::to_string),
        })
    }

    /// The directory export path, required by `retrieve`.
    pub fn require_directory_export(&self) -> ConfigResult<&Path> {
        self.directory_export
            .as_deref()
            .ok_or_else(|| ConfigError::MissingKey(keys::DIRECTORY_EXPORT_FILE.to_string()))
    }
}

/// Grouper web services credentials, used by the membership commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrouperConfig {
    pub url: String,
    pub user: String,
    pub password: String,
}

impl GrouperConfig {
    pub fn load(path: &Path) -> ConfigResult<Self> {
        Self::from_properties(&Properties::load(path)?)
    }

    pub fn from_properties(props: &Properties) -> ConfigResult<Self> {
        Ok(Self {
            url: props.require(keys::GROUPER_URL)?.to_string(),
            user: props.require(keys::GROUPER_USER)?.to_string(),
            password: props.require(keys::GROUPER_PASSWORD)?.to_string(),
        })
    }

    pub fn client(&self) -> GrouperClient {
        GrouperClient::new(self.url.as_str(), self.user.as_str(), self.password.as_str())
    }
}
