//! Google Sheets values API client.

use reqwest::Url;
use tracing::{debug, info};

use super::{value_range_to_rows, Row, ValueRange};
use crate::error::{SheetError, SheetResult};

const BASE_URL: &str = "https://sheets.googleapis.com";

/// Read-only client for one spreadsheet document.
#[derive(Debug, Clone)]
pub struct GoogleSheets {
    client: reqwest::Client,
    doc_id: String,
    access_token: String,
}

impl GoogleSheets {
    pub fn new(doc_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            doc_id: doc_id.into(),
            access_token: access_token.into(),
        }
    }

    /// `.../v4/spreadsheets/<doc>/values/<sheet>`, with the sheet name as
    /// one encoded path segment.
    pub fn values_url(&self, sheet: &str) -> SheetResult<Url> {
        let invalid = |reason: String| SheetError::InvalidUrl {
            url: BASE_URL.to_string(),
            reason,
        };

        let mut url = Url::parse(BASE_URL).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.doc_id.as_str(), "values", sheet]);
        Ok(url)
    }

    /// Fetch every populated cell of `sheet` as header-keyed rows.
    pub async fn rows(&self, sheet: &str) -> SheetResult<Vec<Row>> {
        let url = self.values_url(sheet)?;
        debug!(sheet, %url, "Fetching sheet");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Api {
                sheet: sheet.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let range: ValueRange = response.json().await?;
        let rows = value_range_to_rows(Some(&range));
        info!(sheet, rows = rows.len(), "Retrieved sheet");
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_url_encodes_sheet_name() {
        let sheets = GoogleSheets::new("doc123", "token");
        assert_eq!(
            sheets.values_url("All Staff List Mapping").unwrap().as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/doc123/values/All%20Staff%20List%20Mapping"
        );
    }

    #[test]
    fn test_values_url_keeps_slash_in_sheet_name() {
        let sheets = GoogleSheets::new("doc123", "token");
        let url = sheets.values_url("A/B").unwrap();
        assert_eq!(url.path(), "/v4/spreadsheets/doc123/values/A%2FB");
        assert_eq!(url.path_segments().map(|s| s.count()), Some(5));
    }
}
