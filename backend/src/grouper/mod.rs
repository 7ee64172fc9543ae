//! Grouper web services client.
//!
//! The staff directory groups (`Departmental_Groups:Libraries:...`) are
//! maintained in Grouper. Only member deletion is exposed, for clearing
//! out people who have left:
//!
//! ```text
//! POST <grouper.url>/v2_4_000/groups/<group>/members
//! {"WsRestDeleteMemberRequest": {"subjectLookups": [{"subjectId": "..."}]}}
//! ```
//!
//! A subject id is the directory "employeeNumber".

use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{GrouperError, GrouperResult};

/// REST API version segment.
pub const WS_VERSION: &str = "v2_4_000";

const JSON_CONTENT_TYPE: &str = "text/x-json; charset=UTF-8";

// =============================================================================
// Wire types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubjectLookup<'a> {
    subject_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeleteMemberRequest<'a> {
    subject_lookups: Vec<SubjectLookup<'a>>,
}

#[derive(Debug, Serialize)]
struct DeleteMemberEnvelope<'a> {
    #[serde(rename = "WsRestDeleteMemberRequest")]
    request: DeleteMemberRequest<'a>,
}

#[derive(Debug, Deserialize)]
struct DeleteMemberResponse {
    #[serde(rename = "WsDeleteMemberResults")]
    results: DeleteMemberResults,
}

/// Outcome metadata attached to every result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultMetadata {
    pub result_code: Option<String>,
    pub result_code2: Option<String>,
    pub result_message: Option<String>,
    /// "T" or "F"
    pub success: Option<String>,
}

impl ResultMetadata {
    pub fn is_success(&self) -> bool {
        self.success.as_deref() == Some("T")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WsSubject {
    pub id: Option<String>,
}

/// Result for one subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteMemberResult {
    pub result_metadata: ResultMetadata,
    pub ws_subject: Option<WsSubject>,
}

/// Results of one delete request, one entry per subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteMemberResults {
    pub results: Vec<DeleteMemberResult>,
    pub result_metadata: ResultMetadata,
}

fn delete_request_body(subject_ids: &[String]) -> GrouperResult<String> {
    let envelope = DeleteMemberEnvelope {
        request: DeleteMemberRequest {
            subject_lookups: subject_ids
                .iter()
                .map(|id| SubjectLookup { subject_id: id.as_str() })
                .collect(),
        },
    };
    Ok(serde_json::to_string(&envelope)?)
}

/// Grouper answers partial failures with an error status and a normal
/// results body; only a body that is not a results document is an error.
fn parse_delete_response(status: StatusCode, body: &str) -> GrouperResult<DeleteMemberResults> {
    match serde_json::from_str::<DeleteMemberResponse>(body) {
        Ok(response) => {
            if !status.is_success() {
                warn!(status = status.as_u16(), "Grouper reported a failure");
            }
            Ok(response.results)
        }
        Err(e) if status.is_success() => Err(e.into()),
        Err(_) => Err(GrouperError::Api {
            status: status.as_u16(),
            body: body.to_string(),
        }),
    }
}

// =============================================================================
// Client
// =============================================================================

/// Client for one Grouper web services endpoint.
#[derive(Debug, Clone)]
pub struct GrouperClient {
    client: reqwest::Client,
    url: String,
    user: String,
    password: String,
}

impl GrouperClient {
    pub fn new(url: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// `<url>/<version>/groups/<group>/members`, with the group name as one
    /// path segment.
    pub fn members_url(&self, group: &str) -> GrouperResult<Url> {
        let invalid = |reason: String| GrouperError::InvalidUrl {
            url: self.url.clone(),
            reason,
        };

        let mut url = Url::parse(&self.url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| invalid("cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend([WS_VERSION, "groups", group, "members"]);
        Ok(url)
    }

    /// Remove `subject_ids` from `group`.
    pub async fn delete_members(
        &self,
        group: &str,
        subject_ids: &[String],
    ) -> GrouperResult<DeleteMemberResults> {
        let url = self.members_url(group)?;
        let body = delete_request_body(subject_ids)?;
        debug!(%url, group, subjects = subject_ids.len(), "Deleting group members");

        let response = self
            .client
            .post(url)
            .basic_auth(&self.user, Some(&self.password))
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        parse_delete_response(status, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GROUP: &str = "Departmental_Groups:Libraries:Employees:Libraries-Staff-Exempt";

    #[test]
    fn test_members_url() {
        let client = GrouperClient::new("https://grouper.example.edu/grouper-ws/servicesRest/", "u", "p");
        assert_eq!(
            client.members_url(GROUP).unwrap().as_str(),
            "https://grouper.example.edu/grouper-ws/servicesRest/v2_4_000/groups/\
             Departmental_Groups:Libraries:Employees:Libraries-Staff-Exempt/members"
        );
    }

    #[test]
    fn test_members_url_encodes_group() {
        let client = GrouperClient::new("https://grouper.example.edu/ws", "u", "p");
        let url = client.members_url("a group/with slash").unwrap();
        assert_eq!(
            url.as_str(),
            "https://grouper.example.edu/ws/v2_4_000/groups/a%20group%2Fwith%20slash/members"
        );
    }

    #[test]
    fn test_invalid_url() {
        let client = GrouperClient::new("not a url", "u", "p");
        assert!(matches!(client.members_url(GROUP), Err(GrouperError::InvalidUrl { .. })));
    }

    #[test]
    fn test_delete_request_body() {
        let body = delete_request_body(&["123".to_string(), "456".to_string()]).unwrap();
        assert_eq!(
            body,
            r#"{"WsRestDeleteMemberRequest":{"subjectLookups":[{"subjectId":"123"},{"subjectId":"456"}]}}"#
        );
    }

    const RESULTS: &str = r#"{
        "WsDeleteMemberResults": {
            "results": [
                {"resultMetadata": {"resultCode": "SUCCESS", "success": "T"}, "wsSubject": {"id": "123"}},
                {"resultMetadata": {"resultCode": "SUBJECT_NOT_FOUND", "resultMessage": "no such subject", "success": "F"}}
            ],
            "resultMetadata": {"resultCode": "PROBLEM_DELETING_MEMBERS", "success": "F"}
        }
    }"#;

    #[test]
    fn test_parse_partial_failure() {
        let results = parse_delete_response(StatusCode::INTERNAL_SERVER_ERROR, RESULTS).unwrap();
        assert_eq!(results.results.len(), 2);
        assert!(results.results[0].result_metadata.is_success());
        assert_eq!(results.results[0].ws_subject.as_ref().and_then(|s| s.id.as_deref()), Some("123"));
        assert!(!results.results[1].result_metadata.is_success());
        assert_eq!(
            results.results[1].result_metadata.result_message.as_deref(),
            Some("no such subject")
        );
        assert!(!results.result_metadata.is_success());
    }

    #[test]
    fn test_parse_error_page() {
        let err = parse_delete_response(StatusCode::UNAUTHORIZED, "<html>denied</html>").unwrap_err();
        assert!(matches!(err, GrouperError::Api { status: 401, .. }));
    }

    #[test]
    fn test_parse_garbled_success() {
        let err = parse_delete_response(StatusCode::OK, "{}").unwrap_err();
        assert!(matches!(err, GrouperError::Json(_)));
    }
}
