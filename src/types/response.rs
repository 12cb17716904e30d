//! Response type definitions
//!
//! The transport decodes every reply once into an [`ApiReply`]. Operations
//! then deserialize their success payload into the typed structures below.

use super::serde_helpers::{deserialize_flexible_u64, deserialize_presence_flag};
use crate::{
    Error, Result,
    error::SubjectProblem,
    types::ActionKind,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Error branch of a reply (`{"error": {"code": ..., "info": ...}}`)
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub code: String,
    pub info: String,
    /// Complete reply
    pub payload: Value,
}

/// A decoded API reply
///
/// An `error` object wins over anything else in the reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply {
    Success(Value),
    Failure(ApiError),
}

impl ApiReply {
    /// Classify a decoded JSON document
    pub fn from_value(value: Value) -> Self {
        if let Some(error) = value.get("error").filter(|e| e.is_object()) {
            let code = error
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let info = error
                .get("info")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return ApiReply::Failure(ApiError {
                code,
                info,
                payload: value,
            });
        }
        ApiReply::Success(value)
    }

    /// Success payload, or the error code mapped into the action's family
    pub fn into_action_result(self, action: ActionKind) -> Result<Value> {
        match self {
            ApiReply::Success(value) => Ok(value),
            ApiReply::Failure(err) => Err(Error::remote(action, err.code, err.info)),
        }
    }

    /// Success payload of a read request
    pub fn into_result(self) -> Result<Value> {
        match self {
            ApiReply::Success(value) => Ok(value),
            ApiReply::Failure(err) => Err(Error::Api {
                code: err.code,
                info: err.info,
            }),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ApiReply::Failure(_))
    }
}

/// One revision of a page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Revision {
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    pub revid: Option<u64>,
    pub timestamp: Option<String>,
    pub user: Option<String>,
    #[serde(rename = "*", alias = "content")]
    pub content: Option<String>,
}

/// A category a page belongs to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub title: String,
}

/// One entry of `query.pages`
#[derive(Debug, Clone, Deserialize)]
pub struct PageEntry {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub ns: i64,
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    pub pageid: Option<u64>,
    #[serde(default, deserialize_with = "deserialize_presence_flag")]
    pub missing: bool,
    #[serde(default, deserialize_with = "deserialize_presence_flag")]
    pub invalid: bool,
    #[serde(default, deserialize_with = "deserialize_presence_flag")]
    pub special: bool,
    pub starttimestamp: Option<String>,
    #[serde(default)]
    pub revisions: Vec<Revision>,
    #[serde(default)]
    pub categories: Vec<CategoryEntry>,
    /// Tokens and any other per-page property
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageEntry {
    /// Invalid wins over special, special over missing
    pub fn problem(&self) -> Option<SubjectProblem> {
        if self.invalid {
            Some(SubjectProblem::Invalid)
        } else if self.special || self.ns < 0 {
            Some(SubjectProblem::Special)
        } else if self.missing {
            Some(SubjectProblem::Missing)
        } else {
            None
        }
    }

    /// Fail with the page's problem, if any
    pub fn check(&self, title: &str) -> Result<()> {
        match self.problem() {
            Some(problem) => Err(Error::Page {
                title: title.to_string(),
                problem,
            }),
            None => Ok(()),
        }
    }

    /// String property outside the typed fields
    pub fn extra_str(&self, key: &str) -> Option<&str> {
        self.extra.get(key).and_then(Value::as_str)
    }
}

/// Entries of `query.pages`, which is an object keyed by page id in the
/// legacy format and an array in the newer one
pub fn query_pages(reply: &Value) -> Result<Vec<PageEntry>> {
    let pages = reply
        .get("query")
        .and_then(|q| q.get("pages"))
        .ok_or_else(|| Error::unexpected("reply has no query.pages"))?;

    let entries: Vec<Value> = match pages {
        Value::Object(map) => map.values().cloned().collect(),
        Value::Array(items) => items.clone(),
        other => {
            return Err(Error::unexpected(format!(
                "query.pages is neither object nor array: {other}"
            )));
        }
    };

    entries
        .into_iter()
        .map(|entry| serde_json::from_value(entry).map_err(Error::from))
        .collect()
}

/// The single entry of `query.pages`
pub fn first_page(reply: &Value) -> Result<PageEntry> {
    query_pages(reply)?
        .into_iter()
        .next()
        .ok_or_else(|| Error::unexpected("query.pages is empty"))
}

/// One page with the text of its current revision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikiPage {
    /// Namespace
    pub ns: i64,
    /// Namespace name as it appears in the title (empty for the main namespace)
    pub nsname: String,
    /// Page content of current revision
    pub text: String,
    /// Page ID
    pub id: u64,
    /// Page title
    pub title: String,
}

/// One page as XML export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedPage {
    pub xml: String,
    pub id: u64,
    pub ns: i64,
    pub title: String,
}

/// Information about a file after upload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadData {
    /// Timestamp of upload
    pub timestamp: Option<DateTime<Utc>>,
    /// Image width
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    pub width: Option<u64>,
    /// Image height
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    pub height: Option<u64>,
    /// File URL
    pub url: Option<String>,
    /// Description page URL
    #[serde(rename = "descriptionurl", alias = "page")]
    pub page: Option<String>,
    /// MIME type
    pub mime: Option<String>,
    /// File SHA1
    pub sha1: Option<String>,
}

/// Result of a saved edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditOutcome {
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    pub pageid: Option<u64>,
    #[serde(default, rename = "oldrevid", deserialize_with = "deserialize_flexible_u64")]
    pub old_revid: Option<u64>,
    #[serde(default, rename = "newrevid", deserialize_with = "deserialize_flexible_u64")]
    pub new_revid: Option<u64>,
    #[serde(rename = "newtimestamp")]
    pub timestamp: Option<String>,
    /// The server saw no difference
    #[serde(default, deserialize_with = "deserialize_presence_flag")]
    pub nochange: bool,
    /// The edit created the page
    #[serde(default, rename = "new", deserialize_with = "deserialize_presence_flag")]
    pub created: bool,
}

/// Result of a page move
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOutcome {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub reason: String,
    pub talkfrom: Option<String>,
    pub talkto: Option<String>,
}

/// Result of a deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub title: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    pub logid: Option<u64>,
}

/// Result of an undeletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndeleteOutcome {
    pub title: String,
    #[serde(default)]
    pub revisions: u64,
    #[serde(default)]
    pub fileversions: u64,
    #[serde(default)]
    pub reason: String,
}

/// Result of a protection change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectOutcome {
    pub title: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default, deserialize_with = "deserialize_presence_flag")]
    pub cascade: bool,
    /// e.g. `[{"edit": "sysop", "expiry": "infinite"}]`
    #[serde(default)]
    pub protections: Vec<Map<String, Value>>,
}

/// Result of a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOutcome {
    pub user: String,
    #[serde(default, rename = "userID", deserialize_with = "deserialize_flexible_u64")]
    pub user_id: Option<u64>,
    #[serde(default)]
    pub expiry: String,
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    pub id: Option<u64>,
    #[serde(default)]
    pub reason: String,
}

/// Result of an unblock
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnblockOutcome {
    #[serde(default, deserialize_with = "deserialize_flexible_u64")]
    pub id: Option<u64>,
    pub user: String,
    #[serde(default)]
    pub reason: String,
}

/// One batch of category members
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPage {
    pub titles: Vec<String>,
    /// Present when more members follow
    pub cursor: Option<String>,
}

impl CategoryPage {
    /// Titles with the continuation cursor appended as the last element
    pub fn into_list(self) -> Vec<String> {
        let mut list = self.titles;
        list.extend(self.cursor);
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_error_takes_precedence() {
        let reply = ApiReply::from_value(json!({
            "edit": {"result": "Success"},
            "error": {"code": "protectedpage", "info": "This page has been protected"}
        }));
        match reply {
            ApiReply::Failure(err) => {
                assert_eq!(err.code, "protectedpage");
                assert_eq!(err.info, "This page has been protected");
            }
            ApiReply::Success(_) => panic!("error branch ignored"),
        }
    }

    #[test]
    fn test_into_action_result_maps_code() {
        let reply = ApiReply::from_value(json!({"error": {"code": "selfmove", "info": "same"}}));
        let err = reply.into_action_result(ActionKind::Move).unwrap_err();
        assert_eq!(err.code(), 1203);
    }

    #[test]
    fn test_read_failure_is_api_error() {
        let reply = ApiReply::from_value(json!({"error": {"code": "maxlag", "info": "lagged"}}));
        assert!(reply.is_failure());
        let err = reply.into_result().unwrap_err();
        assert!(matches!(err, Error::Api { ref code, .. } if code == "maxlag"));
    }

    #[test]
    fn test_legacy_pages_object() {
        let reply = json!({"query": {"pages": {"-1": {
            "ns": 0, "title": "Nope", "missing": "", "edittoken": "+\\"
        }}}});
        let page = first_page(&reply).unwrap();
        assert_eq!(page.title, "Nope");
        assert_eq!(page.problem(), Some(SubjectProblem::Missing));
        assert_eq!(page.extra_str("edittoken"), Some("+\\"));
    }

    #[test]
    fn test_pages_array_with_revision() {
        let reply = json!({"query": {"pages": [{
            "pageid": 12, "ns": 0, "title": "Foo",
            "revisions": [{"revid": 99, "timestamp": "2024-01-01T00:00:00Z", "content": "hello"}]
        }]}});
        let page = first_page(&reply).unwrap();
        assert_eq!(page.pageid, Some(12));
        assert_eq!(page.problem(), None);
        assert_eq!(page.revisions[0].content.as_deref(), Some("hello"));
        assert_eq!(page.revisions[0].revid, Some(99));
    }

    #[test]
    fn test_problem_order() {
        let reply = json!({"query": {"pages": {"-1": {
            "ns": -1, "title": "Special:Random", "special": "", "missing": ""
        }}}});
        let page = first_page(&reply).unwrap();
        assert_eq!(page.problem(), Some(SubjectProblem::Special));

        let reply = json!({"query": {"pages": {"-1": {"title": "A|B", "invalid": ""}}}});
        let page = first_page(&reply).unwrap();
        assert!(page.check("A|B").is_err());
    }

    #[test]
    fn test_missing_pages_key() {
        let err = first_page(&json!({"batchcomplete": ""})).unwrap_err();
        assert!(matches!(err, Error::UnexpectedResponse(_)));
    }

    #[test]
    fn test_edit_outcome() {
        let outcome: EditOutcome = serde_json::from_value(json!({
            "result": "Success", "pageid": 5, "title": "Sandbox",
            "oldrevid": 10, "newrevid": 11, "newtimestamp": "2024-01-01T00:00:00Z"
        }))
        .unwrap();
        assert_eq!(outcome.new_revid, Some(11));
        assert!(!outcome.nochange);
        assert!(!outcome.created);
    }

    #[test]
    fn test_upload_data() {
        let data: UploadData = serde_json::from_value(json!({
            "timestamp": "2024-02-03T04:05:06Z",
            "width": 640, "height": "480",
            "url": "https://upload.example.org/a/ab/Logo.png",
            "descriptionurl": "https://example.org/wiki/File:Logo.png",
            "mime": "image/png",
            "sha1": "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        }))
        .unwrap();
        assert_eq!(data.width, Some(640));
        assert_eq!(data.height, Some(480));
        assert_eq!(
            data.page.as_deref(),
            Some("https://example.org/wiki/File:Logo.png")
        );
        assert!(data.timestamp.is_some());
    }

    #[test]
    fn test_category_page_into_list() {
        let page = CategoryPage {
            titles: vec!["A".into(), "B".into()],
            cursor: Some("page|C|123".into()),
        };
        assert_eq!(page.into_list(), vec!["A", "B", "page|C|123"]);

        let page = CategoryPage {
            titles: vec!["A".into()],
            cursor: None,
        };
        assert_eq!(page.into_list(), vec!["A"]);
    }
}
