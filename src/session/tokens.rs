//! Action token acquisition
//!
//! Tokens are requested with `prop=info&intoken=<kind>` for exactly one
//! subject. The same reply tells whether the subject exists and, for edit
//! tokens, carries the timestamps used for conflict detection.

use super::transport::Transport;
use crate::{
    Error, Result,
    error::SubjectProblem,
    types::{ActionKind, ActionToken, ApiParams, Existence, TokenKind, first_page},
};
use serde_json::Value;
use tracing::debug;

/// Request the token `action` needs for `subject`
///
/// Checks run in this order: a permission warning, an invalid title, a
/// special page, then the token itself. A missing page is not an error
/// here; it is reported through [`ActionToken::existence`].
pub async fn acquire_token<T: Transport + ?Sized>(
    transport: &T,
    action: ActionKind,
    subject: &str,
) -> Result<ActionToken> {
    let kind = action.token_kind();
    let mut params = ApiParams::query()
        .set("prop", "info")
        .set("intoken", kind.param())
        .set("titles", subject);
    if kind == TokenKind::Edit {
        params = params
            .set("prop", "info|revisions")
            .set("rvprop", "timestamp");
    }

    debug!("Requesting {} token for {}", kind.param(), subject);
    let reply = transport.get(&params).await?.into_action_result(action)?;

    if let Some(warning) = reply.pointer("/warnings/info") {
        return Err(Error::TokenDenied {
            action,
            subject: subject.to_string(),
            warning: warning_text(warning),
        });
    }

    let page = first_page(&reply)?;
    if let Some(problem @ (SubjectProblem::Invalid | SubjectProblem::Special)) = page.problem() {
        return Err(Error::Subject {
            action,
            subject: subject.to_string(),
            problem,
        });
    }

    let value = page
        .extra_str(&kind.response_key())
        .ok_or_else(|| Error::TokenAbsent {
            action,
            subject: subject.to_string(),
        })?
        .to_string();

    let existence = if page.missing {
        Existence::New
    } else {
        Existence::Existing
    };

    Ok(ActionToken {
        kind,
        value,
        scope: subject.to_string(),
        existence,
        start_timestamp: page.starttimestamp.clone(),
        base_timestamp: page.revisions.first().and_then(|r| r.timestamp.clone()),
    })
}

impl ActionToken {
    /// Fail with a missing-subject error unless the page exists
    pub fn require_existing(&self, action: ActionKind) -> Result<()> {
        match self.existence {
            Existence::Existing => Ok(()),
            Existence::New => Err(Error::Subject {
                action,
                subject: self.scope.clone(),
                problem: SubjectProblem::Missing,
            }),
        }
    }
}

/// Warning bodies are `{"*": text}` in the legacy format and
/// `{"warnings": text}` in the newer one
fn warning_text(warning: &Value) -> String {
    warning
        .get("*")
        .or_else(|| warning.get("warnings"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| warning.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::ScriptedTransport;
    use serde_json::json;

    fn page_reply(page: Value) -> Value {
        json!({"query": {"pages": {"1": page}}})
    }

    #[tokio::test]
    async fn test_edit_token_for_existing_page() {
        let transport = ScriptedTransport::new([json!({
            "query": {"pages": {"42": {
                "pageid": 42, "ns": 0, "title": "Sandbox",
                "starttimestamp": "2024-05-01T10:00:00Z",
                "edittoken": "abc+\\",
                "revisions": [{"timestamp": "2024-04-30T08:00:00Z"}]
            }}}
        })]);

        let token = acquire_token(&transport, ActionKind::Edit, "Sandbox")
            .await
            .unwrap();
        assert_eq!(token.value, "abc+\\");
        assert_eq!(token.kind, TokenKind::Edit);
        assert!(token.exists());
        assert_eq!(token.start_timestamp.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(token.base_timestamp.as_deref(), Some("2024-04-30T08:00:00Z"));

        let call = &transport.calls()[0];
        assert_eq!(call.method, "GET");
        assert_eq!(call.params.get("intoken"), Some("edit"));
        assert_eq!(call.params.get("prop"), Some("info|revisions"));
        assert_eq!(call.params.get("titles"), Some("Sandbox"));
    }

    #[tokio::test]
    async fn test_missing_page_yields_new_token() {
        let transport = ScriptedTransport::new([page_reply(json!({
            "ns": 0, "title": "Nowhere", "missing": "", "edittoken": "t+\\"
        }))]);

        let token = acquire_token(&transport, ActionKind::Create, "Nowhere")
            .await
            .unwrap();
        assert_eq!(token.existence, Existence::New);
        assert!(matches!(
            token.require_existing(ActionKind::Create),
            Err(Error::Subject { problem: SubjectProblem::Missing, .. })
        ));
    }

    #[tokio::test]
    async fn test_warning_wins_over_subject_problems() {
        let transport = ScriptedTransport::new([json!({
            "warnings": {"info": {"*": "Action 'block' is not allowed for the current user"}},
            "query": {"pages": {"-1": {"ns": 2, "title": "User:X", "missing": ""}}}
        })]);

        let err = acquire_token(&transport, ActionKind::Block, "User:X")
            .await
            .unwrap_err();
        match err {
            Error::TokenDenied { warning, .. } => assert!(warning.contains("not allowed")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_and_special_subjects() {
        let transport = ScriptedTransport::new([
            page_reply(json!({"title": "Bad|Title", "invalid": ""})),
            page_reply(json!({"ns": -1, "title": "Special:Random", "special": ""})),
        ]);

        let err = acquire_token(&transport, ActionKind::Delete, "Bad|Title")
            .await
            .unwrap_err();
        assert_eq!(err.code(), 202);

        let err = acquire_token(&transport, ActionKind::Delete, "Special:Random")
            .await
            .unwrap_err();
        assert_eq!(err.code(), 203);
    }

    #[tokio::test]
    async fn test_absent_token() {
        let transport = ScriptedTransport::new([page_reply(json!({
            "ns": 0, "title": "Locked", "pageid": 7
        }))]);

        let err = acquire_token(&transport, ActionKind::Protect, "Locked")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TokenAbsent { .. }));
        assert_eq!(transport.calls()[0].params.get("intoken"), Some("protect"));
    }

    #[tokio::test]
    async fn test_upload_uses_edit_token() {
        let transport = ScriptedTransport::new([page_reply(json!({
            "ns": 6, "title": "File:Logo.png", "missing": "", "edittoken": "u+\\"
        }))]);

        let token = acquire_token(&transport, ActionKind::Upload, "File:Logo.png")
            .await
            .unwrap();
        assert_eq!(token.value, "u+\\");
        assert_eq!(transport.calls()[0].params.get("intoken"), Some("edit"));
    }

    #[test]
    fn test_warning_text_formats() {
        assert_eq!(warning_text(&json!({"*": "legacy"})), "legacy");
        assert_eq!(warning_text(&json!({"warnings": "modern"})), "modern");
    }
}
