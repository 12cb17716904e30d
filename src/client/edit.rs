//! Saving page text

use super::{WikiClientGeneric, exclusion, outcome};
use crate::{
    Error, Result,
    error::FailureKind,
    session::Transport,
    types::{ActionKind, ApiParams, EditOptions, EditOutcome, Existence, PageEditContext},
};
use serde_json::Value;
use tracing::{debug, info};

impl<T: Transport> WikiClientGeneric<T> {
    /// Replace the text of a page, creating it if needed
    pub async fn edit_page(
        &self,
        title: &str,
        text: &str,
        options: &EditOptions,
    ) -> Result<EditOutcome> {
        self.save(ActionKind::Edit, title, text, options).await
    }

    /// Create a page that must not exist yet
    pub async fn create_page(&self, title: &str, text: &str, summary: &str) -> Result<EditOutcome> {
        self.save(ActionKind::Create, title, text, &EditOptions::new(summary))
            .await
    }

    async fn save(
        &self,
        action: ActionKind,
        title: &str,
        text: &str,
        options: &EditOptions,
    ) -> Result<EditOutcome> {
        let token = self.token(action, title).await?;
        let context = PageEditContext::from_token(title, token);

        if action == ActionKind::Create && context.existence == Existence::Existing {
            return Err(Error::action(
                action,
                FailureKind::Exists,
                format!("{title} already exists"),
            ));
        }

        let current = self.current_text(title).await?;
        check_edit(action, &current, text, options, self.user())?;

        let reply = self
            .submit(action, edit_params(action, &context, text, options))
            .await?;
        let result = reply
            .pointer("/edit/result")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if result != "Success" {
            return Err(Error::action(
                action,
                FailureKind::Generic,
                format!("edit of {title} ended with '{result}': {reply}"),
            ));
        }

        let saved: EditOutcome = outcome(action, &reply, "edit")?;
        info!("Saved {} (revision {:?})", title, saved.new_revid);

        let pause = self.profile().edit_pacing();
        if !pause.is_zero() {
            debug!("Pausing {:?} after edit", pause);
            tokio::time::sleep(pause).await;
        }
        Ok(saved)
    }
}

/// Local checks before an edit is sent: unchanged text first, then
/// blanking, then bot exclusion for bot edits
pub(crate) fn check_edit(
    action: ActionKind,
    current: &str,
    new: &str,
    options: &EditOptions,
    user: &str,
) -> Result<()> {
    if current == new {
        return Err(Error::action(
            action,
            FailureKind::SameContent,
            "new text is identical to the current text",
        ));
    }
    if new.is_empty() && !options.force {
        return Err(Error::action(
            action,
            FailureKind::BlankContent,
            "refusing to blank the page without force",
        ));
    }
    if options.bot && exclusion::is_excluded(current, user) {
        return Err(Error::action(
            action,
            FailureKind::Forbidden,
            format!("page opts out of edits by {user}"),
        ));
    }
    Ok(())
}

fn edit_params(
    action: ActionKind,
    context: &PageEditContext,
    text: &str,
    options: &EditOptions,
) -> ApiParams {
    let existing = context.existence == Existence::Existing;
    ApiParams::action("edit")
        .set("title", context.title.as_str())
        .set("text", text)
        .set("summary", options.summary.as_str())
        .opt("basetimestamp", context.base_timestamp.as_deref())
        .opt("starttimestamp", context.start_timestamp.as_deref())
        .flag("minor", options.minor)
        .flag("notminor", !options.minor)
        .flag("bot", options.bot)
        .flag("createonly", action == ActionKind::Create)
        .flag("nocreate", action == ActionKind::Edit && existing)
        .set("token", context.token.as_str())
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn saved(title: &str) -> Value {
        json!({"edit": {
            "result": "Success", "pageid": 42, "title": title,
            "oldrevid": 100, "newrevid": 101, "newtimestamp": "2024-05-01T10:00:05Z"
        }})
    }

    #[tokio::test]
    async fn test_edit_sequence_and_params() {
        let (client, transport) = client([
            token_reply("Sandbox", "edittoken", true),
            content_reply("Sandbox", Some("old")),
            saved("Sandbox"),
        ])
        .await;

        let outcome = client
            .edit_page("Sandbox", "new", &EditOptions::new("tidy").with_minor(true))
            .await
            .unwrap();
        assert_eq!(outcome.new_revid, Some(101));

        assert_eq!(
            transport.actions(),
            vec!["POST login", "GET query", "GET query", "POST edit"]
        );
        let post = &transport.calls()[3].params;
        assert_eq!(post.get("token"), Some("tok+\\"));
        assert_eq!(post.get("basetimestamp"), Some("2024-04-30T08:00:00Z"));
        assert_eq!(post.get("starttimestamp"), Some("2024-05-01T10:00:00Z"));
        assert_eq!(post.get("minor"), Some("1"));
        assert_eq!(post.get("notminor"), None);
        assert_eq!(post.get("nocreate"), Some("1"));
        assert_eq!(post.get("createonly"), None);
    }

    #[tokio::test]
    async fn test_same_content_sends_nothing() {
        let (client, transport) = client([
            token_reply("Sandbox", "edittoken", true),
            content_reply("Sandbox", Some("same")),
        ])
        .await;

        let err = client
            .edit_page("Sandbox", "same", &EditOptions::new("noop"))
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::SameContent));
        assert_eq!(err.code(), 1007);
        assert!(!transport.actions().contains(&"POST edit".to_string()));
    }

    #[tokio::test]
    async fn test_create_on_existing_page() {
        let (client, transport) = client([token_reply("Sandbox", "edittoken", true)]).await;

        let err = client
            .create_page("Sandbox", "text", "new page")
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::Exists));
        assert_eq!(err.code(), 1106);
        assert_eq!(transport.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_create_new_page() {
        let (client, transport) = client([
            token_reply("Fresh", "edittoken", false),
            content_reply("Fresh", None),
            json!({"edit": {"result": "Success", "title": "Fresh", "new": "", "newrevid": 5}}),
        ])
        .await;

        let outcome = client.create_page("Fresh", "Hello", "start").await.unwrap();
        assert!(outcome.created);
        let post = &transport.calls()[3].params;
        assert_eq!(post.get("createonly"), Some("1"));
        assert_eq!(post.get("basetimestamp"), None);
    }

    #[tokio::test]
    async fn test_remote_edit_conflict() {
        let (client, _) = client([
            token_reply("Sandbox", "edittoken", true),
            content_reply("Sandbox", Some("old")),
            json!({"error": {"code": "editconflict", "info": "Edit conflict detected"}}),
        ])
        .await;

        let err = client
            .edit_page("Sandbox", "new", &EditOptions::new("x"))
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::Generic));
    }

    #[tokio::test]
    async fn test_non_success_result() {
        let (client, _) = client([
            token_reply("Sandbox", "edittoken", true),
            content_reply("Sandbox", Some("old")),
            json!({"edit": {"result": "Failure", "captcha": {"type": "image"}}}),
        ])
        .await;

        let err = client
            .edit_page("Sandbox", "new", &EditOptions::new("x"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), 1000);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_after_successful_edit_only() {
        let paced = profile().with_edits_per_minute(6);
        let (client, _) = client_with_profile(
            paced,
            [
                token_reply("Sandbox", "edittoken", true),
                content_reply("Sandbox", Some("old")),
                saved("Sandbox"),
                token_reply("Sandbox", "edittoken", true),
                content_reply("Sandbox", Some("new")),
                json!({"error": {"code": "editconflict", "info": "Edit conflict detected"}}),
            ],
        )
        .await;

        let start = tokio::time::Instant::now();
        client
            .edit_page("Sandbox", "new", &EditOptions::new("first"))
            .await
            .unwrap();
        assert_eq!(start.elapsed().as_secs(), 10);

        let start = tokio::time::Instant::now();
        let err = client
            .edit_page("Sandbox", "newer", &EditOptions::new("second"))
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::Generic));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_blank_content_needs_force() {
        let options = EditOptions::new("blank");
        let err = check_edit(ActionKind::Edit, "text", "", &options, "Bot").unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::BlankContent));

        let forced = options.clone().with_force(true);
        assert!(check_edit(ActionKind::Edit, "text", "", &forced, "Bot").is_ok());
    }

    #[test]
    fn test_whitespace_only_text_is_not_blank() {
        let options = EditOptions::new("spacing");
        assert!(check_edit(ActionKind::Edit, "text", "  \n", &options, "Bot").is_ok());
    }

    #[test]
    fn test_same_content_checked_before_blank() {
        let err = check_edit(ActionKind::Edit, "", "", &EditOptions::new("x"), "Bot").unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::SameContent));
    }

    #[test]
    fn test_exclusion_blocks_bot_edit() {
        let options = EditOptions::new("x").with_bot(true);
        let err = check_edit(ActionKind::Edit, "{{nobots}} body", "new body", &options, "Bot")
            .unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::Forbidden));
        assert_eq!(err.code(), 1001);

        let manual = EditOptions::new("x");
        assert!(
            check_edit(ActionKind::Edit, "{{nobots}} body", "new body", &manual, "Bot").is_ok()
        );
    }
}
