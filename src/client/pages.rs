//! Page administration: move, delete, undelete, protect

use super::{WikiClientGeneric, outcome};
use crate::{
    Error, Result,
    error::FailureKind,
    session::Transport,
    types::{
        ActionKind, ActionToken, ApiParams, DeleteOutcome, MoveOutcome, MoveOptions,
        ProtectOptions, ProtectOutcome, UndeleteOutcome,
    },
};
use tracing::info;

impl<T: Transport> WikiClientGeneric<T> {
    /// Move an existing page to a new title
    pub async fn move_page(
        &self,
        from: &str,
        to: &str,
        options: &MoveOptions,
    ) -> Result<MoveOutcome> {
        let action = ActionKind::Move;
        let token = self.token(action, from).await?;
        token.require_existing(action)?;

        let params = ApiParams::action("move")
            .set("from", from)
            .set("to", to)
            .set("reason", options.reason.as_str())
            .flag("movetalk", options.move_talk)
            .flag("movesubpages", options.move_subpages)
            .flag("noredirect", options.no_redirect)
            .set("token", token.value);
        let reply = self.submit(action, params).await?;
        let moved: MoveOutcome = outcome(action, &reply, "move")?;
        info!("Moved {} to {}", moved.from, moved.to);
        Ok(moved)
    }

    /// Delete an existing page
    pub async fn delete_page(&self, title: &str, reason: &str) -> Result<DeleteOutcome> {
        let action = ActionKind::Delete;
        let token = self.token(action, title).await?;
        token.require_existing(action)?;

        let params = ApiParams::action("delete")
            .set("title", title)
            .set("reason", reason)
            .set("token", token.value);
        let reply = self.submit(action, params).await?;
        let deleted: DeleteOutcome = outcome(action, &reply, "delete")?;
        info!("Deleted {}", deleted.title);
        Ok(deleted)
    }

    /// Restore the deleted revisions of a title
    pub async fn undelete_page(&self, title: &str, reason: &str) -> Result<UndeleteOutcome> {
        let action = ActionKind::Undelete;
        let token = self.token(action, title).await?;

        let params = ApiParams::action("undelete")
            .set("title", title)
            .set("reason", reason)
            .set("token", token.value);
        let reply = self.submit(action, params).await?;
        let restored: UndeleteOutcome = outcome(action, &reply, "undelete")?;
        info!("Restored {} revisions of {}", restored.revisions, restored.title);
        Ok(restored)
    }

    /// Change the protection of an existing page
    pub async fn protect_page(
        &self,
        title: &str,
        options: &ProtectOptions,
    ) -> Result<ProtectOutcome> {
        let action = ActionKind::Protect;
        if options.protections.is_empty() {
            return Err(Error::action(
                action,
                FailureKind::InvalidParameter,
                "no protections given",
            ));
        }
        let token = self.token(action, title).await?;
        token.require_existing(action)?;
        self.submit_protection(title, options, token).await
    }

    /// Protect a title that does not exist yet against creation
    pub async fn protect_title(
        &self,
        title: &str,
        options: &ProtectOptions,
    ) -> Result<ProtectOutcome> {
        let action = ActionKind::Protect;
        if options.protections.is_empty()
            || options.protections.iter().any(|p| p.action != "create")
        {
            return Err(Error::action(
                action,
                FailureKind::InvalidParameter,
                "a missing title only takes create protections",
            ));
        }
        let token = self.token(action, title).await?;
        if token.exists() {
            return Err(Error::action(
                action,
                FailureKind::Exists,
                format!("{title} exists, use protect_page"),
            ));
        }
        self.submit_protection(title, options, token).await
    }

    async fn submit_protection(
        &self,
        title: &str,
        options: &ProtectOptions,
        token: ActionToken,
    ) -> Result<ProtectOutcome> {
        let action = ActionKind::Protect;
        let params = ApiParams::action("protect")
            .set("title", title)
            .set("protections", options.protections_param())
            .set("expiry", options.expiry_param())
            .set("reason", options.reason.as_str())
            .flag("cascade", options.cascade)
            .set("token", token.value);
        let reply = self.submit(action, params).await?;
        let protected: ProtectOutcome = outcome(action, &reply, "protect")?;
        info!("Protected {} ({})", protected.title, options.protections_param());
        Ok(protected)
    }
}
