//! Account administration: block, unblock, email

use super::{WikiClientGeneric, outcome, user_page};
use crate::{
    Error, Result,
    error::FailureKind,
    session::Transport,
    types::{ActionKind, ApiParams, BlockOptions, BlockOutcome, EmailMessage, UnblockOutcome},
};
use serde_json::Value;
use tracing::info;

impl<T: Transport> WikiClientGeneric<T> {
    /// Block a user or IP address
    pub async fn block_user(&self, user: &str, options: &BlockOptions) -> Result<BlockOutcome> {
        let action = ActionKind::Block;
        let token = self.token(action, &user_page(user)).await?;

        let params = ApiParams::action("block")
            .set("user", user)
            .set("expiry", options.expiry.as_str())
            .set("reason", options.reason.as_str())
            .flag("anononly", options.anon_only)
            .flag("nocreate", options.no_create)
            .flag("autoblock", options.autoblock)
            .flag("noemail", options.no_email)
            .flag("hidename", options.hide_name)
            .flag("allowusertalk", options.allow_user_talk)
            .flag("reblock", options.reblock)
            .set("token", token.value);
        let reply = self.submit(action, params).await?;
        let blocked: BlockOutcome = outcome(action, &reply, "block")?;
        info!("Blocked {} until {}", blocked.user, blocked.expiry);
        Ok(blocked)
    }

    /// Lift the block on a user
    pub async fn unblock_user(&self, user: &str, reason: &str) -> Result<UnblockOutcome> {
        let action = ActionKind::Unblock;
        let token = self.token(action, &user_page(user)).await?;

        let params = ApiParams::action("unblock")
            .set("user", user)
            .set("reason", reason)
            .set("token", token.value);
        let reply = self.submit(action, params).await?;
        let unblocked: UnblockOutcome = outcome(action, &reply, "unblock")?;
        info!("Unblocked {}", unblocked.user);
        Ok(unblocked)
    }

    /// Send an email through the wiki
    pub async fn email_user(&self, target: &str, message: &EmailMessage) -> Result<()> {
        let action = ActionKind::Email;
        let token = self.token(action, &user_page(target)).await?;

        let params = ApiParams::action("emailuser")
            .set("target", target)
            .set("subject", message.subject.as_str())
            .set("text", message.text.as_str())
            .flag("ccme", message.cc_me)
            .set("token", token.value);
        let reply = self.submit(action, params).await?;

        match reply.pointer("/emailuser/result").and_then(Value::as_str) {
            Some("Success") => {
                info!("Sent email to {}", target);
                Ok(())
            }
            other => Err(Error::action(
                action,
                FailureKind::Generic,
                format!("email to {target} ended with {other:?}: {reply}"),
            )),
        }
    }
}
