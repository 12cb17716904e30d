//! Internal data structures
//!
//! Defines the action and token types used by the session and the
//! mutation executors.

use serde::{Deserialize, Serialize};

/// Every mutating operation the client can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Edit,
    Create,
    Move,
    Delete,
    Undelete,
    Protect,
    Block,
    Unblock,
    Upload,
    Email,
}

impl ActionKind {
    /// Token type required by this action
    pub fn token_kind(self) -> TokenKind {
        match self {
            ActionKind::Edit | ActionKind::Create => TokenKind::Edit,
            ActionKind::Move => TokenKind::Move,
            ActionKind::Delete | ActionKind::Undelete => TokenKind::Delete,
            ActionKind::Protect => TokenKind::Protect,
            ActionKind::Block => TokenKind::Block,
            ActionKind::Unblock => TokenKind::Unblock,
            ActionKind::Upload => TokenKind::Upload,
            ActionKind::Email => TokenKind::Email,
        }
    }

    /// First error code of this action's family
    pub fn code_base(self) -> u32 {
        match self {
            ActionKind::Edit => 1000,
            ActionKind::Create => 1100,
            ActionKind::Move => 1200,
            ActionKind::Delete => 1300,
            ActionKind::Undelete => 1400,
            ActionKind::Protect => 1500,
            ActionKind::Block => 1600,
            ActionKind::Unblock => 1700,
            ActionKind::Upload => 1800,
            ActionKind::Email => 1900,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Edit => "edit",
            ActionKind::Create => "create",
            ActionKind::Move => "move",
            ActionKind::Delete => "delete",
            ActionKind::Undelete => "undelete",
            ActionKind::Protect => "protect",
            ActionKind::Block => "block",
            ActionKind::Unblock => "unblock",
            ActionKind::Upload => "upload",
            ActionKind::Email => "email",
        }
    }
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token types understood by `prop=info&intoken=`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Edit,
    Move,
    Delete,
    Protect,
    Block,
    Unblock,
    Email,
    Upload,
}

impl TokenKind {
    /// Value sent as `intoken`
    pub fn param(self) -> &'static str {
        match self {
            // uploads are authorized by the edit token
            TokenKind::Edit | TokenKind::Upload => "edit",
            TokenKind::Move => "move",
            TokenKind::Delete => "delete",
            TokenKind::Protect => "protect",
            TokenKind::Block => "block",
            TokenKind::Unblock => "unblock",
            TokenKind::Email => "email",
        }
    }

    /// Key holding the token in a page entry
    pub fn response_key(self) -> String {
        format!("{}token", self.param())
    }
}

/// Authentication state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    /// First login phase answered `NeedToken`
    TokenRequested,
    Authenticated,
    LoginFailed,
}

/// Whether the subject of a token existed when it was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    New,
    Existing,
}

/// A token issued for one action on one subject
///
/// Tokens are acquired right before the request that uses them and dropped
/// afterwards; they are never cached.
#[derive(Debug, Clone)]
pub struct ActionToken {
    pub kind: TokenKind,
    pub value: String,
    /// Page title (or `User:` page) the token was requested for
    pub scope: String,
    pub existence: Existence,
    /// Server time when the token was issued
    pub start_timestamp: Option<String>,
    /// Timestamp of the latest revision, edit tokens only
    pub base_timestamp: Option<String>,
}

impl ActionToken {
    pub fn exists(&self) -> bool {
        self.existence == Existence::Existing
    }
}

/// Everything an edit request needs to let the server detect conflicts
///
/// Built inside one edit call and consumed by it.
#[derive(Debug, Clone)]
pub struct PageEditContext {
    pub title: String,
    pub base_timestamp: Option<String>,
    pub start_timestamp: Option<String>,
    pub token: String,
    pub existence: Existence,
}

impl PageEditContext {
    pub fn from_token(title: impl Into<String>, token: ActionToken) -> Self {
        Self {
            title: title.into(),
            base_timestamp: token.base_timestamp,
            start_timestamp: token.start_timestamp,
            token: token.value,
            existence: token.existence,
        }
    }
}
