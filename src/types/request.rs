//! Request type definitions
//!
//! Defines the API parameter builder and the options accepted by each
//! mutating operation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Ordered list of API parameters for one request
///
/// Keys are unique: setting a key twice replaces the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiParams {
    pairs: Vec<(String, String)>,
}

impl ApiParams {
    /// Start a request for the given `action`
    pub fn action(name: impl Into<String>) -> Self {
        Self::default().set("action", name)
    }

    /// Start an `action=query` request
    pub fn query() -> Self {
        Self::action("query")
    }

    /// Set a parameter
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set a boolean parameter; MediaWiki treats any present value as true,
    /// so false means leaving the key out
    pub fn flag(self, key: impl Into<String>, on: bool) -> Self {
        if on { self.set(key, "1") } else { self }
    }

    /// Set a parameter when a value is given
    pub fn opt(self, key: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    /// Set a parameter in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    /// Look up a parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `action` parameter, if set
    pub fn action_name(&self) -> Option<&str> {
        self.get("action")
    }

    /// All parameters in insertion order
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }
}

/// Options for `edit_page`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditOptions {
    /// Edit summary
    pub summary: String,
    /// Mark as a minor edit
    pub minor: bool,
    /// Mark as a bot edit; also enables the bot exclusion check
    pub bot: bool,
    /// Allow saving empty text
    pub force: bool,
}

impl EditOptions {
    /// Create options with the given summary
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            ..Default::default()
        }
    }

    /// Set minor edit flag
    pub fn with_minor(mut self, minor: bool) -> Self {
        self.minor = minor;
        self
    }

    /// Set bot edit flag
    pub fn with_bot(mut self, bot: bool) -> Self {
        self.bot = bot;
        self
    }

    /// Allow blanking the page
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Options for `move_page`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoveOptions {
    pub reason: String,
    /// Move the talk page too
    pub move_talk: bool,
    /// Move subpages too
    pub move_subpages: bool,
    /// Do not leave a redirect behind
    pub no_redirect: bool,
}

impl Default for MoveOptions {
    fn default() -> Self {
        Self {
            reason: String::new(),
            move_talk: true,
            move_subpages: false,
            no_redirect: false,
        }
    }
}

impl MoveOptions {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            ..Default::default()
        }
    }

    pub fn with_move_talk(mut self, move_talk: bool) -> Self {
        self.move_talk = move_talk;
        self
    }

    pub fn with_move_subpages(mut self, move_subpages: bool) -> Self {
        self.move_subpages = move_subpages;
        self
    }

    pub fn with_no_redirect(mut self, no_redirect: bool) -> Self {
        self.no_redirect = no_redirect;
        self
    }
}

/// One protection rule, e.g. `edit=sysop`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protection {
    /// Restricted action (`edit`, `move`, `upload`, `create`)
    pub action: String,
    /// Required group (`autoconfirmed`, `sysop`, `all` to lift)
    pub level: String,
}

impl Protection {
    pub fn new(action: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            level: level.into(),
        }
    }

    /// Parse `action=level`
    pub fn parse(spec: &str) -> Option<Self> {
        let (action, level) = spec.split_once('=')?;
        let (action, level) = (action.trim(), level.trim());
        if action.is_empty() || level.is_empty() {
            return None;
        }
        Some(Self::new(action, level))
    }
}

/// Options for `protect_page` and `protect_title`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectOptions {
    pub reason: String,
    pub protections: Vec<Protection>,
    /// Applied to every protection
    pub expiry: String,
    /// Protect transcluded pages too
    pub cascade: bool,
}

impl Default for ProtectOptions {
    fn default() -> Self {
        Self {
            reason: String::new(),
            protections: Vec::new(),
            expiry: "infinite".to_string(),
            cascade: false,
        }
    }
}

impl ProtectOptions {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            ..Default::default()
        }
    }

    pub fn with_protection(mut self, action: impl Into<String>, level: impl Into<String>) -> Self {
        self.protections.push(Protection::new(action, level));
        self
    }

    pub fn with_expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = expiry.into();
        self
    }

    pub fn with_cascade(mut self, cascade: bool) -> Self {
        self.cascade = cascade;
        self
    }

    /// `edit=sysop|move=sysop`
    pub fn protections_param(&self) -> String {
        self.protections
            .iter()
            .map(|p| format!("{}={}", p.action, p.level))
            .collect::<Vec<_>>()
            .join("|")
    }

    /// One expiry per protection, joined by `|`
    pub fn expiry_param(&self) -> String {
        vec![self.expiry.as_str(); self.protections.len().max(1)].join("|")
    }
}

/// Options for `block_user`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockOptions {
    pub reason: String,
    pub expiry: String,
    /// Only block anonymous users (IP blocks)
    pub anon_only: bool,
    /// Prevent account creation
    pub no_create: bool,
    /// Block the last used IP and later ones
    pub autoblock: bool,
    /// Prevent sending email through the wiki
    pub no_email: bool,
    /// Hide the user name from logs (oversight right)
    pub hide_name: bool,
    /// Allow editing the own talk page
    pub allow_user_talk: bool,
    /// Overwrite an existing block
    pub reblock: bool,
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self {
            reason: String::new(),
            expiry: "infinite".to_string(),
            anon_only: false,
            no_create: true,
            autoblock: true,
            no_email: false,
            hide_name: false,
            allow_user_talk: true,
            reblock: false,
        }
    }
}

impl BlockOptions {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            ..Default::default()
        }
    }

    pub fn with_expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = expiry.into();
        self
    }

    pub fn with_anon_only(mut self, anon_only: bool) -> Self {
        self.anon_only = anon_only;
        self
    }

    pub fn with_no_create(mut self, no_create: bool) -> Self {
        self.no_create = no_create;
        self
    }

    pub fn with_autoblock(mut self, autoblock: bool) -> Self {
        self.autoblock = autoblock;
        self
    }

    pub fn with_no_email(mut self, no_email: bool) -> Self {
        self.no_email = no_email;
        self
    }

    pub fn with_reblock(mut self, reblock: bool) -> Self {
        self.reblock = reblock;
        self
    }
}

/// Mail sent through `Special:EmailUser`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailMessage {
    pub subject: String,
    pub text: String,
    /// Send a copy to ourselves
    pub cc_me: bool,
}

impl EmailMessage {
    pub fn new(subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            text: text.into(),
            cc_me: false,
        }
    }

    pub fn with_cc_me(mut self, cc_me: bool) -> Self {
        self.cc_me = cc_me;
        self
    }
}

/// Where an uploaded file comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadSource {
    /// Let the wiki fetch the file itself
    Url(String),
    /// Send a local file as multipart form data
    File(PathBuf),
}

/// Request for `upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRequest {
    /// Target file name, without the `File:` prefix
    pub filename: String,
    pub source: UploadSource,
    /// Upload log comment
    pub comment: String,
    /// Initial description page text
    pub text: Option<String>,
    /// Upload even if the wiki warns (duplicates, existing file)
    pub ignore_warnings: bool,
}

impl UploadRequest {
    /// Upload from a remote URL
    pub fn from_url(filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(filename, UploadSource::Url(url.into()))
    }

    /// Upload a local file
    pub fn from_file(filename: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::new(filename, UploadSource::File(path.into()))
    }

    fn new(filename: impl Into<String>, source: UploadSource) -> Self {
        Self {
            filename: filename.into(),
            source,
            comment: String::new(),
            text: None,
            ignore_warnings: false,
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_ignore_warnings(mut self, ignore_warnings: bool) -> Self {
        self.ignore_warnings = ignore_warnings;
        self
    }

    /// Title of the file description page
    pub fn file_title(&self) -> String {
        format!("File:{}", self.filename)
    }
}
