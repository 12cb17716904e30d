//! Error type definitions
//!
//! Defines the main error type used throughout the bot. Every variant maps to
//! a stable numeric code (see [`Error::code`]) so callers can branch on the
//! failure without matching message text.

use crate::types::ActionKind;
use thiserror::Error;

/// What is wrong with the page or user a request was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectProblem {
    /// The title does not exist
    Missing,
    /// The title is malformed
    Invalid,
    /// The title is a special page (virtual namespace)
    Special,
}

impl SubjectProblem {
    fn offset(self) -> u32 {
        match self {
            SubjectProblem::Missing => 1,
            SubjectProblem::Invalid => 2,
            SubjectProblem::Special => 3,
        }
    }
}

impl std::fmt::Display for SubjectProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            SubjectProblem::Missing => "does not exist",
            SubjectProblem::Invalid => "is not a valid title",
            SubjectProblem::Special => "is a special page",
        };
        f.write_str(text)
    }
}

/// Outcome class of a failed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Unrecognized remote code, or no success marker in the reply
    Generic,
    /// The account lacks the right, or the subject is protected
    Forbidden,
    /// The account is blocked
    Blocked,
    /// The subject is already in the requested state
    AlreadyDone,
    /// Expiry, level, title or another parameter was rejected
    InvalidParameter,
    /// The subject (page, user, block, file) was not found
    NotFound,
    /// The target already exists
    Exists,
    /// The new text equals the current text
    SameContent,
    /// The new text is empty and blanking was not forced
    BlankContent,
}

impl FailureKind {
    /// Offset added to the action's code base
    pub fn offset(self) -> u32 {
        match self {
            FailureKind::Generic => 0,
            FailureKind::Forbidden => 1,
            FailureKind::Blocked => 2,
            FailureKind::AlreadyDone => 3,
            FailureKind::InvalidParameter => 4,
            FailureKind::NotFound => 5,
            FailureKind::Exists => 6,
            FailureKind::SameContent => 7,
            FailureKind::BlankContent => 8,
        }
    }

    /// Short human readable label
    pub fn label(self) -> &'static str {
        match self {
            FailureKind::Generic => "Operation Failure",
            FailureKind::Forbidden => "Forbidden",
            FailureKind::Blocked => "Blocked",
            FailureKind::AlreadyDone => "Already Done",
            FailureKind::InvalidParameter => "Invalid Parameter",
            FailureKind::NotFound => "Not Found",
            FailureKind::Exists => "Already Exists",
            FailureKind::SameContent => "Same Content",
            FailureKind::BlankContent => "Blank Content",
        }
    }
}

/// Main error type for the bot
#[derive(Error, Debug)]
pub enum Error {
    /// The login handshake was rejected
    #[error("LoginFailure: {reason}")]
    LoginFailed {
        reason: String,
        /// Raw reply for inspection
        payload: serde_json::Value,
    },

    /// The server kept asking us to wait
    #[error("LoginFailure: still rate limited after {attempts} attempts")]
    LoginRetriesExhausted { attempts: u32 },

    /// An operation was attempted before logging in
    #[error("Not logged in")]
    NotAuthenticated,

    /// Token acquisition hit a bad subject
    #[error("{action} token for {subject}: page {problem}")]
    Subject {
        action: ActionKind,
        subject: String,
        problem: SubjectProblem,
    },

    /// The account is not allowed to perform the action
    #[error("{action} is not allowed on {subject}: {warning}")]
    TokenDenied {
        action: ActionKind,
        subject: String,
        warning: String,
    },

    /// The reply carried no token for the requested action
    #[error("no {action} token returned for {subject}")]
    TokenAbsent { action: ActionKind, subject: String },

    /// A read hit a missing, malformed or special page
    #[error("page {title} {problem}")]
    Page {
        title: String,
        problem: SubjectProblem,
    },

    /// Site metadata did not contain the requested field
    #[error("site info has no field '{0}'")]
    SiteInfoField(String),

    /// A mutation failed, either remotely or by a local guard
    #[error("{action} failed ({}): {info}", kind.label())]
    Action {
        action: ActionKind,
        kind: FailureKind,
        /// Remote error code, or a local guard name
        code: String,
        info: String,
    },

    /// The API refused a non-mutating request
    #[error("API error {code}: {info}")]
    Api { code: String, info: String },

    /// Network/HTTP client errors
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Password blob could not be encrypted or decrypted
    #[error("Credential error: {0}")]
    Credentials(String),

    /// The reply did not have the expected shape
    #[error("Unexpected API response: {0}")]
    UnexpectedResponse(String),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable numeric code of this error
    pub fn code(&self) -> u32 {
        match self {
            Error::LoginFailed { .. } => 101,
            Error::LoginRetriesExhausted { .. } => 102,
            Error::NotAuthenticated => 103,
            Error::Subject { problem, .. } => 200 + problem.offset(),
            Error::TokenDenied { .. } => 204,
            Error::TokenAbsent { .. } => 205,
            Error::Page { problem, .. } => 300 + problem.offset(),
            Error::SiteInfoField(_) => 304,
            Error::Action { action, kind, .. } => action.code_base() + kind.offset(),
            Error::Network(_) => 901,
            Error::Json(_) => 902,
            Error::Io(_) => 903,
            Error::Config(_) => 904,
            Error::Credentials(_) => 905,
            Error::UnexpectedResponse(_) => 906,
            Error::Internal(_) => 907,
            Error::Api { .. } => 908,
        }
    }

    /// Failure class of a mutation error
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Error::Action { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Create a mutation error raised by a local check
    pub fn action(action: ActionKind, kind: FailureKind, info: impl Into<String>) -> Self {
        Self::Action {
            action,
            kind,
            code: kind.label().to_lowercase().replace(' ', "-"),
            info: info.into(),
        }
    }

    /// Create a mutation error from a remote error code
    pub fn remote(action: ActionKind, code: impl Into<String>, info: impl Into<String>) -> Self {
        let code = code.into();
        Self::Action {
            action,
            kind: super::codes::classify(action, &code),
            code,
            info: info.into(),
        }
    }

    /// Create a login rejection carrying the server reply
    pub fn login_failed(reason: impl Into<String>, payload: serde_json::Value) -> Self {
        Self::LoginFailed {
            reason: reason.into(),
            payload,
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new credential error
    pub fn credentials(msg: impl Into<String>) -> Self {
        Self::Credentials(msg.into())
    }

    /// Create an unexpected response error
    pub fn unexpected(msg: impl Into<String>) -> Self {
        Self::UnexpectedResponse(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
