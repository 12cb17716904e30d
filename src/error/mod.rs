//! Error handling for the bot
//!
//! This module defines error types and the mapping from MediaWiki error
//! codes to failure classes.

pub mod codes;
pub mod types;

pub use codes::classify;
pub use types::{Error, FailureKind, Result, SubjectProblem};
