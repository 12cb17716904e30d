//! Type definitions for the bot
//!
//! This module contains request builders, decoded replies and the action
//! and token types shared by the session and the client.

pub mod internal;
pub mod request;
pub mod response;
pub mod serde_helpers;

pub use internal::{ActionKind, ActionToken, AuthState, Existence, PageEditContext, TokenKind};
pub use request::{
    ApiParams, BlockOptions, EditOptions, EmailMessage, MoveOptions, ProtectOptions, Protection,
    UploadRequest, UploadSource,
};
pub use response::{
    ApiError, ApiReply, BlockOutcome, CategoryPage, DeleteOutcome, EditOutcome, ExportedPage,
    MoveOutcome, PageEntry, ProtectOutcome, UnblockOutcome, UndeleteOutcome, UploadData, WikiPage,
    first_page, query_pages,
};
