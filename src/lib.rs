//! wikibot - MediaWiki API bot client
//!
//! A client library and command line bot for MediaWiki's `api.php`. It logs
//! a configured user in, then reads and changes pages through the legacy
//! token based write API.
//!
//! # Architecture
//!
//! - **Session**: HTTP transport with a persistent cookie jar, the two step
//!   login handshake and per-action token acquisition
//! - **Client**: page reads, edits and administrative actions on top of an
//!   authenticated session
//! - **Config**: TOML settings with environment overrides and encrypted
//!   password blobs
//!
//! Every remote failure surfaces as an [`Error`] with a stable numeric
//! [`Error::code`].
//!
//! # Usage
//!
//! ```bash
//! wikibot --user ExampleBot get "Main Page"
//! wikibot --user ExampleBot edit Sandbox --text "Hello" --summary "test"
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use wikibot::{ConfigLoader, EditOptions, WikiClient};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let settings = ConfigLoader::new().load(None)?;
//! let client = WikiClient::connect(settings.profile("ExampleBot")?).await?;
//!
//! let text = client.get_page("Sandbox").await?;
//! client
//!     .edit_page("Sandbox", &format!("{text}\nmore"), &EditOptions::new("append"))
//!     .await?;
//! client.close().await;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod session;
pub mod types;
pub mod utils;

pub use client::{WikiClient, WikiClientGeneric};
pub use config::{BotProfile, ConfigLoader, Settings};
pub use error::{Error, FailureKind, Result};
pub use session::{HttpTransport, Transport};
pub use types::{
    ActionKind, AuthState, BlockOptions, EditOptions, EmailMessage, MoveOptions, ProtectOptions,
    UploadRequest,
};
