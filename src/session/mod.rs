//! Session management for one wiki account
//!
//! This module handles the HTTP transport and its cookie jar, the login
//! handshake, and per-action token acquisition.

pub mod auth;
pub mod cookies;
pub mod tokens;
pub mod transport;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{LoginPolicy, Session};
pub use cookies::CookieJar;
pub use tokens::acquire_token;
pub use transport::{FilePart, HttpTransport, Transport};
