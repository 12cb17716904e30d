//! Configuration management for the bot
//!
//! This module handles loading and validating the settings file and
//! turning a configured user into the profile a client is built from.

pub mod credentials;
pub mod loader;
pub mod settings;

pub use credentials::{decrypt_password, encrypt_password};
pub use loader::{ConfigLoader, default_config_path};
pub use settings::{BotProfile, LogLevel, Settings, UserSettings, WikiSettings};
