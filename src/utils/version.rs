//! Version information

/// Crate version from Cargo metadata
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the crate version
pub fn get_version() -> &'static str {
    VERSION
}

/// User agent sent when the configuration does not name one
pub fn default_user_agent() -> String {
    format!("wikibot/{}", VERSION)
}
