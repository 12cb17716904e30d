//! Bot exclusion templates
//!
//! Pages opt out of automated edits with `{{nobots}}`, with one of the
//! blanket forms of `{{bots|...}}`, or by listing the bot in
//! `{{bots|deny=...}}`.

use regex::Regex;
use std::sync::LazyLock;

static BLANKET_OPT_OUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\{\{\s*(?:nobots|bots\s*\|\s*",
        r"(?:allow\s*=\s*none|deny\s*=\s*all|optout\s*=\s*all))\s*\}\}",
    ))
    .expect("exclusion pattern is valid")
});

static DENY_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{\{\s*bots\s*\|\s*deny\s*=\s*([^}|]*)\}\}").expect("deny pattern is valid")
});

/// Whether `text` forbids `user` from editing the page
pub fn is_excluded(text: &str, user: &str) -> bool {
    if BLANKET_OPT_OUT.is_match(text) {
        return true;
    }

    let user = normalize(user);
    DENY_LIST.captures_iter(text).any(|caps| {
        caps[1]
            .split(',')
            .any(|name| normalize(name) == user)
    })
}

fn normalize(name: &str) -> String {
    name.trim().replace('_', " ").to_lowercase()
}
