//! File-backed cookie jar
//!
//! MediaWiki keeps the login session in cookies. Cookie semantics (domain,
//! path, `Secure`, expiry) are handled by `cookie_store`; this wrapper loads
//! the jar from `bot.cookie_file` and rewrites the file whenever the server
//! sets cookies, so a later run can reuse the session.

use cookie_store::CookieStore as Store;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use reqwest_cookie_store::CookieStoreMutex;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use url::Url;

type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Cookie store shared with the HTTP client
#[derive(Default)]
pub struct CookieJar {
    path: Option<PathBuf>,
    store: CookieStoreMutex,
}

impl std::fmt::Debug for CookieJar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieJar")
            .field("path", &self.path)
            .field("cookies", &self.len())
            .finish()
    }
}

impl CookieJar {
    /// Jar that never touches the disk
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Jar backed by `path`; a missing or unreadable file starts empty
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let store = match File::open(&path) {
            Ok(file) => {
                // Session cookies carry no expiry; keep them so the login survives restarts
                cookie_store::serde::json::load_all(BufReader::new(file)).unwrap_or_else(|e| {
                    tracing::warn!("Ignoring unreadable cookie file {:?}: {}", path, e);
                    Store::default()
                })
            }
            Err(_) => Store::default(),
        };
        Self {
            path: Some(path),
            store: CookieStoreMutex::new(store),
        }
    }

    /// File the jar is saved to
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Value of the cookie `name` that would be sent to `url`
    pub fn get(&self, url: &Url, name: &str) -> Option<String> {
        let store = self.store.lock().ok()?;
        store
            .matches(url)
            .into_iter()
            .find(|cookie| cookie.name() == name)
            .map(|cookie| cookie.value().to_string())
    }

    /// Number of unexpired cookies across all hosts
    pub fn len(&self) -> usize {
        self.store
            .lock()
            .map(|store| store.iter_unexpired().count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn save(&self) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = self.write_to(path) {
            tracing::warn!("Cannot write cookie file {:?}: {}", path, e);
        }
    }

    fn write_to(&self, path: &Path) -> Result<(), StoreError> {
        let mut writer = BufWriter::new(File::create(path)?);
        {
            let store = self.store.lock().map_err(|_| "cookie store lock poisoned")?;
            cookie_store::serde::json::save_incl_expired_and_nonpersistent(&store, &mut writer)?;
        }
        writer.flush()?;
        Ok(())
    }
}

impl CookieStore for CookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        let headers: Vec<&HeaderValue> = cookie_headers.collect();
        if headers.is_empty() {
            return;
        }
        self.store.set_cookies(&mut headers.into_iter(), url);
        self.save();
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.store.cookies(url)
    }
}
