//! Configuration settings structure
//!
//! Defines the settings file layout, environment overrides, validation and
//! the resolution of one configured user into a [`BotProfile`].

use super::credentials::decrypt_password;
use crate::{Error, Result, utils::default_user_agent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Main configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// User agent sent with every request
    pub useragent: String,
    /// Shared key for the password blobs
    pub key: String,
    /// Logging configuration
    pub logging: LoggingSettings,
    /// Protocol and pacing knobs
    pub bot: BotSettings,
    /// Configured wikis by id
    pub wiki: BTreeMap<String, WikiSettings>,
    /// Configured accounts by user name
    pub users: BTreeMap<String, UserSettings>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (`debug`, `info`, `notice`, `warn`, `error`, `fatal`)
    pub level: String,
    /// Log file, appended to
    pub file: Option<PathBuf>,
    /// Write records to the log file
    pub output_log: bool,
    /// Mirror records to stderr
    pub log_to_stderr: bool,
}

/// Protocol and pacing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Replication lag ceiling in seconds
    pub maxlag: u32,
    /// Login attempts before giving up on a rate limited server
    pub login_attempts: u32,
    /// Wait between rate limited login attempts
    pub login_backoff_secs: u64,
    /// Cookie jar file; none keeps cookies in memory only
    pub cookie_file: Option<PathBuf>,
    /// Request timeout
    pub timeout_secs: u64,
}

/// One wiki
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikiSettings {
    /// Display name
    pub name: String,
    /// URL of `api.php`
    pub api: String,
    /// Edits per minute; 0 disables pacing
    #[serde(default = "default_epm")]
    pub epm: u32,
}

/// One account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    /// Wiki id the account logs in to
    pub wiki: String,
    /// Encrypted password blob
    pub password: String,
}

fn default_epm() -> u32 {
    10
}

/// Log verbosity levels accepted in the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Notice,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    /// Parse a level name; the `LG_` prefixed spelling is accepted too
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let name = name.strip_prefix("lg_").unwrap_or(&name);
        match name {
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "notice" => Some(LogLevel::Notice),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            "fatal" => Some(LogLevel::Fatal),
            _ => None,
        }
    }

    /// Closest `tracing` filter directive
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info | LogLevel::Notice => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error | LogLevel::Fatal => "error",
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            useragent: default_user_agent(),
            key: String::new(),
            logging: LoggingSettings::default(),
            bot: BotSettings::default(),
            wiki: BTreeMap::new(),
            users: BTreeMap::new(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            output_log: true,
            log_to_stderr: false,
        }
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            maxlag: 5,
            login_attempts: 5,
            login_backoff_secs: 10,
            cookie_file: Some(PathBuf::from("cookie.txt")),
            timeout_secs: 60,
        }
    }
}

impl Settings {
    /// Create new settings with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Parse settings from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::config(format!("Invalid TOML: {}", e)))
    }

    /// Serialize settings as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(format!("Cannot serialize: {}", e)))
    }

    /// Load settings from environment variables
    pub fn from_env() -> Result<Self> {
        Self::default().merge_with_env()
    }

    /// Apply environment variable overrides
    pub fn merge_with_env(mut self) -> Result<Self> {
        if let Ok(useragent) = std::env::var("WIKIBOT_USERAGENT") {
            self.useragent = useragent;
        }

        if let Ok(key) = std::env::var("WIKIBOT_KEY") {
            self.key = key;
        }

        if let Ok(level) = std::env::var("WIKIBOT_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Ok(file) = std::env::var("WIKIBOT_LOG_FILE") {
            self.logging.file = Some(PathBuf::from(file));
        }

        if let Ok(maxlag) = std::env::var("WIKIBOT_MAXLAG") {
            self.bot.maxlag = maxlag
                .parse()
                .map_err(|e| Error::config(format!("Invalid maxlag: {}", e)))?;
        }

        Ok(self)
    }

    /// Check the settings for problems
    pub fn validate(&self) -> Result<()> {
        if self.useragent.trim().is_empty() {
            return Err(Error::config("'useragent' must be a non-empty string"));
        }

        if LogLevel::parse(&self.logging.level).is_none() {
            return Err(Error::config(format!(
                "'logging.level' must be one of debug, info, notice, warn, error, fatal (got '{}')",
                self.logging.level
            )));
        }

        if self.bot.login_attempts == 0 {
            return Err(Error::config("'bot.login_attempts' must be at least 1"));
        }

        for (id, wiki) in &self.wiki {
            parse_api_url(&wiki.api)
                .map_err(|e| Error::config(format!("wiki '{}': {}", id, e)))?;
        }

        if !self.users.is_empty() && self.key.trim().is_empty() {
            return Err(Error::config("'key' must be set when users are configured"));
        }

        for (name, user) in &self.users {
            if !self.wiki.contains_key(&user.wiki) {
                return Err(Error::config(format!(
                    "user '{}' refers to unknown wiki '{}'",
                    name, user.wiki
                )));
            }
        }

        Ok(())
    }

    /// Parsed log level
    pub fn log_level(&self) -> LogLevel {
        LogLevel::parse(&self.logging.level).unwrap_or(LogLevel::Info)
    }

    /// Resolve one configured user into a client profile
    pub fn profile(&self, user: &str) -> Result<BotProfile> {
        let account = self
            .users
            .get(user)
            .ok_or_else(|| Error::config(format!("no user '{}' in configuration", user)))?;
        let wiki = self.wiki.get(&account.wiki).ok_or_else(|| {
            Error::config(format!(
                "user '{}' refers to unknown wiki '{}'",
                user, account.wiki
            ))
        })?;
        let password = decrypt_password(&account.password, &self.key)?;
        let api_url = parse_api_url(&wiki.api)?;

        Ok(BotProfile {
            user: user.to_string(),
            password,
            wiki_id: account.wiki.clone(),
            wiki_name: wiki.name.clone(),
            api_url,
            user_agent: self.useragent.clone(),
            maxlag: self.bot.maxlag,
            edits_per_minute: wiki.epm,
            login_attempts: self.bot.login_attempts,
            login_backoff: Duration::from_secs(self.bot.login_backoff_secs),
            cookie_file: self.bot.cookie_file.clone(),
            timeout: Duration::from_secs(self.bot.timeout_secs),
        })
    }
}

fn parse_api_url(api: &str) -> Result<Url> {
    let url = Url::parse(api)
        .map_err(|e| Error::config(format!("invalid API URL '{}': {}", api, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::config(format!(
            "API URL '{}' must use http or https, not {}",
            api, scheme
        ))),
    }
}

/// Everything a client needs to talk to one wiki as one user
#[derive(Clone)]
pub struct BotProfile {
    pub user: String,
    pub password: String,
    pub wiki_id: String,
    pub wiki_name: String,
    pub api_url: Url,
    pub user_agent: String,
    pub maxlag: u32,
    pub edits_per_minute: u32,
    pub login_attempts: u32,
    pub login_backoff: Duration,
    pub cookie_file: Option<PathBuf>,
    pub timeout: Duration,
}

impl std::fmt::Debug for BotProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotProfile")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("wiki_id", &self.wiki_id)
            .field("api_url", &self.api_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("maxlag", &self.maxlag)
            .field("edits_per_minute", &self.edits_per_minute)
            .field("login_attempts", &self.login_attempts)
            .field("login_backoff", &self.login_backoff)
            .field("cookie_file", &self.cookie_file)
            .finish()
    }
}

impl BotProfile {
    /// Profile with default protocol settings and an in-memory cookie jar
    pub fn new(api_url: Url, user: impl Into<String>, password: impl Into<String>) -> Self {
        let defaults = BotSettings::default();
        Self {
            user: user.into(),
            password: password.into(),
            wiki_id: String::new(),
            wiki_name: api_url.host_str().unwrap_or_default().to_string(),
            api_url,
            user_agent: default_user_agent(),
            maxlag: defaults.maxlag,
            edits_per_minute: default_epm(),
            login_attempts: defaults.login_attempts,
            login_backoff: Duration::from_secs(defaults.login_backoff_secs),
            cookie_file: None,
            timeout: Duration::from_secs(defaults.timeout_secs),
        }
    }

    pub fn with_edits_per_minute(mut self, epm: u32) -> Self {
        self.edits_per_minute = epm;
        self
    }

    pub fn with_login_backoff(mut self, backoff: Duration) -> Self {
        self.login_backoff = backoff;
        self
    }

    pub fn with_login_attempts(mut self, attempts: u32) -> Self {
        self.login_attempts = attempts;
        self
    }

    pub fn with_cookie_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.cookie_file = Some(path.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Delay after each saved edit
    pub fn edit_pacing(&self) -> Duration {
        if self.edits_per_minute == 0 {
            Duration::ZERO
        } else {
            Duration::from_secs(60) / self.edits_per_minute
        }
    }
}
