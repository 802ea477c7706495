//! Customisation of a [`LokiHook`](super::LokiHook)

use super::formatter::{Formatter, TextFormatter};
use super::transport::HttpClient;
use crate::types::{LogEntry, LogLevel};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Loki stream labels
pub type Labels = HashMap<String, String>;

/// Replacement `level` label values for individual levels
pub type LevelMap = HashMap<LogLevel, String>;

/// Computes labels for each entry at push time
///
/// Dynamic labels should be used sparingly, every distinct label set is a
/// separate stream in Loki.
pub type DynamicLabelProvider = Arc<dyn Fn(&LogEntry) -> Labels + Send + Sync>;

/// Username and password sent as HTTP basic auth
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuthCredentials {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

impl BasicAuthCredentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value of the `Authorization` header for these credentials
    pub fn header_value(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", encoded)
    }
}

impl fmt::Debug for BasicAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Options for a [`LokiHook`](super::LokiHook)
///
/// Built once, then moved into the hook. Every `with_*` call replaces the
/// previous value wholesale and returns the options for chaining:
///
/// ```
/// use lokihook::hook::{Labels, LevelMap, LokiHookOptions};
/// use lokihook::types::LogLevel;
///
/// let options = LokiHookOptions::new()
///     .with_level_map(LevelMap::from([(LogLevel::Panic, "critical".to_string())]))
///     .with_static_labels(Labels::from([("app".to_string(), "example".to_string())]))
///     .with_basic_auth("loki", "secret");
///
/// assert_eq!(options.static_labels()["app"], "example");
/// ```
#[derive(Clone)]
pub struct LokiHookOptions {
    level_map: LevelMap,
    static_labels: Labels,
    dynamic_label_provider: DynamicLabelProvider,
    http_client: Arc<dyn HttpClient>,
    formatter: Arc<dyn Formatter>,
    basic_auth: Option<BasicAuthCredentials>,
}

impl Default for LokiHookOptions {
    fn default() -> Self {
        Self {
            level_map: LevelMap::new(),
            static_labels: Labels::new(),
            dynamic_label_provider: Arc::new(|_: &LogEntry| Labels::new()),
            http_client: Arc::new(reqwest::Client::new()),
            formatter: Arc::new(TextFormatter::new()),
            basic_auth: None,
        }
    }
}

impl LokiHookOptions {
    /// Options with no labels, the text formatter and a default `reqwest` client
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the level remapping table
    pub fn with_level_map(mut self, level_map: LevelMap) -> Self {
        self.level_map = level_map;
        self
    }

    /// Replace the static labels added to every stream
    ///
    /// Static labels win over dynamic labels with the same key.
    pub fn with_static_labels(mut self, static_labels: Labels) -> Self {
        self.static_labels = static_labels;
        self
    }

    /// Replace the per-entry label provider
    pub fn with_dynamic_label_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn(&LogEntry) -> Labels + Send + Sync + 'static,
    {
        self.dynamic_label_provider = Arc::new(provider);
        self
    }

    /// Replace the HTTP client used for pushes
    pub fn with_http_client<C>(mut self, client: C) -> Self
    where
        C: HttpClient + 'static,
    {
        self.http_client = Arc::new(client);
        self
    }

    /// Replace the formatter that renders each line
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: Formatter + 'static,
    {
        self.formatter = Arc::new(formatter);
        self
    }

    /// Send basic auth credentials with every push
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some(BasicAuthCredentials::new(username, password));
        self
    }

    /// Level remapping table
    pub fn level_map(&self) -> &LevelMap {
        &self.level_map
    }

    /// Static labels
    pub fn static_labels(&self) -> &Labels {
        &self.static_labels
    }

    /// Per-entry label provider
    pub fn dynamic_label_provider(&self) -> &DynamicLabelProvider {
        &self.dynamic_label_provider
    }

    /// HTTP client
    pub fn http_client(&self) -> &Arc<dyn HttpClient> {
        &self.http_client
    }

    /// Line formatter
    pub fn formatter(&self) -> &Arc<dyn Formatter> {
        &self.formatter
    }

    /// Basic auth credentials, `None` when no `Authorization` header is sent
    pub fn basic_auth(&self) -> Option<&BasicAuthCredentials> {
        self.basic_auth.as_ref()
    }
}

impl fmt::Debug for LokiHookOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LokiHookOptions")
            .field("level_map", &self.level_map)
            .field("static_labels", &self.static_labels)
            .field("basic_auth", &self.basic_auth)
            .finish_non_exhaustive()
    }
}
