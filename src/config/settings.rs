//! Configuration structures for lokihook

use crate::hook::{JsonFormatter, Labels, LevelMap, LokiHook, LokiHookOptions, TextFormatter};
use crate::types::LogLevel;
use crate::{LokiError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Hook configuration, usually loaded from a TOML file
///
/// ```toml
/// host = "http://localhost:3100"
/// levels = ["error", "warning", "info"]
/// formatter = "json"
///
/// [static_labels]
/// app = "example"
///
/// [level_map]
/// panic = "critical"
///
/// [basic_auth]
/// username = "loki"
/// password = "secret"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookConfig {
    /// Loki base URL; the push path is appended
    pub host: String,
    /// Levels the hook fires for; empty means all
    pub levels: Vec<LogLevel>,
    /// Labels added to every stream
    pub static_labels: Labels,
    /// Level name to replacement `level` label value
    pub level_map: HashMap<String, String>,
    /// Optional basic auth credentials
    pub basic_auth: Option<BasicAuthSettings>,
    /// Request timeout in seconds; no timeout when unset
    pub timeout_seconds: Option<u64>,
    /// Line format
    pub formatter: FormatterKind,
    /// Add a `host` static label with the machine hostname
    pub include_hostname: bool,
}

/// Basic auth settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuthSettings {
    /// Username
    pub username: String,
    /// Password
    pub password: String,
}

/// Available line formatters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatterKind {
    /// logfmt text
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl Default for HookConfig {
    fn default() -> Self {
        Self {
            host: "http://localhost:3100".to_string(),
            levels: LogLevel::ALL.to_vec(),
            static_labels: Labels::new(),
            level_map: HashMap::new(),
            basic_auth: None,
            timeout_seconds: None,
            formatter: FormatterKind::Text,
            include_hostname: false,
        }
    }
}

impl HookConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        content.parse()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(LokiError::Config("Host cannot be empty".to_string()));
        }
        if !(self.host.starts_with("http://") || self.host.starts_with("https://")) {
            return Err(LokiError::Config(format!(
                "Host must start with http:// or https://, got {:?}",
                self.host
            )));
        }
        Ok(())
    }

    /// Parsed level remapping table
    pub fn parsed_level_map(&self) -> Result<LevelMap> {
        self.level_map
            .iter()
            .map(|(level, label)| -> Result<(LogLevel, String)> {
                let level = level
                    .parse::<LogLevel>()
                    .map_err(|e| LokiError::Config(format!("Invalid level_map key: {}", e)))?;
                Ok((level, label.clone()))
            })
            .collect()
    }

    /// Build hook options from this configuration
    pub fn to_options(&self) -> Result<LokiHookOptions> {
        let mut static_labels = self.static_labels.clone();
        if self.include_hostname {
            let hostname = gethostname::gethostname().to_string_lossy().to_string();
            static_labels.entry("host".to_string()).or_insert(hostname);
        }

        let mut options = LokiHookOptions::new()
            .with_level_map(self.parsed_level_map()?)
            .with_static_labels(static_labels);

        options = match self.formatter {
            FormatterKind::Text => options.with_formatter(TextFormatter::new()),
            FormatterKind::Json => options.with_formatter(JsonFormatter::new()),
        };

        if let Some(seconds) = self.timeout_seconds {
            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(seconds))
                .build()
                .map_err(|e| LokiError::Config(format!("Failed to build HTTP client: {}", e)))?;
            options = options.with_http_client(client);
        }

        if let Some(auth) = &self.basic_auth {
            options = options.with_basic_auth(auth.username.as_str(), auth.password.as_str());
        }

        Ok(options)
    }

    /// Validate and build a [`LokiHook`]
    pub fn build_hook(&self) -> Result<LokiHook> {
        self.validate()?;
        Ok(LokiHook::with_options(&self.host, self.to_options()?, &self.levels))
    }
}

impl std::str::FromStr for HookConfig {
    type Err = LokiError;

    fn from_str(s: &str) -> Result<Self> {
        let config: HookConfig = toml::from_str(s)
            .map_err(|e| LokiError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }
}
