//! Log entry types and utilities

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Type alias for log fields
pub type LogFields = HashMap<String, String>;

/// Log severity levels, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum LogLevel {
    /// Panic: the highest severity
    Panic = 0,
    /// Fatal: the process cannot continue
    Fatal = 1,
    /// Error: error conditions
    Error = 2,
    /// Warn: warning conditions
    Warn = 3,
    /// Info: informational messages
    Info = 4,
    /// Debug: debug-level messages
    Debug = 5,
    /// Trace: finer-grained than debug
    Trace = 6,
}

impl LogLevel {
    /// Every known level, most severe first
    pub const ALL: [LogLevel; 7] = [
        LogLevel::Panic,
        LogLevel::Fatal,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    /// Canonical lowercase name, used as the Loki `level` label
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Panic => "panic",
            LogLevel::Fatal => "fatal",
            LogLevel::Error => "error",
            LogLevel::Warn => "warning",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }

    /// Whether an entry at `other` passes a threshold of `self`
    pub fn enables(&self, other: LogLevel) -> bool {
        other <= *self
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "panic" => Ok(LogLevel::Panic),
            "fatal" => Ok(LogLevel::Fatal),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(format!("not a valid log level: {:?}", other)),
        }
    }
}

impl TryFrom<String> for LogLevel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, <LogLevel as TryFrom<String>>::Error> {
        s.parse()
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogLevel::Error,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Info => LogLevel::Info,
            log::Level::Debug => LogLevel::Debug,
            log::Level::Trace => LogLevel::Trace,
        }
    }
}

/// A structured log entry
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    /// Timestamp when the log was created
    pub timestamp: DateTime<Utc>,

    /// Log severity level
    pub level: LogLevel,

    /// Primary log message
    pub message: String,

    /// Additional structured fields
    pub fields: LogFields,
}

impl LogEntry {
    /// Create a new log entry stamped with the current time
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            fields: HashMap::new(),
        }
    }

    /// Build an entry from a `log` crate record
    pub fn from_record(record: &log::Record<'_>) -> Self {
        Self::new(record.level().into(), record.args().to_string())
            .with_field("target", record.target())
    }

    /// Add a single field
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Merge a set of fields, overwriting existing keys
    pub fn with_fields(mut self, fields: LogFields) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Override the timestamp
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Nanoseconds since the Unix epoch
    pub fn unix_nanos(&self) -> i128 {
        unix_nanos(&self.timestamp)
    }
}

/// Nanoseconds since the Unix epoch, over chrono's whole range
pub(crate) fn unix_nanos(timestamp: &DateTime<Utc>) -> i128 {
    i128::from(timestamp.timestamp()) * 1_000_000_000
        + i128::from(timestamp.timestamp_subsec_nanos())
}
