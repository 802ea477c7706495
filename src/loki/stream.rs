//! A single Loki stream: one label set and its log lines

use crate::types::log_entry::unix_nanos;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A labeled sequence of `[timestamp, line]` entries
///
/// Serializes as `{"stream": {...labels}, "values": [["<unix nanos>", "<line>"], ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    /// Stream labels; later writes to the same key win
    #[serde(rename = "stream")]
    pub labels: BTreeMap<String, String>,

    /// Entries as `[nanosecond timestamp, line]` pairs, in insertion order
    #[serde(rename = "values")]
    pub entries: Vec<[String; 2]>,
}

impl Stream {
    /// Create an empty stream
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a label, replacing any previous value for `key`
    pub fn add_label(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.labels.insert(key.into(), value.into());
    }

    /// Append an entry stamped with `timestamp`
    pub fn add_entry(&mut self, timestamp: DateTime<Utc>, line: impl Into<String>) {
        self.add_raw_entry(unix_nanos(&timestamp), line);
    }

    /// Append an entry from a precomputed nanosecond timestamp
    pub fn add_raw_entry(&mut self, unix_nanos: i128, line: impl Into<String>) {
        self.entries.push([unix_nanos.to_string(), line.into()]);
    }

    /// Label value for `key`, if set
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }
}
