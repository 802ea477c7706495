//! Rendering of a [`LogEntry`] into the line pushed to Loki

use crate::types::LogEntry;
use crate::{LokiError, Result};
use chrono::SecondsFormat;
use serde_json::{Map, Value};
use std::fmt::Write;

/// Renders the body of a Loki entry
///
/// Any `Fn(&LogEntry) -> Result<Vec<u8>>` closure is a formatter.
pub trait Formatter: Send + Sync {
    /// Render `entry` as bytes; the hook pushes them as a UTF-8 line
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>>;
}

impl<F> Formatter for F
where
    F: Fn(&LogEntry) -> Result<Vec<u8>> + Send + Sync,
{
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        self(entry)
    }
}

const FIELD_TIME: &str = "time";
const FIELD_LEVEL: &str = "level";
const FIELD_MSG: &str = "msg";

/// User fields that would shadow a built-in key are renamed to `fields.<key>`
fn clash_safe_key(key: &str) -> String {
    match key {
        FIELD_TIME | FIELD_LEVEL | FIELD_MSG => format!("fields.{}", key),
        _ => key.to_string(),
    }
}

fn render_timestamp(
    entry: &LogEntry,
    timestamp_format: Option<&str>,
) -> std::result::Result<String, std::fmt::Error> {
    match timestamp_format {
        Some(format) => {
            let mut out = String::new();
            write!(out, "{}", entry.timestamp.format(format))?;
            Ok(out)
        }
        None => Ok(entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)),
    }
}

/// logfmt output: `time="..." level=info msg=hello key=value`
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    /// Omit the `time` key
    pub disable_timestamp: bool,
    /// chrono strftime pattern for `time`; RFC 3339 when unset
    pub timestamp_format: Option<String>,
    /// Keep user fields in map order instead of sorting by key
    pub disable_sorting: bool,
    /// Quote empty values as `""`
    pub quote_empty_fields: bool,
}

impl TextFormatter {
    /// Text formatter with default settings
    pub fn new() -> Self {
        Self::default()
    }

    fn needs_quoting(&self, text: &str) -> bool {
        if text.is_empty() {
            return self.quote_empty_fields;
        }
        !text.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '/' | '@' | '^' | '+')
        })
    }

    fn append_pair(&self, out: &mut String, key: &str, value: &str) -> std::fmt::Result {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(key);
        out.push('=');
        if self.needs_quoting(value) {
            write!(out, "{:?}", value)
        } else {
            out.push_str(value);
            Ok(())
        }
    }

    fn render(&self, out: &mut String, entry: &LogEntry) -> std::fmt::Result {
        let mut fields: Vec<(String, &str)> = entry
            .fields
            .iter()
            .map(|(k, v)| (clash_safe_key(k), v.as_str()))
            .collect();
        if !self.disable_sorting {
            fields.sort_by(|a, b| a.0.cmp(&b.0));
        }

        if !self.disable_timestamp {
            let time = render_timestamp(entry, self.timestamp_format.as_deref())?;
            self.append_pair(out, FIELD_TIME, &time)?;
        }
        self.append_pair(out, FIELD_LEVEL, entry.level.as_str())?;
        let message = entry.message.strip_suffix('\n').unwrap_or(&entry.message);
        if !message.is_empty() {
            self.append_pair(out, FIELD_MSG, message)?;
        }
        for (key, value) in &fields {
            self.append_pair(out, key, value)?;
        }
        Ok(())
    }
}

impl Formatter for TextFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let mut out = String::new();
        self.render(&mut out, entry)
            .map_err(|e| LokiError::Format(format!("failed to write log line: {}", e)))?;

        out.push('\n');
        Ok(out.into_bytes())
    }
}

/// One JSON object per entry: user fields plus `level`, `msg` and `time`
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    /// Omit the `time` key
    pub disable_timestamp: bool,
    /// chrono strftime pattern for `time`; RFC 3339 when unset
    pub timestamp_format: Option<String>,
}

impl JsonFormatter {
    /// JSON formatter with default settings
    pub fn new() -> Self {
        Self::default()
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, entry: &LogEntry) -> Result<Vec<u8>> {
        let mut object = Map::new();
        for (key, value) in &entry.fields {
            object.insert(clash_safe_key(key), Value::String(value.clone()));
        }
        if !self.disable_timestamp {
            let time = render_timestamp(entry, self.timestamp_format.as_deref())
                .map_err(|_| LokiError::Format("invalid timestamp format".to_string()))?;
            object.insert(FIELD_TIME.to_string(), Value::String(time));
        }
        object.insert(FIELD_LEVEL.to_string(), Value::String(entry.level.to_string()));
        object.insert(FIELD_MSG.to_string(), Value::String(entry.message.clone()));

        let mut out = serde_json::to_vec(&object)
            .map_err(|e| LokiError::Format(format!("failed to marshal fields to JSON: {}", e)))?;
        out.push(b'\n');
        Ok(out)
    }
}
