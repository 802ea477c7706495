//! Hook that pushes each entry to Loki

use super::options::LokiHookOptions;
use super::Hook;
use crate::loki::{Batch, Stream, PUSH_LOGS_PATH};
use crate::types::{LogEntry, LogLevel};
use crate::{LokiError, Result};
use async_trait::async_trait;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::Request;
use tracing::{debug, trace};

const LEVEL_LABEL: &str = "level";

/// Sends every entry it is fired with to Loki as a single-stream push
///
/// Nothing is buffered: each [`fire`](LokiHook::fire) call is one HTTP request,
/// and a failed push is returned to the caller without retrying.
#[derive(Debug, Clone)]
pub struct LokiHook {
    endpoint: String,
    levels: Vec<LogLevel>,
    options: LokiHookOptions,
}

impl LokiHook {
    /// Create a hook for `host` with default options
    ///
    /// An empty `levels` slice means every level.
    pub fn new(host: &str, levels: &[LogLevel]) -> Self {
        Self::with_options(host, LokiHookOptions::default(), levels)
    }

    /// Create a hook for `host` with custom options
    pub fn with_options(host: &str, options: LokiHookOptions, levels: &[LogLevel]) -> Self {
        let levels = if levels.is_empty() {
            LogLevel::ALL.to_vec()
        } else {
            levels.to_vec()
        };

        Self {
            endpoint: format!("{}{}", host.strip_suffix('/').unwrap_or(host), PUSH_LOGS_PATH),
            levels,
            options,
        }
    }

    /// Full push URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Options this hook was built with
    pub fn options(&self) -> &LokiHookOptions {
        &self.options
    }

    /// Build the single-stream batch for `entry` without sending it
    ///
    /// Labels are applied dynamic first, then static, then `level`, so on a
    /// key collision static beats dynamic and `level` always ends up as the
    /// (possibly remapped) entry level.
    pub fn build_batch(&self, entry: &LogEntry) -> Result<Batch> {
        let line = self.options.formatter().format(entry)?;

        let mut stream = Stream::new();
        stream.add_entry(entry.timestamp, String::from_utf8_lossy(&line));

        for (key, value) in (self.options.dynamic_label_provider())(entry) {
            stream.add_label(key, value);
        }

        for (key, value) in self.options.static_labels() {
            stream.add_label(key.as_str(), value.as_str());
        }

        stream.add_label(LEVEL_LABEL, self.level_label(entry.level));

        let mut batch = Batch::new();
        batch.add_stream(stream);
        Ok(batch)
    }

    /// Push `entry` to Loki
    pub async fn fire(&self, entry: &LogEntry) -> Result<()> {
        let data = self.build_batch(entry)?.to_json()?;

        let mut builder = Request::post(&self.endpoint).header(CONTENT_TYPE, "application/json");
        if let Some(credentials) = self.options.basic_auth() {
            builder = builder.header(AUTHORIZATION, credentials.header_value());
        }
        let request = builder
            .body(data)
            .map_err(|e| LokiError::Config(format!("invalid push request for {}: {}", self.endpoint, e)))?;

        let response = match self.options.http_client().send(request).await {
            Ok(response) => response,
            Err(e) => {
                debug!(endpoint = %self.endpoint, error = %e, "loki push failed");
                return Err(e);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = String::from_utf8_lossy(response.body()).into_owned();
            debug!(endpoint = %self.endpoint, %status, "loki rejected push");
            return Err(LokiError::Remote { status, body });
        }

        trace!(endpoint = %self.endpoint, %status, "pushed entry to loki");
        Ok(())
    }

    fn level_label(&self, level: LogLevel) -> String {
        match self.options.level_map().get(&level) {
            Some(mapped) => mapped.clone(),
            None => level.to_string(),
        }
    }
}

#[async_trait]
impl Hook for LokiHook {
    fn levels(&self) -> &[LogLevel] {
        &self.levels
    }

    async fn fire(&self, entry: &LogEntry) -> Result<()> {
        LokiHook::fire(self, entry).await
    }
}
