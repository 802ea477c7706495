//! Minimal structured logger that routes entries to registered hooks

use crate::hook::Hook;
use crate::types::{LogEntry, LogFields, LogLevel};
use crate::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Logger with a minimum level and a per-level hook registry
///
/// Entries are fired synchronously, in registration order, to every hook
/// whose [`levels`](Hook::levels) contain the entry's level.
#[derive(Clone)]
pub struct Logger {
    level: LogLevel,
    hooks: HashMap<LogLevel, Vec<Arc<dyn Hook>>>,
}

impl Logger {
    /// Create a logger that drops entries less severe than `level`
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            hooks: HashMap::new(),
        }
    }

    /// Minimum level
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Change the minimum level
    pub fn set_level(&mut self, level: LogLevel) {
        self.level = level;
    }

    /// Register `hook` for each level it handles
    pub fn add_hook(&mut self, hook: Arc<dyn Hook>) {
        for level in hook.levels() {
            self.hooks.entry(*level).or_default().push(Arc::clone(&hook));
        }
    }

    /// Number of hooks registered for `level`
    pub fn hook_count(&self, level: LogLevel) -> usize {
        self.hooks.get(&level).map_or(0, Vec::len)
    }

    /// Log a message with specified level and fields
    pub async fn log(&self, level: LogLevel, message: &str, fields: LogFields) -> Result<()> {
        self.log_entry(&LogEntry::new(level, message).with_fields(fields))
            .await
    }

    /// Fire a prebuilt entry at the hooks registered for its level
    ///
    /// Every hook is fired even if an earlier one fails; the first failure is
    /// returned.
    pub async fn log_entry(&self, entry: &LogEntry) -> Result<()> {
        if !self.level.enables(entry.level) {
            return Ok(());
        }
        let Some(hooks) = self.hooks.get(&entry.level) else {
            return Ok(());
        };

        let mut first_error = None;
        for hook in hooks {
            if let Err(e) = hook.fire(entry).await {
                warn!(level = %entry.level, error = %e, "failed to fire hook");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Log a panic message; the level is only a label, nothing panics
    pub async fn panic<S: AsRef<str>>(&self, message: S) -> Result<()> {
        self.log(LogLevel::Panic, message.as_ref(), HashMap::new()).await
    }

    /// Log a fatal message; the process keeps running
    pub async fn fatal<S: AsRef<str>>(&self, message: S) -> Result<()> {
        self.log(LogLevel::Fatal, message.as_ref(), HashMap::new()).await
    }

    /// Log an error message
    pub async fn error<S: AsRef<str>>(&self, message: S) -> Result<()> {
        self.log(LogLevel::Error, message.as_ref(), HashMap::new()).await
    }

    /// Log an error message with fields
    pub async fn error_with_fields<S: AsRef<str>>(&self, message: S, fields: LogFields) -> Result<()> {
        self.log(LogLevel::Error, message.as_ref(), fields).await
    }

    /// Log a warning message
    pub async fn warn<S: AsRef<str>>(&self, message: S) -> Result<()> {
        self.log(LogLevel::Warn, message.as_ref(), HashMap::new()).await
    }

    /// Log a warning message with fields
    pub async fn warn_with_fields<S: AsRef<str>>(&self, message: S, fields: LogFields) -> Result<()> {
        self.log(LogLevel::Warn, message.as_ref(), fields).await
    }

    /// Log an info message
    pub async fn info<S: AsRef<str>>(&self, message: S) -> Result<()> {
        self.log(LogLevel::Info, message.as_ref(), HashMap::new()).await
    }

    /// Log an info message with fields
    pub async fn info_with_fields<S: AsRef<str>>(&self, message: S, fields: LogFields) -> Result<()> {
        self.log(LogLevel::Info, message.as_ref(), fields).await
    }

    /// Log a debug message
    pub async fn debug<S: AsRef<str>>(&self, message: S) -> Result<()> {
        self.log(LogLevel::Debug, message.as_ref(), HashMap::new()).await
    }

    /// Log a trace message
    pub async fn trace<S: AsRef<str>>(&self, message: S) -> Result<()> {
        self.log(LogLevel::Trace, message.as_ref(), HashMap::new()).await
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}
