//! Hooks: per-entry sinks fired by the [`Logger`](crate::client::Logger)

pub mod formatter;
pub mod loki;
pub mod options;
pub mod transport;

use crate::types::{LogEntry, LogLevel};
use crate::Result;
use async_trait::async_trait;

pub use formatter::{Formatter, JsonFormatter, TextFormatter};
pub use loki::LokiHook;
pub use options::{BasicAuthCredentials, DynamicLabelProvider, Labels, LevelMap, LokiHookOptions};
pub use transport::HttpClient;

/// A sink that receives every entry logged at one of its levels
#[async_trait]
pub trait Hook: Send + Sync {
    /// Levels this hook is fired for
    fn levels(&self) -> &[LogLevel];

    /// Handle one entry
    async fn fire(&self, entry: &LogEntry) -> Result<()>;
}
