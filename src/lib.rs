//! # lokihook - Push structured logs to Grafana Loki
//!
//! lokihook takes one log entry at a time, attaches Loki stream labels
//! (dynamic, static and level-derived) and pushes it to a Loki server as a
//! JSON batch over HTTP.
//!
//! ## Features
//!
//! - **Label precedence**: dynamic labels, then static labels, then the `level` label
//! - **Level remapping**: rename any severity before it becomes the `level` label
//! - **Pluggable formatting**: logfmt text by default, JSON or any closure
//! - **Pluggable transport**: any [`hook::HttpClient`], `reqwest` by default
//! - **Basic auth**: optional `Authorization` header per push
//!
//! ## Quick Start
//!
//! ```no_run
//! use lokihook::client::Logger;
//! use lokihook::hook::{Labels, LevelMap, LokiHook, LokiHookOptions};
//! use lokihook::types::LogLevel;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = LokiHookOptions::new()
//!         .with_level_map(LevelMap::from([(LogLevel::Panic, "critical".to_string())]))
//!         .with_static_labels(Labels::from([("app".to_string(), "example".to_string())]));
//!
//!     let hook = LokiHook::with_options("http://localhost:3100", options, &LogLevel::ALL);
//!
//!     let mut logger = Logger::new(LogLevel::Trace);
//!     logger.add_hook(Arc::new(hook));
//!
//!     logger.info("service started").await?;
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod hook;
pub mod loki;
pub mod types;

/// Common error types used throughout lokihook
pub mod error {
    use std::fmt;

    /// lokihook error types
    #[derive(Debug)]
    pub enum LokiError {
        /// Rendering the log line failed
        Format(String),
        /// Encoding the push batch failed
        Serialization(serde_json::Error),
        /// The HTTP call could not complete
        Transport(Box<dyn std::error::Error + Send + Sync>),
        /// Loki answered with a non-2xx status
        Remote {
            /// Response status
            status: http::StatusCode,
            /// Response body, lossily decoded as UTF-8
            body: String,
        },
        /// Configuration error
        Config(String),
        /// I/O operation failed
        Io(std::io::Error),
    }

    impl fmt::Display for LokiError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                LokiError::Format(e) => write!(f, "Format error: {}", e),
                LokiError::Serialization(e) => write!(f, "Serialization error: {}", e),
                LokiError::Transport(e) => write!(f, "Transport error: {}", e),
                LokiError::Remote { status, body } => {
                    write!(f, "error posting loki batch ({}): {}", status, body)
                }
                LokiError::Config(e) => write!(f, "Configuration error: {}", e),
                LokiError::Io(e) => write!(f, "I/O error: {}", e),
            }
        }
    }

    impl std::error::Error for LokiError {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match self {
                LokiError::Serialization(e) => Some(e),
                LokiError::Transport(e) => Some(e.as_ref()),
                LokiError::Io(e) => Some(e),
                _ => None,
            }
        }
    }

    impl From<std::io::Error> for LokiError {
        fn from(err: std::io::Error) -> Self {
            LokiError::Io(err)
        }
    }

    impl From<serde_json::Error> for LokiError {
        fn from(err: serde_json::Error) -> Self {
            LokiError::Serialization(err)
        }
    }

    impl From<reqwest::Error> for LokiError {
        fn from(err: reqwest::Error) -> Self {
            LokiError::Transport(Box::new(err))
        }
    }

    /// Result type alias for lokihook operations
    pub type Result<T> = std::result::Result<T, LokiError>;
}

pub use error::{LokiError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::client::Logger;
    pub use crate::config::HookConfig;
    pub use crate::hook::{
        BasicAuthCredentials, Formatter, Hook, HttpClient, JsonFormatter, Labels, LevelMap,
        LokiHook, LokiHookOptions, TextFormatter,
    };
    pub use crate::loki::{Batch, Stream};
    pub use crate::types::{LogEntry, LogFields, LogLevel};
    pub use crate::{LokiError, Result};
}
