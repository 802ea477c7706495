//! Configuration management for lokihook

pub mod settings;

pub use settings::{BasicAuthSettings, FormatterKind, HookConfig};
