//! Core log types shared by the hook and the logger

pub mod log_entry;

pub use log_entry::{LogEntry, LogFields, LogLevel};
