//! Logger side: builds entries and fires them at hooks

pub mod logger;

pub use crate::types::LogLevel;
pub use logger::Logger;
