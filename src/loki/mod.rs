//! In-memory model of a Loki push payload

pub mod batch;
pub mod stream;

pub use batch::Batch;
pub use stream::Stream;

/// Path of the Loki push API, appended to the configured host
pub const PUSH_LOGS_PATH: &str = "/loki/api/v1/push";
