//! The root push payload

use super::Stream;
use crate::Result;
use serde::{Deserialize, Serialize};

/// One push request body: a list of streams
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// Streams in this batch
    pub streams: Vec<Stream>,
}

impl Batch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stream
    pub fn add_stream(&mut self, stream: Stream) {
        self.streams.push(stream);
    }

    /// Encode as the JSON body of a push request
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode a push request body
    pub fn from_json(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}
