//! On-disk cassette format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded session: every port interaction in call order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable cassette name.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made at.
    pub commit: String,
    /// Interactions in call order.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

/// One call through a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Position in the recording.
    pub seq: u64,
    /// Port name, e.g. `text_generator`.
    pub port: String,
    /// Method name on the port.
    pub method: String,
    /// Serialized request.
    pub input: serde_json::Value,
    /// Serialized `{"Ok": ...}` or `{"Err": ...}` result.
    pub output: serde_json::Value,
}
