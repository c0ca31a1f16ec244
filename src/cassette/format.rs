//! On-disk cassette format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A recorded session of service interactions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cassette {
    /// Human-readable cassette name.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Git commit the recording was made from.
    pub commit: String,
    /// Interactions in call order.
    #[serde(default)]
    pub interactions: Vec<Interaction>,
}

/// One call through a port.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    /// Global call order within the cassette.
    pub seq: u64,
    /// Port name, e.g. `generation_service`.
    pub port: String,
    /// Method name on the port.
    pub method: String,
    /// Summary of the call's input.
    #[serde(default)]
    pub input: serde_json::Value,
    /// `{"Ok": ...}` or `{"Err": ...}`.
    pub output: serde_json::Value,
}
