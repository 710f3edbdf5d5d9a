//! Model types
//!
//! Wire structures returned by the enhancement server's status endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A downloadable model the server reports as missing.
///
/// The server owns the identifying fields; anything beyond `name`,
/// `filename` and `url` is kept in `extra` so the descriptor is sent back
/// unchanged when a download is requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Display name, also the key used in progress events
    pub name: String,
    /// File name on the server side
    #[serde(default)]
    pub filename: String,
    /// Upstream download location
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            url: url.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// Hardware and model residency reported by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    /// GPU name, or "CPU" when none was detected
    #[serde(default)]
    pub gpu_detected: String,
    #[serde(default)]
    pub half_precision: bool,
    /// Whether the models are already resident in memory
    #[serde(default)]
    pub models_loaded: bool,
}

/// Response of `GET /api/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub system_info: SystemInfo,
    #[serde(default)]
    pub missing_models: Vec<ModelDescriptor>,
}
