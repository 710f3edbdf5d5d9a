//! Download progress events
//!
//! Payloads carried by the `/api/download_model` server-push stream.

use serde::{Deserialize, Serialize};

/// One progress event for a single model download
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DownloadEvent {
    /// Bytes are arriving; `progress` is a 0-100 percentage
    Downloading {
        #[serde(default)]
        model_name: Option<String>,
        #[serde(default)]
        progress: f64,
    },
    /// Terminal: the model file is in place
    Completed {
        #[serde(default)]
        model_name: Option<String>,
    },
    /// Terminal: the server gave up on this model
    Error {
        #[serde(default)]
        model_name: Option<String>,
        #[serde(default)]
        error_message: Option<String>,
    },
}

impl DownloadEvent {
    /// Progress clamped into 0..=100, if this is a progress tick
    pub fn percent(&self) -> Option<f64> {
        match self {
            DownloadEvent::Downloading { progress, .. } if progress.is_finite() => {
                Some(progress.clamp(0.0, 100.0))
            }
            DownloadEvent::Downloading { .. } => Some(0.0),
            _ => None,
        }
    }
}
