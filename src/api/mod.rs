//! Enhancement server API
//!
//! The `EnhancerApi` trait is the seam between the session controller and
//! the network. `HttpApi` talks to the real server; tests substitute a
//! scripted implementation.

pub mod client;
pub mod sse;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{DownloadEvent, ModelDescriptor, StatusResponse};

pub use client::HttpApi;
pub use sse::{SseDecoder, SseProgressStream};

/// Errors raised at the network boundary
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),
    /// The server answered with a non-success status
    #[error("{detail} (HTTP {status})")]
    Http { status: u16, detail: String },
    /// The server reported a failure through a push stream
    #[error("Server error: {0}")]
    Server(String),
    /// The body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::Decode(error.to_string())
        } else {
            ApiError::Network(error.to_string())
        }
    }
}

/// One image attached to an enhancement request
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).to_string();
        Self {
            file_name,
            mime,
            bytes,
        }
    }
}

/// Content type for an image file name, by extension
pub fn mime_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        _ => "application/octet-stream",
    }
}

/// A per-model server-push subscription.
///
/// Yields events until a terminal one arrives or the transport fails.
/// `None` means the stream ended without a terminal event.
#[async_trait]
pub trait ProgressStream: Send {
    async fn next_event(&mut self) -> Option<Result<DownloadEvent, ApiError>>;
    fn close(&mut self);
}

/// Operations the client needs from the enhancement server
#[async_trait]
pub trait EnhancerApi: Send + Sync {
    /// `GET /api/status`
    async fn status(&self) -> Result<StatusResponse, ApiError>;
    /// `GET /api/download_model?model_info=<json>`
    async fn open_download(
        &self,
        model: &ModelDescriptor,
    ) -> Result<Box<dyn ProgressStream>, ApiError>;
    /// `POST /api/load_models`
    async fn load_models(&self) -> Result<(), ApiError>;
    /// `POST /enhance`, returning the output file names in order
    async fn enhance(&self, files: Vec<UploadFile>) -> Result<Vec<String>, ApiError>;
    /// `GET /output/:filename`
    async fn fetch_output(&self, file_name: &str) -> Result<Vec<u8>, ApiError>;
    /// `POST /download_all`
    async fn download_all(&self) -> Result<Vec<u8>, ApiError>;
    /// `POST /clear_history`
    async fn clear_history(&self) -> Result<(), ApiError>;
    /// Absolute URL of an enhanced image, cache-busted with `stamp`
    fn output_url(&self, file_name: &str, stamp: i64) -> String;
}
