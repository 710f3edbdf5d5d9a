//! Scripted in-memory `EnhancerApi` for tests

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{ApiError, EnhancerApi, ProgressStream, UploadFile};
use crate::types::{DownloadEvent, ModelDescriptor, StatusResponse, SystemInfo};

struct Script {
    events: Vec<Result<DownloadEvent, String>>,
    delay: Option<Duration>,
}

/// Streams currently open and the most ever open at once
#[derive(Default)]
struct OpenStreams {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl OpenStreams {
    fn opened(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(now, Ordering::SeqCst);
    }

    fn closed(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

pub fn downloading(progress: f64) -> DownloadEvent {
    DownloadEvent::Downloading {
        model_name: None,
        progress,
    }
}

pub fn completed() -> DownloadEvent {
    DownloadEvent::Completed { model_name: None }
}

pub fn failed(message: &str) -> DownloadEvent {
    DownloadEvent::Error {
        model_name: None,
        error_message: Some(message.to_string()),
    }
}

/// Records every call as a short tag ("status", "open:A", "event:A",
/// "close:A", "load", "enhance", ...) so tests can assert ordering.
pub struct FakeApi {
    status: Result<StatusResponse, String>,
    scripts: Mutex<HashMap<String, VecDeque<Script>>>,
    load_error: Mutex<Option<String>>,
    enhance_result: Mutex<Result<Vec<String>, (u16, String)>>,
    archive: Mutex<Result<Vec<u8>, String>>,
    clear_error: Mutex<Option<String>>,
    uploads: Mutex<Vec<String>>,
    calls: Arc<Mutex<Vec<String>>>,
    streams: Arc<OpenStreams>,
}

impl FakeApi {
    fn with_status(status: Result<StatusResponse, String>) -> Self {
        Self {
            status,
            scripts: Mutex::new(HashMap::new()),
            load_error: Mutex::new(None),
            enhance_result: Mutex::new(Ok(Vec::new())),
            archive: Mutex::new(Ok(b"PK\x05\x06".to_vec())),
            clear_error: Mutex::new(None),
            uploads: Mutex::new(Vec::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
            streams: Arc::new(OpenStreams::default()),
        }
    }

    pub fn with_missing(missing: Vec<ModelDescriptor>, models_loaded: bool) -> Self {
        Self::with_status(Ok(StatusResponse {
            system_info: SystemInfo {
                gpu_detected: "CPU".to_string(),
                half_precision: false,
                models_loaded,
            },
            missing_models: missing,
        }))
    }

    pub fn unreachable() -> Self {
        Self::with_status(Err("connection refused".to_string()))
    }

    /// Queue the events the next download of `model` will produce
    pub fn script(&self, model: &str, events: Vec<DownloadEvent>) {
        self.push_script(model, events.into_iter().map(Ok).collect(), None);
    }

    /// Like `script`, but every event arrives after `delay`
    pub fn script_slow(&self, model: &str, events: Vec<DownloadEvent>, delay: Duration) {
        self.push_script(model, events.into_iter().map(Ok).collect(), Some(delay));
    }

    pub fn script_transport_error(&self, model: &str) {
        self.push_script(model, vec![Err("connection reset".to_string())], None);
    }

    pub fn fail_load(&self, message: &str) {
        *self.load_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn respond_enhance(&self, names: &[&str]) {
        *self.enhance_result.lock().unwrap() = Ok(names.iter().map(|n| n.to_string()).collect());
    }

    pub fn fail_enhance(&self, status: u16, detail: &str) {
        *self.enhance_result.lock().unwrap() = Err((status, detail.to_string()));
    }

    pub fn fail_archive(&self, message: &str) {
        *self.archive.lock().unwrap() = Err(message.to_string());
    }

    pub fn fail_clear(&self, message: &str) {
        *self.clear_error.lock().unwrap() = Some(message.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn uploaded_names(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    /// Highest number of download streams that were open simultaneously
    pub fn max_open_streams(&self) -> usize {
        self.streams.max.load(Ordering::SeqCst)
    }

    fn push_script(
        &self,
        model: &str,
        events: Vec<Result<DownloadEvent, String>>,
        delay: Option<Duration>,
    ) {
        self.scripts
            .lock()
            .unwrap()
            .entry(model.to_string())
            .or_default()
            .push_back(Script { events, delay });
    }

    fn log(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

struct FakeStream {
    model: String,
    events: VecDeque<Result<DownloadEvent, String>>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<String>>>,
    streams: Arc<OpenStreams>,
    closed: bool,
}

#[async_trait]
impl ProgressStream for FakeStream {
    async fn next_event(&mut self) -> Option<Result<DownloadEvent, ApiError>> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.events.pop_front()?;
        self.calls
            .lock()
            .unwrap()
            .push(format!("event:{}", self.model));
        Some(next.map_err(ApiError::Network))
    }

    fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.streams.closed();
        }
        self.calls
            .lock()
            .unwrap()
            .push(format!("close:{}", self.model));
    }
}

impl Drop for FakeStream {
    fn drop(&mut self) {
        if !self.closed {
            self.closed = true;
            self.streams.closed();
        }
    }
}

#[async_trait]
impl EnhancerApi for FakeApi {
    async fn status(&self) -> Result<StatusResponse, ApiError> {
        self.log("status");
        self.status.clone().map_err(ApiError::Network)
    }

    async fn open_download(
        &self,
        model: &ModelDescriptor,
    ) -> Result<Box<dyn ProgressStream>, ApiError> {
        self.log(format!("open:{}", model.name));
        let script = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&model.name)
            .and_then(|queue| queue.pop_front())
            .ok_or_else(|| ApiError::Http {
                status: 404,
                detail: format!("no script for {}", model.name),
            })?;
        self.streams.opened();
        Ok(Box::new(FakeStream {
            model: model.name.clone(),
            events: script.events.into(),
            delay: script.delay,
            calls: self.calls.clone(),
            streams: self.streams.clone(),
            closed: false,
        }))
    }

    async fn load_models(&self) -> Result<(), ApiError> {
        self.log("load");
        match self.load_error.lock().unwrap().clone() {
            Some(detail) => Err(ApiError::Http {
                status: 500,
                detail,
            }),
            None => Ok(()),
        }
    }

    async fn enhance(&self, files: Vec<UploadFile>) -> Result<Vec<String>, ApiError> {
        self.log("enhance");
        self.uploads
            .lock()
            .unwrap()
            .extend(files.into_iter().map(|f| f.file_name));
        self.enhance_result
            .lock()
            .unwrap()
            .clone()
            .map_err(|(status, detail)| ApiError::Http { status, detail })
    }

    async fn fetch_output(&self, file_name: &str) -> Result<Vec<u8>, ApiError> {
        self.log(format!("fetch:{}", file_name));
        Ok(file_name.as_bytes().to_vec())
    }

    async fn download_all(&self) -> Result<Vec<u8>, ApiError> {
        self.log("download_all");
        self.archive.lock().unwrap().clone().map_err(ApiError::Network)
    }

    async fn clear_history(&self) -> Result<(), ApiError> {
        self.log("clear");
        match self.clear_error.lock().unwrap().clone() {
            Some(message) => Err(ApiError::Network(message)),
            None => Ok(()),
        }
    }

    fn output_url(&self, file_name: &str, stamp: i64) -> String {
        format!("http://fake/output/{}?t={}", file_name, stamp)
    }
}
