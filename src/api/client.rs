//! HTTP implementation of the enhancement server API

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::api::{ApiError, EnhancerApi, ProgressStream, SseProgressStream, UploadFile};
use crate::types::{ModelDescriptor, StatusResponse};

const USER_AGENT: &str = concat!("PicturePerfect-Desktop/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct EnhanceResponse {
    images: Vec<String>,
}

/// Client for a running enhancement server.
///
/// No request timeout is set: model downloads and enhancement of large
/// batches can legitimately take minutes.
#[derive(Debug, Clone)]
pub struct HttpApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn output_path_url(&self, file_name: &str) -> Result<Url, ApiError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Network(format!("Invalid server URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Network(format!("Invalid server URL {}", self.base_url)))?
            .pop_if_empty()
            .push("output")
            .push(file_name);
        Ok(url)
    }
}

/// Turn a non-success response into an error, preferring the server's
/// `detail` field over `fallback`.
async fn error_from_response(response: reqwest::Response, fallback: &str) -> ApiError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ApiError::Http {
        status,
        detail: extract_detail(&body).unwrap_or_else(|| fallback.to_string()),
    }
}

fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let detail = match value.get("detail")? {
        Value::String(text) => text.clone(),
        Value::Null => return None,
        other => other.to_string(),
    };
    if detail.trim().is_empty() {
        None
    } else {
        Some(detail)
    }
}

#[async_trait]
impl EnhancerApi for HttpApi {
    async fn status(&self) -> Result<StatusResponse, ApiError> {
        tracing::debug!("GET /api/status");
        let response = self.client.get(self.endpoint("/api/status")).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Failed to fetch server status").await);
        }
        Ok(response.json::<StatusResponse>().await?)
    }

    async fn open_download(
        &self,
        model: &ModelDescriptor,
    ) -> Result<Box<dyn ProgressStream>, ApiError> {
        let model_info = serde_json::to_string(model)
            .map_err(|e| ApiError::Decode(format!("Cannot encode model descriptor: {}", e)))?;
        tracing::debug!("Opening download stream for {}", model.name);

        let response = self
            .client
            .get(self.endpoint("/api/download_model"))
            .query(&[("model_info", model_info)])
            .header("Accept", "text/event-stream")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Failed to start model download").await);
        }
        Ok(Box::new(SseProgressStream::new(response)))
    }

    async fn load_models(&self) -> Result<(), ApiError> {
        let response = self.client.post(self.endpoint("/api/load_models")).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Failed to load models").await);
        }
        Ok(())
    }

    async fn enhance(&self, files: Vec<UploadFile>) -> Result<Vec<String>, ApiError> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.bytes)
                .file_name(file.file_name)
                .mime_str(&file.mime)?;
            form = form.part("files", part);
        }

        let response = self
            .client
            .post(self.endpoint("/enhance"))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Failed to enhance image").await);
        }

        let body = response.text().await?;
        let parsed: EnhanceResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::Decode(format!("Unexpected enhance response: {}", e)))?;
        Ok(parsed.images)
    }

    async fn fetch_output(&self, file_name: &str) -> Result<Vec<u8>, ApiError> {
        let url = self.output_path_url(file_name)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "File not found").await);
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn download_all(&self) -> Result<Vec<u8>, ApiError> {
        let response = self.client.post(self.endpoint("/download_all")).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Network response was not ok.").await);
        }
        Ok(response.bytes().await?.to_vec())
    }

    async fn clear_history(&self) -> Result<(), ApiError> {
        let response = self.client.post(self.endpoint("/clear_history")).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response, "Failed to clear history").await);
        }
        Ok(())
    }

    fn output_url(&self, file_name: &str, stamp: i64) -> String {
        match self.output_path_url(file_name) {
            Ok(mut url) => {
                url.query_pairs_mut().append_pair("t", &stamp.to_string());
                url.to_string()
            }
            Err(_) => format!("{}/output/{}?t={}", self.base_url, file_name, stamp),
        }
    }
}
