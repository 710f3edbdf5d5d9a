//! Server-push (text/event-stream) decoding
//!
//! `SseDecoder` turns raw body chunks into `data:` payloads; chunks may split
//! lines anywhere. `SseProgressStream` drives it over a live response.

use async_trait::async_trait;
use std::collections::VecDeque;

use crate::api::{ApiError, ProgressStream};
use crate::types::DownloadEvent;

/// Incremental event-stream decoder
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a body chunk, returning every payload completed by it
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(&['\n', '\r'][..]);
            if let Some(payload) = self.push_line(line) {
                payloads.push(payload);
            }
        }
        payloads
    }

    /// Flush whatever is buffered once the body has ended
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            let raw = std::mem::take(&mut self.pending);
            let line = String::from_utf8_lossy(&raw);
            let line = line.trim_end_matches(&['\n', '\r'][..]).to_string();
            if let Some(payload) = self.push_line(&line) {
                return Some(payload);
            }
        }
        self.dispatch()
    }

    fn push_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.dispatch();
        }
        // Comment / keep-alive
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }

    fn dispatch(&mut self) -> Option<String> {
        if self.data.is_empty() {
            return None;
        }
        let payload = self.data.join("\n");
        self.data.clear();
        Some(payload)
    }
}

/// Parse one `data:` payload into a download event
pub fn parse_download_event(payload: &str) -> Result<DownloadEvent, ApiError> {
    serde_json::from_str(payload.trim())
        .map_err(|e| ApiError::Decode(format!("bad progress event {:?}: {}", payload, e)))
}

/// Download progress subscription over a live HTTP response
pub struct SseProgressStream {
    response: Option<reqwest::Response>,
    decoder: SseDecoder,
    queue: VecDeque<String>,
}

impl SseProgressStream {
    pub fn new(response: reqwest::Response) -> Self {
        Self {
            response: Some(response),
            decoder: SseDecoder::new(),
            queue: VecDeque::new(),
        }
    }
}

#[async_trait]
impl ProgressStream for SseProgressStream {
    async fn next_event(&mut self) -> Option<Result<DownloadEvent, ApiError>> {
        loop {
            if let Some(payload) = self.queue.pop_front() {
                return Some(parse_download_event(&payload));
            }

            let response = self.response.as_mut()?;
            match response.chunk().await {
                Ok(Some(bytes)) => {
                    let payloads = self.decoder.feed(&bytes);
                    self.queue.extend(payloads);
                }
                Ok(None) => {
                    self.response = None;
                    match self.decoder.finish() {
                        Some(payload) => self.queue.push_back(payload),
                        None => return None,
                    }
                }
                Err(e) => {
                    tracing::warn!("Progress stream transport error: {}", e);
                    self.response = None;
                    return Some(Err(ApiError::Network(e.to_string())));
                }
            }
        }
    }

    fn close(&mut self) {
        // Dropping the response closes the connection
        self.response = None;
        self.queue.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b"data: {\"status\":\"completed\"}\n\n");
        assert_eq!(payloads, vec!["{\"status\":\"completed\"}".to_string()]);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"status\":\"down").is_empty());
        assert!(decoder.feed(b"loading\",\"progress\":10}\r\n").is_empty());
        let payloads = decoder.feed(b"\r\n");
        assert_eq!(payloads.len(), 1);

        let event = parse_download_event(&payloads[0]).unwrap();
        assert_eq!(event.percent(), Some(10.0));
    }

    #[test]
    fn test_comments_and_other_fields_ignored() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b": keep-alive\n\nevent: progress\nid: 3\ndata: a\ndata: b\n\n");
        assert_eq!(payloads, vec!["a\nb".to_string()]);
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.feed(b"data: {\"status\":\"error\"}").is_empty());
        assert_eq!(decoder.finish().as_deref(), Some("{\"status\":\"error\"}"));
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn test_several_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let payloads = decoder.feed(b"data: 1\n\ndata: 2\n\ndata: 3\n");
        assert_eq!(payloads, vec!["1".to_string(), "2".to_string()]);
        assert_eq!(decoder.feed(b"\n"), vec!["3".to_string()]);
    }

    #[test]
    fn test_invalid_payload_is_decode_error() {
        assert!(matches!(
            parse_download_event("not json"),
            Err(ApiError::Decode(_))
        ));
    }
}
