use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::TextAnalyticsError;

/// Scripted transport for tests: replays queued responses in order and
/// records every request it receives.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(self, response: HttpResponse) -> Self {
        self.push(response);
        self
    }

    pub fn with_json(self, status: u16, body: serde_json::Value) -> Self {
        self.with_response(HttpResponse::json(status, &body))
    }

    pub fn push(&self, response: HttpResponse) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    /// Every request sent so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TextAnalyticsError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| {
                TextAnalyticsError::Transport(format!(
                    "no scripted response for {} {}",
                    request.method.as_str(),
                    request.url
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_responses_in_order() {
        let transport = MockTransport::new()
            .with_json(200, serde_json::json!({"n": 1}))
            .with_json(200, serde_json::json!({"n": 2}));
        let first = transport.send(HttpRequest::get("https://x/a")).await.unwrap();
        let second = transport.send(HttpRequest::get("https://x/b")).await.unwrap();
        assert_eq!(first.parse_json::<serde_json::Value>().unwrap()["n"], 1);
        assert_eq!(second.parse_json::<serde_json::Value>().unwrap()["n"], 2);
        assert_eq!(transport.request_count(), 2);
        assert_eq!(transport.requests()[1].url, "https://x/b");
    }

    #[tokio::test]
    async fn exhausted_script_is_a_transport_error() {
        let transport = MockTransport::new();
        let err = transport.send(HttpRequest::get("https://x/a")).await.unwrap_err();
        assert!(matches!(err, TextAnalyticsError::Transport(_)));
        assert_eq!(transport.request_count(), 1);
    }
}
