use std::time::Duration;

use async_trait::async_trait;

use super::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::error::TextAnalyticsError;

pub const API_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
pub const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

/// `reqwest`-backed transport that authenticates with a subscription key.
pub struct ReqwestTransport {
    client: reqwest::Client,
    api_key: String,
    timeout_secs: u64,
}

impl ReqwestTransport {
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, TextAnalyticsError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(format!("{}/{}", crate::config::SDK_NAME, crate::config::SDK_VERSION))
            .build()
            .map_err(|e| TextAnalyticsError::Configuration(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            timeout_secs,
        })
    }

    fn map_send_error(&self, url: &str, e: reqwest::Error) -> TextAnalyticsError {
        if e.is_connect() {
            TextAnalyticsError::Connection(host_of(url))
        } else if e.is_timeout() {
            TextAnalyticsError::Timeout(self.timeout_secs)
        } else {
            TextAnalyticsError::Transport(e.to_string())
        }
    }
}

fn host_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| url.to_string())
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TextAnalyticsError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };
        let request_id = uuid::Uuid::new_v4().to_string();

        let mut builder = self
            .client
            .request(method, &request.url)
            .header(API_KEY_HEADER, &self.api_key)
            .header(CLIENT_REQUEST_ID_HEADER, &request_id);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::trace!(
            method = request.method.as_str(),
            url = %request.url,
            request_id = %request_id,
            "Sending request"
        );

        let response = builder
            .send()
            .await
            .map_err(|e| self.map_send_error(&request.url, e))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| self.map_send_error(&request.url, e))?
            .to_vec();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
