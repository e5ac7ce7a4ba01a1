//! Backend abstraction.
//!
//! The service exposes the same capabilities under two URL and envelope
//! schemes: the legacy `/text/analytics/v3.x` API and the newer
//! `/language` API. `AnalysisService` hides the difference; the client
//! picks one implementation at construction time from the service version.

pub mod language;
pub mod legacy;

pub use language::LanguageService;
pub use legacy::LegacyTextAnalyticsService;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::Instrument;

use crate::error::TextAnalyticsError;
use crate::lro::{JobId, JobType, PageRequest};
use crate::models::ServiceVersion;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, OPERATION_LOCATION};
use crate::wire::{self, BatchResults, ErrorResponse, JobState, TaskParameters, TaskRequest};

/// A job to submit: the documents plus one or more tasks to run on them.
#[derive(Debug, Clone)]
pub struct JobSubmission {
    pub job_type: JobType,
    pub display_name: Option<String>,
    pub documents: Vec<wire::MultiLanguageInput>,
    pub tasks: Vec<TaskRequest>,
}

/// One backend of the text-analytics service.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    fn service_version(&self) -> ServiceVersion;

    async fn detect_language(
        &self,
        documents: Vec<wire::LanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::LanguageBody>, TextAnalyticsError>;

    async fn extract_key_phrases(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::KeyPhrasesBody>, TextAnalyticsError>;

    async fn recognize_entities(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::EntitiesBody>, TextAnalyticsError>;

    async fn recognize_pii_entities(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::PiiBody>, TextAnalyticsError>;

    async fn recognize_linked_entities(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::LinkedEntitiesBody>, TextAnalyticsError>;

    async fn analyze_sentiment(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::SentimentBody>, TextAnalyticsError>;

    async fn dynamic_classify(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::ClassificationBody>, TextAnalyticsError>;

    /// Submit a job and return the id from its `operation-location` header.
    async fn submit_job(&self, submission: JobSubmission) -> Result<JobId, TextAnalyticsError>;

    async fn job_state(
        &self,
        job_type: JobType,
        job_id: JobId,
        page: PageRequest,
    ) -> Result<JobState, TextAnalyticsError>;

    fn supports_cancel(&self, job_type: JobType) -> bool;

    async fn cancel_job(&self, job_type: JobType, job_id: JobId) -> Result<(), TextAnalyticsError>;
}

/// Pick the backend that speaks `version`.
pub fn for_version(
    endpoint: &str,
    version: ServiceVersion,
    transport: Arc<dyn HttpTransport>,
    span: tracing::Span,
) -> Arc<dyn AnalysisService> {
    let core = ServiceCore::new(endpoint, version, transport, span);
    if version.is_legacy() {
        Arc::new(LegacyTextAnalyticsService::new(core))
    } else {
        Arc::new(LanguageService::new(core))
    }
}

/// Request execution shared by both backends.
pub struct ServiceCore {
    endpoint: String,
    version: ServiceVersion,
    transport: Arc<dyn HttpTransport>,
    span: tracing::Span,
}

impl ServiceCore {
    pub fn new(
        endpoint: &str,
        version: ServiceVersion,
        transport: Arc<dyn HttpTransport>,
        span: tracing::Span,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            version,
            transport,
            span,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn version(&self) -> ServiceVersion {
        self.version
    }

    /// `{endpoint}{path}` with the given query parameters, percent-encoded.
    pub fn url(&self, path: &str, query: &[(&str, String)]) -> Result<String, TextAnalyticsError> {
        let base = format!("{}{}", self.endpoint, path);
        let url = if query.is_empty() {
            reqwest::Url::parse(&base)
        } else {
            reqwest::Url::parse_with_params(&base, query.iter().map(|(k, v)| (*k, v.as_str())))
        };
        url.map(String::from)
            .map_err(|e| TextAnalyticsError::Configuration(format!("invalid endpoint URL '{base}': {e}")))
    }

    /// Send a request and return the response if its status is 2xx.
    pub async fn send(
        &self,
        operation: &'static str,
        request: HttpRequest,
    ) -> Result<HttpResponse, TextAnalyticsError> {
        let method = request.method.as_str();
        let start = Instant::now();
        let result = self.transport.send(request).instrument(self.span.clone()).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                self.span.in_scope(|| {
                    tracing::warn!(operation, method, elapsed_ms, error = %e, "Request failed");
                });
                return Err(e);
            }
        };

        self.span.in_scope(|| {
            tracing::debug!(operation, method, status = response.status, elapsed_ms, "Response received");
        });

        if response.is_success() {
            Ok(response)
        } else {
            Err(http_error(&response))
        }
    }

    /// Send a request and decode its JSON body.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        request: HttpRequest,
    ) -> Result<T, TextAnalyticsError> {
        self.send(operation, request).await?.parse_json()
    }

    /// Send a job submission and read the job id from the response header.
    pub async fn submit(
        &self,
        operation: &'static str,
        request: HttpRequest,
    ) -> Result<JobId, TextAnalyticsError> {
        let response = self.send(operation, request).await?;
        let location = response.header(OPERATION_LOCATION).ok_or_else(|| {
            TextAnalyticsError::ResponseParsing(format!(
                "{operation}: response has no {OPERATION_LOCATION} header"
            ))
        })?;
        let job_id = JobId::from_operation_location(location)?;
        self.span.in_scope(|| {
            tracing::info!(operation, job_id = %job_id, "Job submitted");
        });
        Ok(job_id)
    }
}

/// Turn a non-2xx response into an error, keeping the service payload when
/// the body has one.
pub fn http_error(response: &HttpResponse) -> TextAnalyticsError {
    let error = response
        .parse_json::<ErrorResponse>()
        .ok()
        .map(|e| e.error.into());
    TextAnalyticsError::Http {
        status: response.status,
        error,
        body: response.text(),
    }
}

/// Query parameters for `$top`, `$skip` and `showStats`.
pub fn page_query(page: &PageRequest) -> Vec<(&'static str, String)> {
    let mut query = Vec::with_capacity(3);
    if let Some(top) = page.top {
        query.push(("$top", top.to_string()));
    }
    if let Some(skip) = page.skip {
        query.push(("$skip", skip.to_string()));
    }
    query.push(("showStats", page.show_stats.to_string()));
    query
}

pub(crate) fn to_json<T: serde::Serialize>(value: &T) -> Result<serde_json::Value, TextAnalyticsError> {
    serde_json::to_value(value).map_err(|e| TextAnalyticsError::InvalidInput(e.to_string()))
}
