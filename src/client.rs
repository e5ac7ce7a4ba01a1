//! Public entry point.
//!
//! Every synchronous call follows the same steps: validate the batch,
//! resolve options against the service version, build wire documents, call
//! the backend, map the response. Jobs stop after submission and hand back
//! a `JobPoller`.

use std::sync::Arc;
use std::time::Duration;

use crate::config::{ClientConfig, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_POLL_INTERVAL};
use crate::error::TextAnalyticsError;
use crate::lro::{ActionsJob, HealthcareJob, JobId, JobKind, JobPoller, JobType, PollerSettings};
use crate::mapper;
use crate::models::*;
use crate::options::{
    AnalysisAction, AnalyzeActionsOptions, AnalyzeHealthcareEntitiesOptions, AnalyzeSentimentOptions,
    DynamicClassifyOptions, RecognizePiiEntitiesOptions, ResolvedJob, TextAnalyticsRequestOptions,
};
use crate::service::{self, AnalysisService, JobSubmission};
use crate::transport::{HttpTransport, ReqwestTransport};
use crate::wire;

#[derive(Clone)]
pub struct TextAnalyticsClient {
    service: Arc<dyn AnalysisService>,
    span: tracing::Span,
    poll_interval: Duration,
    default_language: Option<String>,
    default_country_hint: Option<String>,
}

impl std::fmt::Debug for TextAnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextAnalyticsClient")
            .field("service_version", &self.service.service_version())
            .field("poll_interval", &self.poll_interval)
            .field("default_language", &self.default_language)
            .field("default_country_hint", &self.default_country_hint)
            .finish()
    }
}

#[derive(Default)]
pub struct TextAnalyticsClientBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    service_version: ServiceVersion,
    transport: Option<Arc<dyn HttpTransport>>,
    span: Option<tracing::Span>,
    poll_interval: Option<Duration>,
    timeout_secs: Option<u64>,
    default_language: Option<String>,
    default_country_hint: Option<String>,
}

impl TextAnalyticsClientBuilder {
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn service_version(mut self, version: ServiceVersion) -> Self {
        self.service_version = version;
        self
    }

    /// Replace the default reqwest transport, e.g. with a test double.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Span every request and job event is recorded under.
    pub fn span(mut self, span: tracing::Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = Some(language.into());
        self
    }

    pub fn default_country_hint(mut self, hint: impl Into<String>) -> Self {
        self.default_country_hint = Some(hint.into());
        self
    }

    pub fn build(self) -> Result<TextAnalyticsClient, TextAnalyticsError> {
        let endpoint = self
            .endpoint
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| TextAnalyticsError::Configuration("endpoint is required".into()))?;
        let parsed = reqwest::Url::parse(&endpoint)
            .map_err(|e| TextAnalyticsError::Configuration(format!("invalid endpoint '{endpoint}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TextAnalyticsError::Configuration(format!(
                "endpoint must be http or https, got '{}'",
                parsed.scheme()
            )));
        }

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => {
                let api_key = self
                    .api_key
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| TextAnalyticsError::Configuration("api key is required".into()))?;
                Arc::new(ReqwestTransport::new(
                    &api_key,
                    self.timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
                )?)
            }
        };

        let version = self.service_version;
        let span = self.span.unwrap_or_else(|| {
            tracing::info_span!("text_analytics", endpoint = %endpoint, version = %version)
        });
        let service = service::for_version(&endpoint, version, transport, span.clone());
        span.in_scope(|| {
            tracing::debug!(
                backend = if version.is_legacy() { "text-analytics" } else { "language" },
                "Client built"
            );
        });

        Ok(TextAnalyticsClient {
            service,
            span,
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            default_language: self.default_language,
            default_country_hint: self.default_country_hint,
        })
    }
}

impl TextAnalyticsClient {
    pub fn builder() -> TextAnalyticsClientBuilder {
        TextAnalyticsClientBuilder::default()
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, TextAnalyticsError> {
        let mut builder = Self::builder()
            .endpoint(config.endpoint)
            .api_key(config.api_key)
            .service_version(config.service_version)
            .poll_interval(config.poll_interval)
            .timeout_secs(config.timeout_secs);
        if let Some(language) = config.default_language {
            builder = builder.default_language(language);
        }
        if let Some(hint) = config.default_country_hint {
            builder = builder.default_country_hint(hint);
        }
        builder.build()
    }

    pub fn service_version(&self) -> ServiceVersion {
        self.service.service_version()
    }

    /// Whether jobs of `job_type` can be cancelled on this client's backend.
    pub fn supports_cancel(&self, job_type: JobType) -> bool {
        self.service.supports_cancel(job_type)
    }

    // ═══════════════════════════════════════════
    // Synchronous capabilities
    // ═══════════════════════════════════════════

    pub async fn detect_language(
        &self,
        documents: &[DetectLanguageInput],
        options: &TextAnalyticsRequestOptions,
    ) -> Result<ResultCollection<DetectedLanguage>, TextAnalyticsError> {
        validate_batch(documents)?;
        let resolved = options.resolve(self.service_version(), false)?;
        let inputs = documents
            .iter()
            .map(|d| wire::LanguageInput {
                id: d.id.clone(),
                text: d.text.clone(),
                country_hint: d.country_hint.clone().or_else(|| self.default_country_hint.clone()),
            })
            .collect();
        let batch = self
            .service
            .detect_language(inputs, &resolved.parameters, resolved.show_stats)
            .await?;
        Ok(mapper::to_collection(batch, mapper::detected_language))
    }

    pub async fn extract_key_phrases(
        &self,
        documents: &[TextDocumentInput],
        options: &TextAnalyticsRequestOptions,
    ) -> Result<ResultCollection<KeyPhrases>, TextAnalyticsError> {
        validate_batch(documents)?;
        let resolved = options.resolve(self.service_version(), false)?;
        let batch = self
            .service
            .extract_key_phrases(self.inputs(documents), &resolved.parameters, resolved.show_stats)
            .await?;
        Ok(mapper::to_collection(batch, mapper::key_phrases))
    }

    pub async fn recognize_entities(
        &self,
        documents: &[TextDocumentInput],
        options: &TextAnalyticsRequestOptions,
    ) -> Result<ResultCollection<RecognizedEntities>, TextAnalyticsError> {
        validate_batch(documents)?;
        let resolved = options.resolve(self.service_version(), false)?;
        let batch = self
            .service
            .recognize_entities(self.inputs(documents), &resolved.parameters, resolved.show_stats)
            .await?;
        Ok(mapper::to_collection(batch, mapper::entities))
    }

    pub async fn recognize_pii_entities(
        &self,
        documents: &[TextDocumentInput],
        options: &RecognizePiiEntitiesOptions,
    ) -> Result<ResultCollection<PiiEntities>, TextAnalyticsError> {
        validate_batch(documents)?;
        let resolved = options.resolve(self.service_version())?;
        let batch = self
            .service
            .recognize_pii_entities(self.inputs(documents), &resolved.parameters, resolved.show_stats)
            .await?;
        Ok(mapper::to_collection(batch, mapper::pii_entities))
    }

    pub async fn recognize_linked_entities(
        &self,
        documents: &[TextDocumentInput],
        options: &TextAnalyticsRequestOptions,
    ) -> Result<ResultCollection<Vec<LinkedEntity>>, TextAnalyticsError> {
        validate_batch(documents)?;
        let resolved = options.resolve(self.service_version(), false)?;
        let batch = self
            .service
            .recognize_linked_entities(self.inputs(documents), &resolved.parameters, resolved.show_stats)
            .await?;
        Ok(mapper::to_collection(batch, mapper::linked_entities))
    }

    pub async fn analyze_sentiment(
        &self,
        documents: &[TextDocumentInput],
        options: &AnalyzeSentimentOptions,
    ) -> Result<ResultCollection<DocumentSentiment>, TextAnalyticsError> {
        validate_batch(documents)?;
        let resolved = options.resolve(self.service_version())?;
        let batch = self
            .service
            .analyze_sentiment(self.inputs(documents), &resolved.parameters, resolved.show_stats)
            .await?;
        Ok(mapper::to_collection(batch, mapper::sentiment))
    }

    pub async fn dynamic_classify(
        &self,
        documents: &[TextDocumentInput],
        options: &DynamicClassifyOptions,
    ) -> Result<ResultCollection<DocumentClassifications>, TextAnalyticsError> {
        validate_batch(documents)?;
        let resolved = options.resolve(self.service_version())?;
        let batch = self
            .service
            .dynamic_classify(self.inputs(documents), &resolved.parameters, resolved.show_stats)
            .await?;
        Ok(mapper::to_collection(batch, mapper::classifications))
    }

    // ═══════════════════════════════════════════
    // Plain-string batches (ids "0", "1", ...)
    // ═══════════════════════════════════════════

    pub async fn detect_language_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        country_hint: Option<&str>,
        options: &TextAnalyticsRequestOptions,
    ) -> Result<ResultCollection<DetectedLanguage>, TextAnalyticsError> {
        self.detect_language(&detect_language_documents(texts, country_hint), options)
            .await
    }

    pub async fn extract_key_phrases_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        language: Option<&str>,
        options: &TextAnalyticsRequestOptions,
    ) -> Result<ResultCollection<KeyPhrases>, TextAnalyticsError> {
        self.extract_key_phrases(&text_documents(texts, language), options)
            .await
    }

    pub async fn recognize_entities_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        language: Option<&str>,
        options: &TextAnalyticsRequestOptions,
    ) -> Result<ResultCollection<RecognizedEntities>, TextAnalyticsError> {
        self.recognize_entities(&text_documents(texts, language), options)
            .await
    }

    pub async fn recognize_pii_entities_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        language: Option<&str>,
        options: &RecognizePiiEntitiesOptions,
    ) -> Result<ResultCollection<PiiEntities>, TextAnalyticsError> {
        self.recognize_pii_entities(&text_documents(texts, language), options)
            .await
    }

    pub async fn recognize_linked_entities_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        language: Option<&str>,
        options: &TextAnalyticsRequestOptions,
    ) -> Result<ResultCollection<Vec<LinkedEntity>>, TextAnalyticsError> {
        self.recognize_linked_entities(&text_documents(texts, language), options)
            .await
    }

    pub async fn analyze_sentiment_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        language: Option<&str>,
        options: &AnalyzeSentimentOptions,
    ) -> Result<ResultCollection<DocumentSentiment>, TextAnalyticsError> {
        self.analyze_sentiment(&text_documents(texts, language), options)
            .await
    }

    pub async fn dynamic_classify_batch<S: AsRef<str>>(
        &self,
        texts: &[S],
        language: Option<&str>,
        options: &DynamicClassifyOptions,
    ) -> Result<ResultCollection<DocumentClassifications>, TextAnalyticsError> {
        self.dynamic_classify(&text_documents(texts, language), options)
            .await
    }

    // ═══════════════════════════════════════════
    // Jobs
    // ═══════════════════════════════════════════

    /// Submit a healthcare entity job. The returned poller starts in
    /// `NotStarted`; call `wait_until_done` then `results`.
    pub async fn begin_analyze_healthcare_entities(
        &self,
        documents: &[TextDocumentInput],
        options: &AnalyzeHealthcareEntitiesOptions,
    ) -> Result<JobPoller<HealthcareJob>, TextAnalyticsError> {
        validate_batch(documents)?;
        let job = options.resolve(self.service_version())?;
        self.begin(documents, job).await
    }

    /// Submit several actions over one batch as a single job.
    pub async fn begin_analyze_actions(
        &self,
        documents: &[TextDocumentInput],
        actions: &[AnalysisAction],
        options: &AnalyzeActionsOptions,
    ) -> Result<JobPoller<ActionsJob>, TextAnalyticsError> {
        validate_batch(documents)?;
        let job = options.resolve(actions, self.service_version())?;
        self.begin(documents, job).await
    }

    /// A poller for a job submitted earlier, starting in `NotStarted`.
    pub fn resume_job<K: JobKind>(&self, job_id: JobId, show_stats: bool) -> JobPoller<K> {
        JobPoller::attach(
            Arc::clone(&self.service),
            job_id,
            PollerSettings {
                poll_interval: self.poll_interval,
                show_stats,
                span: self.span.clone(),
            },
        )
    }

    async fn begin<K: JobKind>(
        &self,
        documents: &[TextDocumentInput],
        job: ResolvedJob,
    ) -> Result<JobPoller<K>, TextAnalyticsError> {
        let submission = JobSubmission {
            job_type: K::JOB_TYPE,
            display_name: job.display_name,
            documents: self.inputs(documents),
            tasks: job.tasks,
        };
        let settings = PollerSettings {
            poll_interval: job.poll_interval.unwrap_or(self.poll_interval),
            show_stats: job.show_stats,
            span: self.span.clone(),
        };
        JobPoller::activate(Arc::clone(&self.service), submission, settings).await
    }

    fn inputs(&self, documents: &[TextDocumentInput]) -> Vec<wire::MultiLanguageInput> {
        documents
            .iter()
            .map(|d| wire::MultiLanguageInput {
                id: d.id.clone(),
                text: d.text.clone(),
                language: d.language.clone().or_else(|| self.default_language.clone()),
            })
            .collect()
    }
}
