//! `/text/analytics/v3.x` backend.
//!
//! Parameters travel as query strings, results come back as bare batch
//! envelopes, and only healthcare jobs can be cancelled.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{page_query, to_json, AnalysisService, JobSubmission, ServiceCore};
use crate::error::TextAnalyticsError;
use crate::lro::{JobId, JobType, PageRequest};
use crate::models::ServiceVersion;
use crate::transport::HttpRequest;
use crate::wire::{self, BatchResults, DocumentsBody, JobState, TaskKind, TaskParameters};

pub struct LegacyTextAnalyticsService {
    core: ServiceCore,
}

impl LegacyTextAnalyticsService {
    pub fn new(core: ServiceCore) -> Self {
        Self { core }
    }

    fn path(&self, suffix: &str) -> String {
        format!("/text/analytics/{}{}", self.core.version().as_str(), suffix)
    }

    async fn analyze<D: Serialize + Send, B: DeserializeOwned>(
        &self,
        operation: &'static str,
        suffix: &str,
        documents: Vec<D>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<B>, TextAnalyticsError> {
        let mut query = parameter_query(parameters);
        query.push(("showStats", show_stats.to_string()));
        let url = self.core.url(&self.path(suffix), &query)?;
        let count = documents.len();
        let body = to_json(&DocumentsBody { documents })?;
        self.core.span.in_scope(|| {
            tracing::debug!(operation, documents = count, "Submitting batch");
        });
        self.core.send_json(operation, HttpRequest::post(url, body)).await
    }

    fn job_path(&self, job_type: JobType, job_id: Option<JobId>) -> String {
        let base = match job_type {
            JobType::Healthcare => "/entities/health/jobs",
            JobType::Actions => "/analyze/jobs",
        };
        match job_id {
            Some(id) => self.path(&format!("{base}/{id}")),
            None => self.path(base),
        }
    }
}

/// Task parameters as legacy query parameters.
fn parameter_query(p: &TaskParameters) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(model_version) = &p.model_version {
        query.push(("model-version", model_version.clone()));
    }
    if let Some(opt_out) = p.logging_opt_out {
        query.push(("loggingOptOut", opt_out.to_string()));
    }
    if let Some(index_type) = p.string_index_type {
        query.push(("stringIndexType", index_type.as_str().to_string()));
    }
    if let Some(opinion_mining) = p.opinion_mining {
        query.push(("opinionMining", opinion_mining.to_string()));
    }
    if let Some(domain) = p.domain {
        query.push(("domain", domain.as_str().to_string()));
    }
    if !p.pii_categories.is_empty() {
        let joined = p
            .pii_categories
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(",");
        query.push(("piiCategories", joined));
    }
    query
}

fn legacy_tasks(tasks: &[wire::TaskRequest]) -> Result<wire::LegacyJobTasks, TextAnalyticsError> {
    let mut grouped = wire::LegacyJobTasks::default();
    for task in tasks {
        let entry = wire::LegacyJobTask {
            task_name: task.name.clone(),
            parameters: wire::LegacyTaskParameters::from(&task.parameters),
        };
        match task.kind {
            TaskKind::EntityRecognition => grouped.entity_recognition_tasks.push(entry),
            TaskKind::PiiEntityRecognition => grouped.entity_recognition_pii_tasks.push(entry),
            TaskKind::KeyPhraseExtraction => grouped.key_phrase_extraction_tasks.push(entry),
            TaskKind::EntityLinking => grouped.entity_linking_tasks.push(entry),
            TaskKind::SentimentAnalysis => grouped.sentiment_analysis_tasks.push(entry),
            TaskKind::Healthcare => {
                return Err(TextAnalyticsError::InvalidInput(
                    "healthcare is submitted as its own job, not as an action".into(),
                ))
            }
        }
    }
    Ok(grouped)
}

#[async_trait]
impl AnalysisService for LegacyTextAnalyticsService {
    fn service_version(&self) -> ServiceVersion {
        self.core.version()
    }

    async fn detect_language(
        &self,
        documents: Vec<wire::LanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::LanguageBody>, TextAnalyticsError> {
        self.analyze("detect_language", "/languages", documents, parameters, show_stats)
            .await
    }

    async fn extract_key_phrases(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::KeyPhrasesBody>, TextAnalyticsError> {
        self.analyze("extract_key_phrases", "/keyPhrases", documents, parameters, show_stats)
            .await
    }

    async fn recognize_entities(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::EntitiesBody>, TextAnalyticsError> {
        self.analyze(
            "recognize_entities",
            "/entities/recognition/general",
            documents,
            parameters,
            show_stats,
        )
        .await
    }

    async fn recognize_pii_entities(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::PiiBody>, TextAnalyticsError> {
        self.analyze(
            "recognize_pii_entities",
            "/entities/recognition/pii",
            documents,
            parameters,
            show_stats,
        )
        .await
    }

    async fn recognize_linked_entities(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::LinkedEntitiesBody>, TextAnalyticsError> {
        self.analyze(
            "recognize_linked_entities",
            "/entities/linking",
            documents,
            parameters,
            show_stats,
        )
        .await
    }

    async fn analyze_sentiment(
        &self,
        documents: Vec<wire::MultiLanguageInput>,
        parameters: &TaskParameters,
        show_stats: bool,
    ) -> Result<BatchResults<wire::SentimentBody>, TextAnalyticsError> {
        self.analyze("analyze_sentiment", "/sentiment", documents, parameters, show_stats)
            .await
    }

    async fn dynamic_classify(
        &self,
        _documents: Vec<wire::MultiLanguageInput>,
        _parameters: &TaskParameters,
        _show_stats: bool,
    ) -> Result<BatchResults<wire::ClassificationBody>, TextAnalyticsError> {
        Err(TextAnalyticsError::UnsupportedVersion {
            feature: "dynamic classification".into(),
            version: self.core.version(),
            minimum: ServiceVersion::V2023_04_01,
        })
    }

    async fn submit_job(&self, submission: JobSubmission) -> Result<JobId, TextAnalyticsError> {
        let request = match submission.job_type {
            JobType::Healthcare => {
                let parameters = submission
                    .tasks
                    .first()
                    .map(|t| t.parameters.clone())
                    .unwrap_or_default();
                let url = self
                    .core
                    .url(&self.job_path(JobType::Healthcare, None), &parameter_query(&parameters))?;
                HttpRequest::post(
                    url,
                    to_json(&DocumentsBody {
                        documents: submission.documents,
                    })?,
                )
            }
            JobType::Actions => {
                let url = self.core.url(&self.path("/analyze"), &[])?;
                let body = wire::LegacyAnalyzeRequest {
                    display_name: submission.display_name,
                    analysis_input: wire::AnalysisInput {
                        documents: submission.documents,
                    },
                    tasks: legacy_tasks(&submission.tasks)?,
                };
                HttpRequest::post(url, to_json(&body)?)
            }
        };
        self.core.submit("submit_job", request).await
    }

    async fn job_state(
        &self,
        job_type: JobType,
        job_id: JobId,
        page: PageRequest,
    ) -> Result<JobState, TextAnalyticsError> {
        let url = self
            .core
            .url(&self.job_path(job_type, Some(job_id)), &page_query(&page))?;
        let request = HttpRequest::get(url);
        match job_type {
            JobType::Healthcare => self
                .core
                .send_json::<wire::LegacyHealthcareJobState>("job_state", request)
                .await
                .map(|state| self.core.span.in_scope(|| JobState::from(state))),
            JobType::Actions => self
                .core
                .send_json::<wire::LegacyAnalyzeJobState>("job_state", request)
                .await
                .map(|state| self.core.span.in_scope(|| JobState::from(state))),
        }
    }

    fn supports_cancel(&self, job_type: JobType) -> bool {
        matches!(job_type, JobType::Healthcare)
    }

    async fn cancel_job(&self, job_type: JobType, job_id: JobId) -> Result<(), TextAnalyticsError> {
        if !self.supports_cancel(job_type) {
            return Err(TextAnalyticsError::UnsupportedOperation(format!(
                "{job_type} jobs cannot be cancelled on service version {}",
                self.core.version()
            )));
        }
        let url = self.core.url(&self.job_path(job_type, Some(job_id)), &[])?;
        self.core.send("cancel_job", HttpRequest::delete(url)).await?;
        Ok(())
    }
}
